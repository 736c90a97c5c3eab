use anyhow::Context;
use clap::CommandFactory;
use protonion_jira::config::EnvConfigSource;
use protonion_jira::McpServer;
use protonion_jira_cli::cli::{Cli, Commands, DoctorFormat};
use protonion_jira_cli::exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_WARNING};
use protonion_jira_cli::{doctor, env, logging};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if cli.command.is_none() {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Failed to print help: {e}");
            process::exit(EXIT_WARNING);
        }
        process::exit(EXIT_SUCCESS);
    }

    let dotenv_result = dotenvy::dotenv();

    logging::init_logging(
        logging::level_for(cli.quiet, cli.debug, cli.verbose),
        cli.is_mcp_mode(),
    );

    match dotenv_result {
        Ok(path) => tracing::debug!("Loaded settings from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    if !Cli::should_use_color() {
        colored::control::set_override(false);
    }

    let exit_code = match cli.command {
        Some(Commands::Serve) => {
            tracing::info!("Starting MCP server");
            run_server().await
        }
        Some(Commands::Doctor { format }) => {
            tracing::info!("Running health check");
            run_doctor(format).await
        }
        Some(Commands::Env) => {
            println!("{}", env::render_environment(&EnvConfigSource));
            EXIT_SUCCESS
        }
        None => EXIT_SUCCESS,
    };

    process::exit(exit_code);
}

async fn run_server() -> i32 {
    match serve().await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            tracing::error!("MCP server error: {:#}", e);
            EXIT_WARNING
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    use rmcp::serve_server;
    use rmcp::transport::io::stdio;
    use tokio_util::sync::CancellationToken;

    let server = McpServer::from_env();
    tracing::info!("Serving tools: {}", server.tool_names().join(", "));

    let ct = CancellationToken::new();
    let ct_clone = ct.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                ct_clone.cancel();
            }
            Err(e) => tracing::warn!("Failed to listen for ctrl+c: {}", e),
        }
    });

    let service = serve_server(server, stdio())
        .await
        .context("Failed to start MCP server")?;
    tracing::info!("MCP server started");

    tokio::select! {
        quit = service.waiting() => {
            let reason = quit.context("MCP service task failed")?;
            tracing::info!("MCP session ended: {:?}", reason);
        }
        _ = ct.cancelled() => {
            tracing::info!("MCP server exiting");
        }
    }
    Ok(())
}

async fn run_doctor(format: DoctorFormat) -> i32 {
    match doctor::run_doctor(format).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            tracing::error!("Doctor error: {:#}", e);
            EXIT_ERROR
        }
    }
}
