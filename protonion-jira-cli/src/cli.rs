use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::io;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DoctorFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "protonion-jira")]
#[command(version)]
#[command(about = "An MCP server exposing Jira task tools to AI assistants")]
#[command(long_about = "
protonion-jira is an MCP (Model Context Protocol) server that lets an AI
assistant list, inspect, move and create Jira issues on your behalf.

Connection settings are read from the environment or a .env file:
  JIRA_BASE_URL, JIRA_EMAIL, JIRA_API_TOKEN

Example usage:
  protonion-jira serve     # Run as MCP server
  protonion-jira doctor    # Check configuration and Jira access
  protonion-jira env       # Show the settings in use
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run as MCP server over stdio
    #[command(long_about = "
Runs protonion-jira as an MCP server on stdin/stdout. Logs are written to
~/.protonion/mcp.log (override the file name with PROTONION_LOG_FILE)
because stdout carries the protocol.

Missing settings do not stop the server; tools report them when called.

Example:
  protonion-jira serve
")]
    Serve,
    /// Check configuration and Jira access
    #[command(long_about = "
Runs the health probes and prints the report:

- Configuration: required settings are present
- API Connectivity: Jira answers a lightweight request
- Authentication: the credentials are accepted
- Permissions: the account holds the expected capability (optional)

Exit codes:
  0 - Healthy
  1 - Degraded (only the optional probe failed)
  2 - Unhealthy
")]
    Doctor {
        /// Output format
        #[arg(long, value_enum, default_value_t = DoctorFormat::Text)]
        format: DoctorFormat,
    },
    /// Show the connection settings in use, with the token masked
    Env,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(args)
    }

    /// Whether the command talks MCP over stdout
    pub fn is_mcp_mode(&self) -> bool {
        matches!(self.command, Some(Commands::Serve))
    }

    pub fn is_tty() -> bool {
        io::stdout().is_terminal()
    }

    pub fn should_use_color() -> bool {
        Self::is_tty() && std::env::var("NO_COLOR").is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_help_works() {
        let error = Cli::try_parse_from_args(["protonion-jira", "--help"]).unwrap_err();
        assert_eq!(error.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_works() {
        let error = Cli::try_parse_from_args(["protonion-jira", "--version"]).unwrap_err();
        assert_eq!(error.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_no_subcommand() {
        let cli = Cli::try_parse_from_args(["protonion-jira"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(!cli.debug);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_serve_is_mcp_mode() {
        let cli = Cli::try_parse_from_args(["protonion-jira", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert!(cli.is_mcp_mode());
    }

    #[test]
    fn test_cli_doctor_defaults_to_text() {
        let cli = Cli::try_parse_from_args(["protonion-jira", "doctor"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Doctor {
                format: DoctorFormat::Text
            })
        ));
        assert!(!cli.is_mcp_mode());
    }

    #[test]
    fn test_cli_doctor_json() {
        let cli = Cli::try_parse_from_args(["protonion-jira", "doctor", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Doctor {
                format: DoctorFormat::Json
            })
        ));
    }

    #[test]
    fn test_cli_flags_before_subcommand() {
        let cli = Cli::try_parse_from_args(["protonion-jira", "--debug", "env"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Some(Commands::Env)));
    }

    #[test]
    fn test_cli_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from_args(["protonion-jira", "prompt"]).is_err());
    }
}
