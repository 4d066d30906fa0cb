//! CLI command definitions and argument parsing.
//!
//! Commands are defined with the clap builder API, one file per command group.

use clap::{Arg, ArgAction, ArgMatches, Command};

pub mod config;
pub mod credentials;
pub mod params;
pub mod request;

pub use params::*;

/// Build the full command tree.
pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .propagate_version(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(PARAMETER_VERBOSE)
                .short('v')
                .long(PARAMETER_VERBOSE)
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable verbose output for debugging"),
        )
        .subcommand(config::config_command())
        .subcommand(credentials::credentials_command())
        .subcommand(request::request_command())
        .subcommand(request::refresh_command())
        .subcommand(request::desktop_server_command())
}

/// Parse the process arguments.
pub fn create_cli_commands() -> ArgMatches {
    build_cli().get_matches()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_tree_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_request_arguments() {
        let matches = build_cli()
            .try_get_matches_from([
                "teams-gateway",
                "request",
                "post",
                "/tasks",
                "--body",
                r#"{"title":"x"}"#,
                "--options",
                r#"{"directAPI":false}"#,
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, COMMAND_REQUEST);
        assert_eq!(sub.get_one::<String>(PARAMETER_METHOD).unwrap(), "post");
        assert_eq!(sub.get_one::<String>(PARAMETER_PATH).unwrap(), "/tasks");
        assert_eq!(sub.get_one::<String>(PARAMETER_CURRENT_PATH).unwrap(), "/");
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        assert!(build_cli()
            .try_get_matches_from(["teams-gateway", "request", "trace", "/tasks"])
            .is_err());
    }
}
