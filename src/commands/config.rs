//! Configuration command definitions.

use crate::commands::params::{
    COMMAND_CONFIG, COMMAND_PATH, COMMAND_SET, COMMAND_SHOW, PARAMETER_NAME, PARAMETER_VALUE,
};
use clap::{Arg, Command};

/// Create the config command with all its subcommands.
pub fn config_command() -> Command {
    Command::new(COMMAND_CONFIG)
        .about("Manage gateway configuration")
        .subcommand_required(true)
        .subcommand(Command::new(COMMAND_PATH).about("Print the configuration file path"))
        .subcommand(Command::new(COMMAND_SHOW).about("Print the effective configuration"))
        .subcommand(
            Command::new(COMMAND_SET)
                .about("Set a configuration property")
                .arg(
                    Arg::new(PARAMETER_NAME)
                        .required(true)
                        .value_parser([
                            "local_api_url",
                            "server_url",
                            "desktop",
                            "redirect_path",
                            "languages",
                            "timeout_secs",
                            "legacy_team_bearer",
                        ])
                        .help("Property name"),
                )
                .arg(
                    Arg::new(PARAMETER_VALUE)
                        .required(true)
                        .allow_hyphen_values(true)
                        .help("Property value; an empty server_url disables direct calls"),
                ),
        )
}
