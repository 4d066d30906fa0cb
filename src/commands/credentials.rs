//! Credential command definitions.

use crate::commands::params::{
    credential_parameter, COMMAND_CLEAR, COMMAND_CREDENTIALS, COMMAND_SET, COMMAND_SHOW,
    PARAMETER_ACCESS_TOKEN, PARAMETER_ORGANIZATION_ID, PARAMETER_REFRESH_TOKEN,
    PARAMETER_TEAM_ID, PARAMETER_TENANT_ID,
};
use clap::Command;

/// Create the credentials command with all its subcommands.
pub fn credentials_command() -> Command {
    Command::new(COMMAND_CREDENTIALS)
        .about("Manage stored session credentials")
        .subcommand_required(true)
        .subcommand(
            Command::new(COMMAND_SET)
                .about("Store one or more credential values")
                .arg(credential_parameter(PARAMETER_ACCESS_TOKEN, "Access token"))
                .arg(credential_parameter(PARAMETER_REFRESH_TOKEN, "Refresh token"))
                .arg(credential_parameter(PARAMETER_TENANT_ID, "Tenant id"))
                .arg(credential_parameter(PARAMETER_ORGANIZATION_ID, "Organization id"))
                .arg(credential_parameter(PARAMETER_TEAM_ID, "Active team id")),
        )
        .subcommand(
            Command::new(COMMAND_SHOW).about("Show which credentials are stored (values are masked)"),
        )
        .subcommand(Command::new(COMMAND_CLEAR).about("Remove all stored credentials"))
}
