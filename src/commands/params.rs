//! Shared command parameters for all CLI commands.

use clap::{Arg, ArgAction};

// Command groups
pub const COMMAND_CONFIG: &str = "config";
pub const COMMAND_CREDENTIALS: &str = "credentials";
pub const COMMAND_REQUEST: &str = "request";
pub const COMMAND_REFRESH: &str = "refresh";
pub const COMMAND_DESKTOP_SERVER: &str = "desktop-server";

// Subcommands
pub const COMMAND_PATH: &str = "path";
pub const COMMAND_SHOW: &str = "show";
pub const COMMAND_SET: &str = "set";
pub const COMMAND_CLEAR: &str = "clear";

// Parameter names
pub const PARAMETER_VERBOSE: &str = "verbose";
pub const PARAMETER_NAME: &str = "name";
pub const PARAMETER_VALUE: &str = "value";
pub const PARAMETER_METHOD: &str = "method";
pub const PARAMETER_PATH: &str = "path";
pub const PARAMETER_BODY: &str = "body";
pub const PARAMETER_OPTIONS: &str = "options";
pub const PARAMETER_CURRENT_PATH: &str = "current-path";
pub const PARAMETER_PRETTY: &str = "pretty";
pub const PARAMETER_ACCESS_TOKEN: &str = "access-token";
pub const PARAMETER_REFRESH_TOKEN: &str = "refresh-token";
pub const PARAMETER_TENANT_ID: &str = "tenant-id";
pub const PARAMETER_ORGANIZATION_ID: &str = "organization-id";
pub const PARAMETER_TEAM_ID: &str = "team-id";

pub fn pretty_parameter() -> Arg {
    Arg::new(PARAMETER_PRETTY)
        .long(PARAMETER_PRETTY)
        .action(ArgAction::SetTrue)
        .help("Pretty-print JSON output")
}

pub fn current_path_parameter() -> Arg {
    Arg::new(PARAMETER_CURRENT_PATH)
        .long(PARAMETER_CURRENT_PATH)
        .num_args(1)
        .default_value("/")
        .help("Application path the request is made from; decides how a 401 is handled")
}

pub fn credential_parameter(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).num_args(1).help(help)
}
