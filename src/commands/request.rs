//! Request, refresh and desktop-server command definitions.

use crate::commands::params::{
    current_path_parameter, pretty_parameter, COMMAND_DESKTOP_SERVER, COMMAND_REFRESH,
    COMMAND_REQUEST, PARAMETER_BODY, PARAMETER_METHOD, PARAMETER_OPTIONS, PARAMETER_PATH,
};
use clap::{Arg, Command};

/// Create the request command.
pub fn request_command() -> Command {
    Command::new(COMMAND_REQUEST)
        .about("Send a request through the router")
        .arg(
            Arg::new(PARAMETER_METHOD)
                .required(true)
                .value_parser(["get", "post", "put", "patch", "delete"])
                .ignore_case(true)
                .help("HTTP method"),
        )
        .arg(
            Arg::new(PARAMETER_PATH)
                .required(true)
                .help("API path, e.g. /tasks"),
        )
        .arg(
            Arg::new(PARAMETER_BODY)
                .long(PARAMETER_BODY)
                .short('d')
                .num_args(1)
                .help("JSON request body"),
        )
        .arg(
            Arg::new(PARAMETER_OPTIONS)
                .long(PARAMETER_OPTIONS)
                .short('o')
                .num_args(1)
                .help("JSON request options: {\"tenantId\", \"directAPI\", \"headers\"}"),
        )
        .arg(current_path_parameter())
        .arg(pretty_parameter())
}

/// Create the refresh command.
pub fn refresh_command() -> Command {
    Command::new(COMMAND_REFRESH)
        .about("Exchange the stored refresh token for a new access token")
        .arg(current_path_parameter())
        .arg(pretty_parameter())
}

/// Create the desktop-server command.
pub fn desktop_server_command() -> Command {
    Command::new(COMMAND_DESKTOP_SERVER)
        .about("Resolve the API server address the way desktop mode does")
}
