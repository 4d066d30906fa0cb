use teams_gateway::{
    commands::{create_cli_commands, PARAMETER_VERBOSE},
    configuration::Configuration,
    exit_codes::GatewayExitCode,
};
use tracing_subscriber::EnvFilter;

mod cli;
use cli::execute_command;

/// Main entry point for the program
#[tokio::main]
async fn main() {
    let matches = create_cli_commands();

    // Intialize the logging subsystem; RUST_LOG wins over --verbose
    let default_level = if matches.get_flag(PARAMETER_VERBOSE) {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match Configuration::load_or_create_default() {
        Ok(configuration) => execute_command(configuration, matches)
            .await
            .map_err(|e| (e.exit_code(), e.to_string())),
        Err(e) => Err((
            GatewayExitCode::ConfigError,
            e.to_string(),
        )),
    };

    if let Err((code, message)) = result {
        eprintln!("ERROR: {}", message);
        ::std::process::exit(code.code());
    }
}
