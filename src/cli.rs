use std::str::FromStr;
use std::sync::Arc;

use clap::ArgMatches;
use serde_json::Value;
use strum::IntoEnumIterator;
use teams_gateway::{
    commands::{
        COMMAND_CLEAR, COMMAND_CONFIG, COMMAND_CREDENTIALS, COMMAND_DESKTOP_SERVER, COMMAND_PATH,
        COMMAND_REFRESH, COMMAND_REQUEST, COMMAND_SET, COMMAND_SHOW, PARAMETER_ACCESS_TOKEN,
        PARAMETER_BODY, PARAMETER_CURRENT_PATH, PARAMETER_METHOD, PARAMETER_NAME,
        PARAMETER_OPTIONS, PARAMETER_ORGANIZATION_ID, PARAMETER_PATH, PARAMETER_PRETTY,
        PARAMETER_REFRESH_TOKEN, PARAMETER_TEAM_ID, PARAMETER_TENANT_ID, PARAMETER_VALUE,
    },
    configuration::Configuration,
    credentials::{CredentialKey, CredentialStore, FileCredentialStore},
    desktop::DesktopServerResolver,
    error::{GatewayError, RequestError},
    request::{Method, RequestBody, RequestOptions},
    response::Reply,
    router::Router,
    session::{StaticLocation, TracingNavigator},
};
use tracing::{debug, warn};

fn extract_subcommand_name(sub_matches: &ArgMatches) -> String {
    match sub_matches.subcommand() {
        Some((name, _)) => name.to_string(),
        None => "unknown".to_string(),
    }
}

fn print_json(value: &Value, pretty: bool) -> Result<(), GatewayError> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}

fn print_reply(reply: Reply<Value>, pretty: bool) -> Result<(), GatewayError> {
    match reply {
        Reply::Success(response) => {
            debug!("Response status {}", response.status);
            print_json(&response.data, pretty)
        }
        Reply::PassThrough(response) => {
            warn!("Session expired on an exempt path ({})", response.status);
            print_json(&response.data, pretty)
        }
    }
}

fn router(
    configuration: Configuration,
    credentials: Arc<FileCredentialStore>,
    current_path: &str,
) -> Router {
    Router::from_configuration(
        configuration,
        credentials,
        Arc::new(TracingNavigator),
        Arc::new(StaticLocation::new(current_path)),
    )
}

fn current_path(sub_matches: &ArgMatches) -> &str {
    sub_matches
        .get_one::<String>(PARAMETER_CURRENT_PATH)
        .map(String::as_str)
        .unwrap_or("/")
}

pub async fn execute_command(
    configuration: Configuration,
    matches: ArgMatches,
) -> Result<(), GatewayError> {
    match matches.subcommand() {
        Some((COMMAND_CONFIG, sub_matches)) => execute_config(configuration, sub_matches),
        Some((COMMAND_CREDENTIALS, sub_matches)) => execute_credentials(sub_matches),
        Some((COMMAND_REQUEST, sub_matches)) => execute_request(configuration, sub_matches).await,
        Some((COMMAND_REFRESH, sub_matches)) => execute_refresh(configuration, sub_matches).await,
        Some((COMMAND_DESKTOP_SERVER, _)) => execute_desktop_server(configuration).await,
        _ => Err(GatewayError::UnsupportedSubcommand(extract_subcommand_name(
            &matches,
        ))),
    }
}

fn execute_config(
    configuration: Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), GatewayError> {
    match sub_matches.subcommand() {
        Some((COMMAND_PATH, _)) => {
            let path = Configuration::get_default_configuration_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
        Some((COMMAND_SHOW, _)) => {
            print!("{}", configuration.to_yaml()?);
            Ok(())
        }
        Some((COMMAND_SET, set_matches)) => {
            let name = set_matches
                .get_one::<String>(PARAMETER_NAME)
                .ok_or_else(|| GatewayError::MissingRequiredArgument(PARAMETER_NAME.to_string()))?;
            let value = set_matches
                .get_one::<String>(PARAMETER_VALUE)
                .ok_or_else(|| GatewayError::MissingRequiredArgument(PARAMETER_VALUE.to_string()))?;

            // Environment overrides are not persisted, so start from the file.
            let path = Configuration::get_default_configuration_file_path()?;
            let mut stored = Configuration::load_from_file(path.clone())?;
            stored.set_property(name, value)?;
            stored.save(&path)?;
            Ok(())
        }
        _ => Err(GatewayError::UnsupportedSubcommand(extract_subcommand_name(
            sub_matches,
        ))),
    }
}

fn execute_credentials(sub_matches: &ArgMatches) -> Result<(), GatewayError> {
    let store = FileCredentialStore::open_default()?;

    match sub_matches.subcommand() {
        Some((COMMAND_SET, set_matches)) => {
            let mut updated = 0;
            for (parameter, key) in [
                (PARAMETER_ACCESS_TOKEN, CredentialKey::AccessToken),
                (PARAMETER_REFRESH_TOKEN, CredentialKey::RefreshToken),
                (PARAMETER_TENANT_ID, CredentialKey::TenantId),
                (PARAMETER_ORGANIZATION_ID, CredentialKey::OrganizationId),
                (PARAMETER_TEAM_ID, CredentialKey::ActiveTeamId),
            ] {
                if let Some(value) = set_matches.get_one::<String>(parameter) {
                    store.set(key, value.as_str())?;
                    updated += 1;
                }
            }
            if updated == 0 {
                return Err(GatewayError::MissingRequiredArgument(
                    "at least one credential value".to_string(),
                ));
            }
            Ok(())
        }
        Some((COMMAND_SHOW, _)) => {
            for key in CredentialKey::iter() {
                let state = if store.get(key).is_some() { "set" } else { "-" };
                println!("{}: {}", key, state);
            }
            Ok(())
        }
        Some((COMMAND_CLEAR, _)) => {
            store.clear()?;
            Ok(())
        }
        _ => Err(GatewayError::UnsupportedSubcommand(extract_subcommand_name(
            sub_matches,
        ))),
    }
}

async fn execute_request(
    configuration: Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), GatewayError> {
    let method = sub_matches
        .get_one::<String>(PARAMETER_METHOD)
        .ok_or_else(|| GatewayError::MissingRequiredArgument(PARAMETER_METHOD.to_string()))?;
    let method = Method::from_str(method)
        .map_err(|_| RequestError::InvalidOption(PARAMETER_METHOD.to_string()))?;
    let path = sub_matches
        .get_one::<String>(PARAMETER_PATH)
        .ok_or_else(|| GatewayError::MissingRequiredArgument(PARAMETER_PATH.to_string()))?;

    let body = match sub_matches.get_one::<String>(PARAMETER_BODY) {
        Some(body) => RequestBody::Json(serde_json::from_str(body)?),
        None => RequestBody::Empty,
    };
    let options = match sub_matches.get_one::<String>(PARAMETER_OPTIONS) {
        Some(options) => RequestOptions::from_json(&serde_json::from_str(options)?)?,
        None => RequestOptions::default(),
    };

    let credentials = Arc::new(FileCredentialStore::open_default()?);
    let router = router(configuration, credentials, current_path(sub_matches));
    let reply = router
        .request::<Value>(method, path, body, &options)
        .await?;
    print_reply(reply, sub_matches.get_flag(PARAMETER_PRETTY))
}

async fn execute_refresh(
    configuration: Configuration,
    sub_matches: &ArgMatches,
) -> Result<(), GatewayError> {
    let credentials = Arc::new(FileCredentialStore::open_default()?);
    let refresh_token = credentials.refresh_token().ok_or_else(|| {
        GatewayError::MissingRequiredArgument(PARAMETER_REFRESH_TOKEN.to_string())
    })?;

    let router = router(configuration, credentials.clone(), current_path(sub_matches));
    let reply = router.refresh_token(&refresh_token).await?;

    if let Reply::Success(response) = &reply {
        let token = response
            .data
            .get("token")
            .or_else(|| response.data.get("access_token"))
            .and_then(Value::as_str);
        if let Some(token) = token {
            credentials.set(CredentialKey::AccessToken, token)?;
            router.unauthorized().mark_authenticated();
            debug!("Stored refreshed access token");
        }
    }
    print_reply(reply, sub_matches.get_flag(PARAMETER_PRETTY))
}

async fn execute_desktop_server(configuration: Configuration) -> Result<(), GatewayError> {
    let fallback = configuration.server_url().cloned();
    let credentials = Arc::new(FileCredentialStore::open_default()?);
    let router = router(configuration, credentials, "/");
    let local = router.registry().local().await?;

    match DesktopServerResolver::new(fallback).resolve(&local).await {
        Some(server) => println!("{}", server),
        None => println!("none"),
    }
    Ok(())
}
