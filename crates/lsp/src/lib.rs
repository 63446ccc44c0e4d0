mod capabilities;
pub mod config;
mod dispatcher;
pub mod document;
pub mod error;
pub mod handlers;
pub mod providers;
pub mod server;
pub mod syntax;
#[cfg(test)]
mod test_utils;
pub mod utils;

use crate::config::Config;
use crate::server::LspServerState;
use anyhow::Result;
use lsp_server::Connection;
use lsp_types::InitializeParams;
use serde::{Serialize, de::DeserializeOwned};

pub fn run_server() -> Result<()> {
    tracing::info!("texenv-language-server started");

    //Setup IO connections
    tracing::debug!("Setting up stdio connections");
    let (connection, io_threads) = lsp_server::Connection::stdio();

    //wait for client to connection
    tracing::debug!("Waiting for client initialization");
    let (request_id, initialize_params) = connection.initialize_start()?;
    tracing::debug!("Received initialize request: id={}", request_id);

    let initialize_params = match serde_json::from_value::<InitializeParams>(initialize_params) {
        Ok(params) => params,
        Err(e) => {
            tracing::error!("Failed to parse initialization parameters: {}", e);
            return Err(e.into());
        }
    };

    if let Some(client_info) = &initialize_params.client_info {
        tracing::info!(
            "Connected to client: '{}' version {}",
            client_info.name,
            client_info.version.as_deref().unwrap_or("unknown")
        );
    }

    let mut config = Config::new();
    if let Some(json) = initialize_params.initialization_options {
        tracing::info!("Applying initialization options: {}", json);
        config.update(json)?;
    }

    let initialize_result = lsp_types::InitializeResult {
        capabilities: capabilities::server_capabilities(),
        server_info: Some(lsp_types::ServerInfo {
            name: String::from("texenv-language-server"),
            version: Some(String::from(env!("CARGO_PKG_VERSION"))),
        }),
    };

    connection.initialize_finish(request_id, to_json(initialize_result)?)?;
    tracing::info!("Initialization completed successfully");

    main_loop(connection, config)?;

    tracing::debug!("Waiting for IO threads to complete");
    io_threads.join()?;
    tracing::info!("Language server stopped");

    Ok(())
}

/// Serves an already initialized connection until the client sends `exit`.
pub fn main_loop(connection: Connection, config: Config) -> Result<()> {
    tracing::info!("initial config: {:#?}", config);
    LspServerState::new(connection.sender, config).run(connection.receiver)
}

pub fn from_json<T: DeserializeOwned>(what: &'static str, json: serde_json::Value) -> Result<T> {
    T::deserialize(&json)
        .map_err(|e| anyhow::anyhow!("could not deserialize {}: {} - {}", what, e, json))
}

pub fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| anyhow::anyhow!("could not serialize to json {}", e))
}
