use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use flexi_logger::{Duplicate, Logger};
use irc_server::acl::AclAuthority;
use irc_server::cli::Cli;
use irc_server::config::Config;
use irc_server::server::serve;
use irc_server::state::ServerState;
use log::{error, info};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    Logger::try_with_str(&cli.log_level)?
        .log_to_stderr()
        .duplicate_to_stderr(Duplicate::All)
        .start()?;

    let config = match &cli.config {
        Some(path) => Some(Config::load(path)?),
        None => None,
    };

    let address = cli
        .address
        .or_else(|| config.as_ref().map(|c| c.network.bind_address.clone()))
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = cli.port.or_else(|| config.as_ref().map(|c| c.network.port)).unwrap_or(6667);
    let name = cli
        .name
        .or_else(|| config.as_ref().map(|c| c.server.name.clone()))
        .unwrap_or_else(|| "irc.local".to_string());

    let acl = AclAuthority::load(&cli.acl_file).map_err(|err| {
        error!("failed to load ACL file '{}': {err}", cli.acl_file);
        err
    })?;

    let state = Arc::new(ServerState::new(name.clone(), acl, created_timestamp()));

    let bind_addr = format!("{address}:{port}");
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("'{name}' listening on {bind_addr}");

    serve(state, listener).await?;
    Ok(())
}

/// A timestamp for `ServerState::created`. RFC 1459 servers only ever echo
/// this string back in replies, never parse it, so a raw epoch-seconds
/// string is all the wire format needs.
fn created_timestamp() -> String {
    let secs = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    secs.to_string()
}
