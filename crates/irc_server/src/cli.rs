//! Command-line interface, parsed with `clap`'s derive API.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "irc_server", about = "A classical RFC 1459 IRC daemon")]
pub struct Cli {
    /// Bind address. Falls back to the bootstrap config, then `127.0.0.1`.
    #[arg(short = 'a', long = "address")]
    pub address: Option<String>,

    /// Bind port. Falls back to the bootstrap config, then `6667`.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// This node's server name, advertised in message prefixes and SERVER
    /// introductions. Falls back to the bootstrap config, then `irc.local`.
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Path to the ACL/credentials authority file (`I:`/`C:`/`N:`/`O:`
    /// lines). Required to admit any user or peer.
    #[arg(long = "acl-file")]
    pub acl_file: String,

    /// Optional bootstrap TOML config; absence is not an error.
    #[arg(long = "config")]
    pub config: Option<String>,

    /// `flexi_logger`-compatible log level spec.
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}
