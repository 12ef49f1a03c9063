//! Server-scoped state: the top-level object passed by reference into every
//! command handler. Owns the registries; nothing here is a process global.

use dashmap::DashMap;
use tokio::task::AbortHandle;

use crate::acl::AclAuthority;
use crate::channels::ChannelRegistry;
use crate::principal::ClientRegistry;
use crate::session::{ConnId, SessionTable};

#[derive(Debug)]
pub struct ServerState {
    pub name: String,
    pub clients: ClientRegistry,
    pub channels: ChannelRegistry,
    pub sessions: SessionTable,
    pub acl: AclAuthority,
    pub created: String,
    /// Each connection's reader-task handle, so teardown can cancel it
    /// outright instead of waiting on the socket to notice its write half
    /// closed.
    pub reader_handles: DashMap<ConnId, AbortHandle>,
}

impl ServerState {
    pub fn new(name: impl Into<String>, acl: AclAuthority, created: impl Into<String>) -> Self {
        let name = name.into();
        ServerState {
            clients: ClientRegistry::new(name.clone()),
            channels: ChannelRegistry::new(),
            sessions: SessionTable::new(),
            acl,
            name,
            created: created.into(),
            reader_handles: DashMap::new(),
        }
    }
}
