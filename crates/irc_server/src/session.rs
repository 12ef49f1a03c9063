//! Per-connection session state: one [`SessionInfo`] per open socket,
//! tracked from TCP accept through registration to teardown.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::message::Message;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one open connection for the lifetime of that connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub u64);

pub fn next_conn_id() -> ConnId {
    ConnId(NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed))
}

/// A connection's "socket": handlers never touch `TcpStream` directly, they
/// hand a fully-built [`Message`] to the connection's writer task.
pub type ConnHandle = mpsc::UnboundedSender<Message>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    Unknown,
    User,
    ExternalUser,
    Server,
}

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub conn_id: ConnId,
    pub handle: ConnHandle,
    pub password: Option<String>,
    pub nickname: String,
    pub username: Option<String>,
    pub hostname: Option<String>,
    pub servername: Option<String>,
    pub realname: Option<String>,
    pub hops: u32,
    pub session_type: SessionType,
    pub is_oper: bool,
    pub peer_addr: String,
}

impl SessionInfo {
    pub fn new(conn_id: ConnId, handle: ConnHandle, peer_addr: String) -> Self {
        SessionInfo {
            conn_id,
            handle,
            password: None,
            nickname: String::new(),
            username: None,
            hostname: None,
            servername: None,
            realname: None,
            hops: 0,
            session_type: SessionType::Unknown,
            is_oper: false,
            peer_addr,
        }
    }

    pub fn registered(&self) -> bool {
        !self.nickname.is_empty() && self.session_type != SessionType::Unknown
    }
}

/// Maps every currently open connection to its [`SessionInfo`].
#[derive(Debug, Default)]
pub struct SessionTable {
    sessions: DashMap<ConnId, SessionInfo>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: SessionInfo) {
        self.sessions.insert(session.conn_id, session);
    }

    pub fn remove(&self, conn_id: ConnId) -> Option<SessionInfo> {
        self.sessions.remove(&conn_id).map(|(_, v)| v)
    }

    pub fn get_handle(&self, conn_id: ConnId) -> Option<ConnHandle> {
        self.sessions.get(&conn_id).map(|s| s.handle.clone())
    }

    pub fn with_session<R>(&self, conn_id: ConnId, f: impl FnOnce(&mut SessionInfo) -> R) -> Option<R> {
        self.sessions.get_mut(&conn_id).map(|mut s| f(&mut s))
    }

    pub fn get_snapshot(&self, conn_id: ConnId) -> Option<SessionInfo> {
        self.sessions.get(&conn_id).map(|s| s.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_handle() -> ConnHandle {
        let (tx, _rx) = mpsc::unbounded_channel();
        tx
    }

    #[test]
    fn registered_requires_nick_and_type() {
        let info = SessionInfo::new(next_conn_id(), fresh_handle(), "127.0.0.1".into());
        assert!(!info.registered());
    }

    #[test]
    fn table_round_trips_a_session() {
        let table = SessionTable::new();
        let id = next_conn_id();
        table.insert(SessionInfo::new(id, fresh_handle(), "127.0.0.1".into()));
        assert!(table.get_handle(id).is_some());
        table.with_session(id, |s| s.nickname = "alice".into());
        assert_eq!(table.get_snapshot(id).unwrap().nickname, "alice");
        assert!(table.remove(id).is_some());
        assert!(table.get_handle(id).is_none());
    }
}
