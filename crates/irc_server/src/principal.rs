//! The Client Registry: the authoritative directory of every principal this
//! node knows about — local users, external users reachable through a peer,
//! and peer servers themselves.

use dashmap::DashMap;

use crate::errors::ErrorKind;
use crate::session::ConnId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    LocalUser { nick: String, conn_id: ConnId },
    ExternalUser { nick: String, hops: u32, location: String },
    Server { nick: String, hops: u32, conn_id: ConnId },
}

impl Principal {
    pub fn nick(&self) -> &str {
        match self {
            Principal::LocalUser { nick, .. } => nick,
            Principal::ExternalUser { nick, .. } => nick,
            Principal::Server { nick, .. } => nick,
        }
    }
}

#[derive(Debug, Default)]
pub struct ClientRegistry {
    users: DashMap<String, Principal>,
    servers: DashMap<String, Principal>,
    opers: DashMap<String, ()>,
    local_server_name: String,
}

impl ClientRegistry {
    pub fn new(local_server_name: impl Into<String>) -> Self {
        ClientRegistry {
            users: DashMap::new(),
            servers: DashMap::new(),
            opers: DashMap::new(),
            local_server_name: local_server_name.into(),
        }
    }

    fn name_taken(&self, nick: &str) -> bool {
        nick == self.local_server_name || self.users.contains_key(nick) || self.servers.contains_key(nick)
    }

    pub fn add_local(&self, nick: &str, conn_id: ConnId) -> Result<(), ErrorKind> {
        if self.name_taken(nick) {
            return Err(ErrorKind::NickAlreadyInUse(nick.to_string()));
        }
        self.users.insert(
            nick.to_string(),
            Principal::LocalUser { nick: nick.to_string(), conn_id },
        );
        Ok(())
    }

    pub fn add_external(&self, nick: &str, hops: u32, location: &str) -> Result<(), ErrorKind> {
        if hops < 1 {
            return Err(ErrorKind::Internal(format!(
                "hop count of external user '{nick}' must be positive"
            )));
        }
        if self.name_taken(nick) {
            return Err(ErrorKind::NickAlreadyInUse(nick.to_string()));
        }
        self.users.insert(
            nick.to_string(),
            Principal::ExternalUser {
                nick: nick.to_string(),
                hops,
                location: location.to_string(),
            },
        );
        Ok(())
    }

    pub fn add_server(&self, nick: &str, hops: u32, conn_id: ConnId) -> Result<(), ErrorKind> {
        if hops < 1 {
            return Err(ErrorKind::Internal(format!("hop count of server '{nick}' must be positive")));
        }
        if self.name_taken(nick) {
            return Err(ErrorKind::NickAlreadyInUse(nick.to_string()));
        }
        self.servers.insert(
            nick.to_string(),
            Principal::Server { nick: nick.to_string(), hops, conn_id },
        );
        Ok(())
    }

    pub fn get_user(&self, nick: &str) -> Option<Principal> {
        self.users.get(nick).map(|p| p.clone())
    }

    pub fn get_server(&self, nick: &str) -> Option<Principal> {
        self.servers.get(nick).map(|p| p.clone())
    }

    pub fn list_users(&self) -> Vec<String> {
        self.users.iter().map(|e| e.key().clone()).collect()
    }

    pub fn list_local_users(&self) -> Vec<String> {
        self.users
            .iter()
            .filter(|e| matches!(e.value(), Principal::LocalUser { .. }))
            .map(|e| e.key().clone())
            .collect()
    }

    pub fn list_servers(&self) -> Vec<Principal> {
        self.servers.iter().map(|e| e.value().clone()).collect()
    }

    pub fn remove(&self, nick: &str) -> Option<Principal> {
        self.opers.remove(nick);
        self.users.remove(nick).map(|(_, p)| p)
    }

    pub fn remove_server(&self, nick: &str) -> Option<Principal> {
        self.servers.remove(nick).map(|(_, p)| p)
    }

    /// Removes every external user whose next hop is `peer_nick`, returning
    /// the removed set. Used when a peer link goes down.
    pub fn remove_from_server(&self, peer_nick: &str) -> Vec<Principal> {
        let departed: Vec<String> = self
            .users
            .iter()
            .filter(|e| matches!(e.value(), Principal::ExternalUser { location, .. } if location == peer_nick))
            .map(|e| e.key().clone())
            .collect();
        departed.iter().filter_map(|nick| self.users.remove(nick).map(|(_, p)| p)).collect()
    }

    pub fn add_oper_privileges(&self, nick: &str) -> Result<(), ErrorKind> {
        if !self.users.contains_key(nick) {
            return Err(ErrorKind::NoSuchNick(nick.to_string()));
        }
        self.opers.insert(nick.to_string(), ());
        Ok(())
    }

    pub fn has_oper_privileges(&self, nick: &str) -> bool {
        self.opers.contains_key(nick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::next_conn_id;

    #[test]
    fn add_local_rejects_duplicate_nick() {
        let reg = ClientRegistry::new("srv");
        let id = next_conn_id();
        assert!(reg.add_local("alice", id).is_ok());
        assert!(matches!(reg.add_local("alice", next_conn_id()), Err(ErrorKind::NickAlreadyInUse(_))));
    }

    #[test]
    fn add_external_rejects_zero_hops() {
        let reg = ClientRegistry::new("srv");
        assert!(reg.add_external("bob", 0, "peerB").is_err());
        assert!(reg.add_external("bob", 1, "peerB").is_ok());
    }

    #[test]
    fn remove_from_server_purges_only_that_peers_externals() {
        let reg = ClientRegistry::new("srv");
        reg.add_external("bob", 1, "peerB").unwrap();
        reg.add_external("carl", 2, "peerC").unwrap();
        let removed = reg.remove_from_server("peerB");
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].nick(), "bob");
        assert!(reg.get_user("bob").is_none());
        assert!(reg.get_user("carl").is_some());
    }

    #[test]
    fn local_server_name_is_reserved() {
        let reg = ClientRegistry::new("srv");
        assert!(reg.add_local("srv", next_conn_id()).is_err());
    }

    #[test]
    fn oper_privileges_require_a_known_nick() {
        let reg = ClientRegistry::new("srv");
        assert!(reg.add_oper_privileges("ghost").is_err());
        reg.add_local("alice", next_conn_id()).unwrap();
        assert!(reg.add_oper_privileges("alice").is_ok());
        assert!(reg.has_oper_privileges("alice"));
    }
}
