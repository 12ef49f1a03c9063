//! The Channel Registry: channels, their members, operators, ban set, key,
//! and topic. Lifecycle is bound to membership — a channel exists in the
//! registry iff it has at least one member.

use dashmap::DashMap;
use dashmap::DashSet;
use log::info;
use tokio::sync::RwLock;

use crate::errors::ErrorKind;

#[derive(Debug)]
pub struct Channel {
    pub name: String,
    pub users: DashSet<String>,
    pub chanops: DashSet<String>,
    pub banned: DashSet<String>,
    pub key: RwLock<String>,
    pub topic: RwLock<String>,
}

impl Channel {
    fn new(name: &str, creator: &str) -> Self {
        let users = DashSet::new();
        users.insert(creator.to_string());
        let chanops = DashSet::new();
        chanops.insert(creator.to_string());
        Channel {
            name: name.to_string(),
            users,
            chanops,
            banned: DashSet::new(),
            key: RwLock::new(String::new()),
            topic: RwLock::new(String::new()),
        }
    }

    /// `[@|+]nick` member list, chanops prefixed with `@`, per `RPL_NAMREPLY`.
    pub fn names_list(&self) -> Vec<String> {
        self.users
            .iter()
            .map(|nick| {
                if self.chanops.contains(nick.key()) {
                    format!("@{}", nick.key())
                } else {
                    nick.key().clone()
                }
            })
            .collect()
    }
}

/// Thread-safe directory of every channel this node knows about.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: DashMap<String, Channel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `JOIN(channel, nick, key)`. Creates the channel on first join, making
    /// the joiner its chanop; otherwise checks the ban set and key.
    pub async fn join(&self, channel: &str, nick: &str, key: &str) -> Result<(), ErrorKind> {
        if let Some(existing) = self.channels.get(channel) {
            if existing.banned.contains(nick) {
                return Err(ErrorKind::BannedFromChannel(channel.to_string()));
            }
            if *existing.key.read().await != key {
                return Err(ErrorKind::BadChannelKey(channel.to_string()));
            }
            existing.users.insert(nick.to_string());
            return Ok(());
        }
        let channel_entry = Channel::new(channel, nick);
        info!("channel '{channel}' created by '{nick}'");
        self.channels.insert(channel.to_string(), channel_entry);
        Ok(())
    }

    /// `PART(channel, nick)`. Deletes the channel once it becomes empty.
    pub fn part(&self, channel: &str, nick: &str) -> Result<(), ErrorKind> {
        let now_empty = {
            let Some(chan) = self.channels.get(channel) else {
                return Err(ErrorKind::NoSuchChannel(channel.to_string()));
            };
            if !chan.users.contains(nick) {
                return Err(ErrorKind::NotOnChannel(channel.to_string()));
            }
            chan.users.remove(nick);
            chan.chanops.remove(nick);
            chan.users.is_empty()
        };
        if now_empty {
            self.channels.remove(channel);
            info!("channel '{channel}' deleted (last member parted)");
        }
        Ok(())
    }

    /// `KICK(channel, op_nick, target_nick)`. Requires `op_nick` to be a
    /// chanop; otherwise behaves exactly like `part(channel, target_nick)`.
    pub fn kick(&self, channel: &str, op_nick: &str, target_nick: &str) -> Result<(), ErrorKind> {
        {
            let Some(chan) = self.channels.get(channel) else {
                return Err(ErrorKind::NoSuchChannel(channel.to_string()));
            };
            if !chan.chanops.contains(op_nick) {
                return Err(ErrorKind::ChanOpPrivsNeeded(channel.to_string()));
            }
        }
        self.part(channel, target_nick)
    }

    /// Removes `nick` from every channel it is a member of (`QUIT`),
    /// deleting any channel that becomes empty. Returns the channel names
    /// the nick was removed from, so callers can relay a departure notice.
    pub fn quit(&self, nick: &str) -> Vec<String> {
        let mut departed = Vec::new();
        let mut emptied = Vec::new();
        for entry in self.channels.iter() {
            let chan = entry.value();
            if chan.users.remove(nick).is_some() {
                chan.chanops.remove(nick);
                departed.push(chan.name.clone());
                if chan.users.is_empty() {
                    emptied.push(chan.name.clone());
                }
            }
        }
        for name in &emptied {
            self.channels.remove(name);
            info!("channel '{name}' deleted (last member quit)");
        }
        departed
    }

    /// Every channel `nick` currently belongs to, used on teardown to find
    /// who still needs to see its departure before it is removed.
    pub fn channels_of(&self, nick: &str) -> Vec<String> {
        self.channels
            .iter()
            .filter(|e| e.value().users.contains(nick))
            .map(|e| e.key().clone())
            .collect()
    }

    pub fn is_member(&self, channel: &str, nick: &str) -> bool {
        self.channels.get(channel).is_some_and(|c| c.users.contains(nick))
    }

    pub fn member_nicks(&self, channel: &str) -> Option<Vec<String>> {
        self.channels.get(channel).map(|c| c.users.iter().map(|e| e.key().clone()).collect())
    }

    pub fn names_list(&self, channel: &str) -> Option<Vec<String>> {
        self.channels.get(channel).map(|c| c.names_list())
    }

    pub async fn topic(&self, channel: &str) -> Option<String> {
        match self.channels.get(channel) {
            Some(c) => Some(c.topic.read().await.clone()),
            None => None,
        }
    }

    pub fn exists(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_join_creates_channel_and_makes_creator_chanop() {
        let reg = ChannelRegistry::new();
        reg.join("#hack", "alice", "").await.unwrap();
        assert!(reg.is_member("#hack", "alice"));
        assert_eq!(reg.names_list("#hack").unwrap(), vec!["@alice".to_string()]);
    }

    #[tokio::test]
    async fn join_then_part_leaves_registry_unchanged() {
        let reg = ChannelRegistry::new();
        reg.join("#hack", "alice", "").await.unwrap();
        reg.part("#hack", "alice").unwrap();
        assert!(!reg.exists("#hack"));
    }

    #[tokio::test]
    async fn part_requires_membership() {
        let reg = ChannelRegistry::new();
        reg.join("#hack", "alice", "").await.unwrap();
        assert!(matches!(reg.part("#hack", "bob"), Err(ErrorKind::NotOnChannel(_))));
    }

    #[tokio::test]
    async fn kick_requires_chanop() {
        let reg = ChannelRegistry::new();
        reg.join("#hack", "alice", "").await.unwrap();
        reg.join("#hack", "bob", "").await.unwrap();
        assert!(matches!(reg.kick("#hack", "bob", "alice"), Err(ErrorKind::ChanOpPrivsNeeded(_))));
        assert!(reg.kick("#hack", "alice", "bob").is_ok());
        assert!(!reg.is_member("#hack", "bob"));
    }

    #[tokio::test]
    async fn banned_nick_cannot_join() {
        let reg = ChannelRegistry::new();
        reg.join("#hack", "alice", "").await.unwrap();
        reg.channels.get("#hack").unwrap().banned.insert("bob".to_string());
        assert!(matches!(reg.join("#hack", "bob", "").await, Err(ErrorKind::BannedFromChannel(_))));
    }

    #[tokio::test]
    async fn empty_key_is_a_no_op_match() {
        let reg = ChannelRegistry::new();
        reg.join("#hack", "alice", "").await.unwrap();
        assert!(reg.join("#hack", "bob", "").await.is_ok());
    }

    #[tokio::test]
    async fn wrong_key_is_rejected() {
        let reg = ChannelRegistry::new();
        reg.join("#hack", "alice", "").await.unwrap();
        *reg.channels.get("#hack").unwrap().key.write().await = "secret".to_string();
        assert!(matches!(reg.join("#hack", "bob", "wrong").await, Err(ErrorKind::BadChannelKey(_))));
        assert!(reg.join("#hack", "carol", "secret").await.is_ok());
    }

    #[tokio::test]
    async fn channels_of_lists_every_membership() {
        let reg = ChannelRegistry::new();
        reg.join("#a", "alice", "").await.unwrap();
        reg.join("#b", "alice", "").await.unwrap();
        let mut channels = reg.channels_of("alice");
        channels.sort();
        assert_eq!(channels, vec!["#a".to_string(), "#b".to_string()]);
    }

    #[tokio::test]
    async fn quit_purges_every_channel_and_deletes_emptied_ones() {
        let reg = ChannelRegistry::new();
        reg.join("#a", "alice", "").await.unwrap();
        reg.join("#b", "alice", "").await.unwrap();
        reg.join("#b", "bob", "").await.unwrap();
        let departed = reg.quit("alice");
        assert_eq!(departed.len(), 2);
        assert!(!reg.exists("#a"));
        assert!(reg.exists("#b"));
        assert!(!reg.is_member("#b", "alice"));
    }
}
