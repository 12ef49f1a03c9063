//! Password/ACL Authority: parses the line-oriented `I:`/`C:`/`N:`/`O:`
//! credentials file and answers admission questions for it.
//!
//! This file format is not TOML and is independent of [`crate::config`]'s
//! bootstrap settings; it is the server's access-control list, reloaded only
//! at startup.

use log::info;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::validators::validate_user;

#[derive(Debug, Default, Clone)]
pub struct AclAuthority {
    /// key: `"<user>@<host-pattern>"`, value: required password (`None` = any).
    client_rules: HashMap<String, Option<String>>,
    /// key: peer hostname, value: password we present when connecting out.
    connect_passwords: HashMap<String, String>,
    /// key: peer hostname, value: password we require from an incoming peer.
    accept_passwords: HashMap<String, String>,
    /// key: operator user, value: required password.
    oper_passwords: HashMap<String, String>,
}

impl AclAuthority {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let acl = Self::parse_str(&content);
        info!("ACL config loaded: {} client rules, {} peers", acl.client_rules.len(), acl.connect_passwords.len());
        Ok(acl)
    }

    /// Parses ACL content already in memory; `load` is a thin file-reading
    /// wrapper around this, and tests build fixtures straight from a string.
    pub fn parse_str(content: &str) -> Self {
        let mut acl = AclAuthority::default();
        for line in content.lines() {
            acl.parse_line(line);
        }
        acl
    }

    fn parse_line(&mut self, raw: &str) {
        if raw.is_empty() || raw.starts_with('#') {
            return;
        }
        let mut chars = raw.chars();
        let Some(kind) = chars.next() else { return };
        if !"ICNO".contains(kind) || chars.next() != Some(':') {
            return;
        }
        // strip trailing comment, then drop the two-character "X:" prefix
        let line = raw.split('#').next().unwrap_or(raw).trim_end();
        let Some(rest) = line.get(2..) else { return };
        let parts: Vec<&str> = rest.splitn(2, ':').collect();
        if parts.len() != 2 {
            return;
        }
        let key = parts[0].to_string();
        let value = if parts[1].is_empty() { None } else { Some(parts[1].to_string()) };

        match kind {
            'I' => {
                if Self::valid_i_host(&key) {
                    self.client_rules.insert(key, value);
                }
            }
            'C' => {
                if let Some(v) = value {
                    self.connect_passwords.insert(key, v);
                }
            }
            'N' => {
                if let Some(v) = value {
                    self.accept_passwords.insert(key, v);
                }
            }
            'O' => {
                if value.is_some() && validate_user(&key) {
                    self.oper_passwords.insert(key, value.unwrap());
                }
            }
            _ => unreachable!(),
        }
    }

    fn valid_i_host(key: &str) -> bool {
        key.split('@').count() == 2
    }

    /// Positional, dot-component wildcard match, per the reference
    /// implementation: not DNS-style suffix wildcarding.
    pub fn valid_user_password(&self, user: &str, host: &str, password: Option<&str>) -> bool {
        let host_parts: Vec<&str> = host.split('.').collect();
        for (rule_key, rule_password) in &self.client_rules {
            let Some((rule_user, rule_host)) = rule_key.split_once('@') else { continue };
            let rule_host_parts: Vec<&str> = rule_host.split('.').collect();

            let mut valid_parts = 0usize;
            for (idx, elem) in rule_host_parts.iter().enumerate() {
                if idx > host_parts.len().saturating_sub(1) {
                    break;
                }
                if *elem == "*" {
                    valid_parts = rule_host_parts.len();
                    break;
                } else if host_parts[idx] == *elem {
                    valid_parts += 1;
                    continue;
                } else {
                    break;
                }
            }

            if valid_parts == rule_host_parts.len() && (rule_user == "*" || rule_user == user) {
                return rule_password.is_none() || rule_password.as_deref() == password;
            }
        }
        false
    }

    pub fn valid_connect_password(&self, peer_host: &str, password: Option<&str>) -> bool {
        self.connect_passwords.get(peer_host).map(String::as_str) == password
    }

    pub fn valid_accept_password(&self, peer_host: &str, password: Option<&str>) -> bool {
        self.accept_passwords.get(peer_host).map(String::as_str) == password
    }

    pub fn get_connect_password(&self, peer_host: &str) -> Option<&str> {
        self.connect_passwords.get(peer_host).map(String::as_str)
    }

    pub fn valid_operator(&self, user: &str, password: &str) -> bool {
        self.oper_passwords.get(user).map(String::as_str) == Some(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acl_from(lines: &str) -> AclAuthority {
        AclAuthority::parse_str(lines)
    }

    #[test]
    fn wildcard_hostname_accepts_any_password() {
        let acl = acl_from("I:alice@*:\n");
        assert!(acl.valid_user_password("alice", "host.example.com", Some("whatever")));
        assert!(acl.valid_user_password("alice", "host.example.com", None));
    }

    #[test]
    fn positional_dotted_match_not_suffix_based() {
        // rule host "host.*" should match "host.anything" but not "other.host"
        let acl = acl_from("I:alice@host.*:secret\n");
        assert!(acl.valid_user_password("alice", "host.example.com", Some("secret")));
        assert!(!acl.valid_user_password("alice", "other.host.com", Some("secret")));
        assert!(!acl.valid_user_password("alice", "host.example.com", Some("wrong")));
    }

    #[test]
    fn comments_and_malformed_lines_are_ignored() {
        let acl = acl_from("# a comment\nI:alice@*:pw # trailing comment\nbogus line\nX:nope:nope\n");
        assert!(acl.valid_user_password("alice", "anywhere", Some("pw")));
    }

    #[test]
    fn operator_credentials() {
        let acl = acl_from("O:root:hunter2\n");
        assert!(acl.valid_operator("root", "hunter2"));
        assert!(!acl.valid_operator("root", "wrong"));
        assert!(!acl.valid_operator("nobody", "hunter2"));
    }

    #[test]
    fn peer_credentials() {
        let acl = acl_from("C:peer.example.com:outbound-pw\nN:peer.example.com:inbound-pw\n");
        assert!(acl.valid_connect_password("peer.example.com", Some("outbound-pw")));
        assert!(acl.valid_accept_password("peer.example.com", Some("inbound-pw")));
    }
}
