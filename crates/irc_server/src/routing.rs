//! The Routing Plane: resolves a nickname or channel to the set of outgoing
//! connections that should see a message, applies loop/echo suppression,
//! and hands each framed [`Message`] to the target connection's writer task.
//!
//! Handlers never touch a `TcpStream`; they build a `Message` and call one
//! of the functions here, which look the destination up in the registries
//! and push onto the connection's `ConnHandle`.

use std::collections::HashSet;

use log::{error, warn};

use crate::errors::ErrorKind;
use crate::message::{Message, Prefix};
use crate::principal::Principal;
use crate::session::ConnId;
use crate::state::ServerState;

fn warn_if_numeric(message: &Message, where_: &str) {
    if message.command.is_numeric() {
        warn!("numeric reply routed through {where_}, which is meant for verbs only");
    }
}

/// Hands `message` to one connection's writer task. Never panics on a
/// connection that has already gone away; it simply logs and drops.
pub fn send_to_conn(state: &ServerState, conn_id: ConnId, message: Message) {
    match state.sessions.get_handle(conn_id) {
        Some(handle) => {
            if handle.send(message).is_err() {
                warn!("dropped message for conn {conn_id:?}: writer task already gone");
            }
        }
        None => warn!("dropped message for unknown conn {conn_id:?}"),
    }
}

/// Builds and sends a numeric reply to exactly one connection. `recipient`
/// becomes the reply's first parameter per RFC 1459 numeric reply shape.
pub fn send_numeric(
    state: &ServerState,
    conn_id: ConnId,
    code: u16,
    recipient: &str,
    params: Vec<String>,
    trailing: Option<String>,
) {
    let message =
        Message::numeric(code, recipient, params, trailing).with_prefix(Prefix::new(state.name.clone()));
    send_to_conn(state, conn_id, message);
}

/// Resolves a [`Principal`] to the connection its traffic should travel
/// over: a local user or directly-connected peer's own socket, or the
/// next-hop peer's socket for an external user.
fn principal_conn_id(state: &ServerState, principal: &Principal) -> Option<ConnId> {
    match principal {
        Principal::LocalUser { conn_id, .. } => Some(*conn_id),
        Principal::Server { conn_id, .. } => Some(*conn_id),
        Principal::ExternalUser { location, nick, .. } => match state.clients.get_server(location) {
            Some(Principal::Server { conn_id, .. }) => Some(conn_id),
            _ => {
                error!("external user '{nick}' routes through unknown peer '{location}'");
                None
            }
        },
    }
}

/// `forward_to_user(receiver_nick, message)`.
pub fn forward_to_user(state: &ServerState, receiver_nick: &str, message: Message) -> Result<(), ErrorKind> {
    warn_if_numeric(&message, "forward_to_user");
    let principal = state
        .clients
        .get_user(receiver_nick)
        .ok_or_else(|| ErrorKind::NoSuchNick(receiver_nick.to_string()))?;
    match principal_conn_id(state, &principal) {
        Some(conn_id) => {
            send_to_conn(state, conn_id, message);
            Ok(())
        }
        None => Err(ErrorKind::Internal(format!("no route to '{receiver_nick}'"))),
    }
}

/// `send_to_channel(channel, message, sender_conn_id)`. `sender_conn_id` is
/// the connection the message arrived on (a local author's own connection,
/// or the peer link it was relayed in from); it is excluded from delivery
/// so a message is never echoed back down the link it came in on, and the
/// distinct-socket dedup below guarantees at most one write per peer link.
pub fn send_to_channel(
    state: &ServerState,
    channel: &str,
    message: Message,
    sender_conn_id: ConnId,
) -> Result<(), ErrorKind> {
    warn_if_numeric(&message, "send_to_channel");
    let members = state
        .channels
        .member_nicks(channel)
        .ok_or_else(|| ErrorKind::NoSuchChannel(channel.to_string()))?;
    let mut seen: HashSet<ConnId> = HashSet::new();
    seen.insert(sender_conn_id);
    for nick in members {
        let Some(principal) = state.clients.get_user(&nick) else { continue };
        let Some(conn_id) = principal_conn_id(state, &principal) else { continue };
        if seen.insert(conn_id) {
            send_to_conn(state, conn_id, message.clone());
        }
    }
    Ok(())
}

/// `broadcast_server_event(message, origin_peer)`. Floods `message` to
/// every known peer server except `origin_peer` (the link it arrived on,
/// if any) — used for `SERVER` introductions and `QUIT` propagation. Each
/// distinct peer socket receives the event at most once.
pub fn broadcast_server_event(state: &ServerState, message: Message, origin_peer: Option<&str>) {
    warn_if_numeric(&message, "broadcast_server_event");
    for principal in state.clients.list_servers() {
        if let Principal::Server { nick, conn_id, .. } = principal {
            if Some(nick.as_str()) == origin_peer {
                continue;
            }
            send_to_conn(state, conn_id, message.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::AclAuthority;
    use crate::message::Command;
    use crate::session::{ConnHandle, SessionInfo, next_conn_id};
    use tokio::sync::mpsc;

    fn fresh_conn(state: &ServerState) -> (ConnId, mpsc::UnboundedReceiver<Message>) {
        let id = next_conn_id();
        let (tx, rx): (ConnHandle, _) = mpsc::unbounded_channel();
        state.sessions.insert(SessionInfo::new(id, tx, "127.0.0.1".into()));
        (id, rx)
    }

    fn fresh_state() -> ServerState {
        ServerState::new("srv", AclAuthority::empty(), "today")
    }

    #[test]
    fn forward_to_user_rejects_unknown_nick() {
        let state = fresh_state();
        let msg = Message::new(Command::verb("PRIVMSG"), vec!["ghost".into()], Some("hi".into()));
        assert!(matches!(forward_to_user(&state, "ghost", msg), Err(ErrorKind::NoSuchNick(_))));
    }

    #[test]
    fn forward_to_user_delivers_to_local_socket() {
        let state = fresh_state();
        let (id, mut rx) = fresh_conn(&state);
        state.clients.add_local("alice", id).unwrap();
        let msg = Message::new(Command::verb("PRIVMSG"), vec!["alice".into()], Some("hi".into()));
        forward_to_user(&state, "alice", msg).unwrap();
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn send_to_channel_never_echoes_to_sender_and_dedups_sockets() {
        let state = fresh_state();
        let (alice_id, mut alice_rx) = fresh_conn(&state);
        let (bob_id, mut bob_rx) = fresh_conn(&state);
        state.clients.add_local("alice", alice_id).unwrap();
        state.clients.add_local("bob", bob_id).unwrap();
        state.channels.join("#hack", "alice", "").await.unwrap();
        state.channels.join("#hack", "bob", "").await.unwrap();

        let msg = Message::new(Command::verb("PRIVMSG"), vec!["#hack".into()], Some("hi".into()));
        send_to_channel(&state, "#hack", msg, alice_id).unwrap();

        assert!(alice_rx.try_recv().is_err());
        assert!(bob_rx.try_recv().is_ok());
    }

    #[test]
    fn broadcast_server_event_skips_origin_peer() {
        let state = fresh_state();
        let (a_id, mut a_rx) = fresh_conn(&state);
        let (b_id, mut b_rx) = fresh_conn(&state);
        state.clients.add_server("peerA", 1, a_id).unwrap();
        state.clients.add_server("peerB", 1, b_id).unwrap();

        let msg = Message::new(Command::verb("QUIT"), vec![], Some("bye".into()));
        broadcast_server_event(&state, msg, Some("peerA"));

        assert!(a_rx.try_recv().is_err());
        assert!(b_rx.try_recv().is_ok());
    }
}
