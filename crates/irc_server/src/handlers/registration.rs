//! Handlers for the registration alphabet: `PASS`, `NICK`, `USER`, `SERVER`,
//! `OPER`, `QUIT`, `CAP`. Drives the session state machine of §4.2.

use log::info;

use crate::constants::*;
use crate::errors::ErrorKind;
use crate::message::Message;
use crate::principal::Principal;
use crate::replies::{self, send_error};
use crate::routing::send_numeric;
use crate::session::{ConnId, SessionInfo, SessionType};
use crate::state::ServerState;
use crate::teardown::teardown;
use crate::validators::{validate_host, validate_nick};

pub async fn handle_pass(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
    if session.registered() {
        send_error(state, conn_id, &session.nickname, &ErrorKind::AlreadyRegistered);
        return;
    }
    let Some(password) = msg.params.first().cloned() else {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("PASS".into()));
        return;
    };
    state.sessions.with_session(conn_id, |s| s.password = Some(password));
}

/// `NICK <nickname>` from a client, or `NICK <nickname> <hops>` from a peer
/// introducing one of its own users.
pub async fn handle_nick(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };

    if session.session_type == SessionType::Server {
        introduce_external_user(state, &session, &msg);
        return;
    }

    let Some(nick) = msg.params.first().cloned() else {
        send_numeric(state, conn_id, ERR_NONICKNAMEGIVEN_NB, "*", vec![], Some(ERR_NONICKNAMEGIVEN_STR.into()));
        return;
    };

    if !validate_nick(&nick) {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("NICK".into()));
        return;
    }

    if state.clients.get_user(&nick).is_some() || state.clients.get_server(&nick).is_some() {
        send_error(state, conn_id, "*", &ErrorKind::NickCollision(nick));
        return;
    }

    state.sessions.with_session(conn_id, |s| s.nickname = nick);
}

fn introduce_external_user(state: &ServerState, session: &SessionInfo, msg: &Message) {
    let Some(nick) = msg.params.first() else { return };
    let Some(hops) = msg.params.get(1).and_then(|h| h.parse::<u32>().ok()) else { return };
    if let Err(err) = state.clients.add_external(nick, hops, &session.nickname) {
        log::warn!("failed to introduce external user '{nick}' via '{}': {err}", session.nickname);
    }
}

/// `USER <user> <mode> <unused> :<realname>`.
pub async fn handle_user(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
    if session.registered() {
        send_error(state, conn_id, &session.nickname, &ErrorKind::AlreadyRegistered);
        return;
    }
    if session.nickname.is_empty() {
        send_error(state, conn_id, "*", &ErrorKind::NeedMoreParams("USER".into()));
        return;
    }
    let (Some(username), Some(hostname), Some(_servername)) = (msg.params.first(), msg.params.get(1), msg.params.get(2))
    else {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("USER".into()));
        return;
    };
    let Some(realname) = msg.trailing.clone() else {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("USER".into()));
        return;
    };

    if !state.acl.valid_user_password(username, hostname, session.password.as_deref()) {
        send_error(state, conn_id, &session.nickname, &ErrorKind::PasswordMismatch);
        teardown(state, conn_id, "password mismatch");
        return;
    }

    if let Err(err) = state.clients.add_local(&session.nickname, conn_id) {
        send_error(state, conn_id, &session.nickname, &err);
        teardown(state, conn_id, "nick already in use");
        return;
    }

    state.sessions.with_session(conn_id, |s| {
        s.username = Some(username.clone());
        s.hostname = Some(session.peer_addr.clone());
        s.realname = Some(realname);
        s.session_type = SessionType::User;
    });

    info!("'{}' registered from {}", session.nickname, session.peer_addr);
    replies::welcome(state, conn_id, &session.nickname, username, &session.peer_addr);
}

/// `SERVER <name> <hops> :<info>`. Registers a peer link; per this
/// implementation's one-hop spanning tree, only the direct peer is
/// registered and dumped the local user list — it is not relayed onward to
/// other peers, since those peers have no notion of a peer's own peers.
pub async fn handle_server(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
    if session.registered() {
        send_error(state, conn_id, &session.nickname, &ErrorKind::AlreadyRegistered);
        return;
    }
    let (Some(name), Some(hops)) = (msg.params.first(), msg.params.get(1).and_then(|h| h.parse::<u32>().ok()))
    else {
        send_error(state, conn_id, "*", &ErrorKind::NeedMoreParams("SERVER".into()));
        return;
    };

    if !validate_host(name) {
        send_error(state, conn_id, "*", &ErrorKind::NeedMoreParams("SERVER".into()));
        return;
    }

    if !state.acl.valid_accept_password(&session.peer_addr, session.password.as_deref()) {
        send_error(state, conn_id, "*", &ErrorKind::PasswordMismatch);
        teardown(state, conn_id, "peer password mismatch");
        return;
    }

    if let Err(err) = state.clients.add_server(name, hops.max(1), conn_id) {
        send_error(state, conn_id, "*", &err);
        teardown(state, conn_id, "server name collision");
        return;
    }

    state.sessions.with_session(conn_id, |s| {
        s.nickname = name.clone();
        s.servername = Some(name.clone());
        s.hops = hops;
        s.session_type = SessionType::Server;
    });

    info!("peer '{name}' linked ({} hop(s)) from {}", hops, session.peer_addr);

    for nick in state.clients.list_local_users() {
        let line = Message::new(crate::message::Command::verb("NICK"), vec![nick.clone(), "1".to_string()], None);
        crate::routing::send_to_conn(state, conn_id, line);
    }
    for server in state.clients.list_servers() {
        if let Principal::Server { nick: other, hops: other_hops, .. } = server {
            if other != name {
                let line = Message::new(
                    crate::message::Command::verb("SERVER"),
                    vec![other.clone(), (other_hops + 1).to_string()],
                    Some("known peer".to_string()),
                );
                crate::routing::send_to_conn(state, conn_id, line);
            }
        }
    }
}

/// `OPER <name> <password>`.
pub async fn handle_oper(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
    let (Some(name), Some(password)) = (msg.params.first(), msg.params.get(1)) else {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("OPER".into()));
        return;
    };
    if !state.acl.valid_operator(name, password) {
        send_error(state, conn_id, &session.nickname, &ErrorKind::PasswordMismatch);
        return;
    }
    let _ = state.clients.add_oper_privileges(&session.nickname);
    state.sessions.with_session(conn_id, |s| s.is_oper = true);
    replies::youreoper(state, conn_id, &session.nickname);
}

/// `QUIT [:message]`.
pub async fn handle_quit(state: &ServerState, conn_id: ConnId, msg: Message) {
    let reason = msg.trailing.unwrap_or_else(|| "Client Quit".to_string());
    teardown(state, conn_id, &reason);
}

/// `CAP <LS|LIST|END|...>`. This implementation only needs the handshake to
/// not block registration; no capability is ever advertised as available.
pub async fn handle_cap(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(subcommand) = msg.params.first() else { return };
    match subcommand.to_ascii_uppercase().as_str() {
        "LS" => {
            let line = Message::new(crate::message::Command::verb("CAP"), vec!["*".into(), "LS".into()], Some(String::new()));
            crate::routing::send_to_conn(state, conn_id, line);
        }
        "LIST" => {
            let line = Message::new(crate::message::Command::verb("CAP"), vec!["*".into(), "LIST".into()], Some(String::new()));
            crate::routing::send_to_conn(state, conn_id, line);
        }
        "END" => {}
        _ => {}
    }
}
