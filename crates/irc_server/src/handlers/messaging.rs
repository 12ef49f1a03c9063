//! Handlers for `PRIVMSG`, `PING`, `PONG`.

use crate::errors::ErrorKind;
use crate::message::{Command, Message, Prefix};
use crate::replies::send_error;
use crate::routing::{forward_to_user, send_to_channel, send_to_conn};
use crate::session::ConnId;
use crate::state::ServerState;

/// `PRIVMSG <msgtarget> :<text>`. `msgtarget` is either a channel name or a
/// nickname; host/server masks are out of scope (see Non-goals).
pub async fn handle_privmsg(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
    let Some(target) = msg.params.first().cloned() else {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("PRIVMSG".into()));
        return;
    };
    let Some(text) = msg.trailing.clone() else {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("PRIVMSG".into()));
        return;
    };

    let relayed = Message::new(Command::verb("PRIVMSG"), vec![target.clone()], Some(text)).with_prefix(
        Prefix::with_user_host(&session.nickname, session.username.clone().unwrap_or_default(), state.name.clone()),
    );

    let result = if target.starts_with('#') || target.starts_with('&') {
        send_to_channel(state, &target, relayed, conn_id)
    } else {
        forward_to_user(state, &target, relayed)
    };
    if let Err(err) = result {
        send_error(state, conn_id, &session.nickname, &err);
    }
}

/// `PING <token>`. Always answered with a matching `PONG` on this same
/// connection, as soon as possible.
pub async fn handle_ping(state: &ServerState, conn_id: ConnId, msg: Message) {
    let token = msg.trailing.clone().or_else(|| msg.params.first().cloned()).unwrap_or_default();
    let pong = Message::new(Command::verb("PONG"), vec![state.name.clone()], Some(token)).with_prefix(Prefix::new(state.name.clone()));
    send_to_conn(state, conn_id, pong);
}

/// `PONG <token>`. A reply to our own `PING`; nothing to do beyond
/// acknowledging the connection is alive, which the reader task already
/// does implicitly by having received a line at all.
pub async fn handle_pong(_state: &ServerState, _conn_id: ConnId, _msg: Message) {}
