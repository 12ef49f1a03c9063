//! Handlers for channel membership commands: `JOIN`, `PART`, `KICK`,
//! `NAMES`. Drives §4.4's Channel Registry operations and relays the
//! resulting state change to the rest of the channel.

use crate::errors::ErrorKind;
use crate::message::{Command, Message, Prefix};
use crate::replies::{self, send_error};
use crate::routing::send_to_channel;
use crate::session::ConnId;
use crate::state::ServerState;
use crate::validators::validate_channel;

/// `JOIN <channel>[,<channel>] [<key>[,<key>]]`.
pub async fn handle_join(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
    let Some(channels_arg) = msg.params.first() else {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("JOIN".into()));
        return;
    };
    let keys: Vec<&str> = msg.params.get(1).map(|k| k.split(',').collect()).unwrap_or_default();

    for (idx, channel) in channels_arg.split(',').enumerate() {
        if !validate_channel(channel) {
            send_error(state, conn_id, &session.nickname, &ErrorKind::NoSuchChannel(channel.to_string()));
            continue;
        }
        let key = keys.get(idx).copied().unwrap_or("");
        match state.channels.join(channel, &session.nickname, key).await {
            Ok(()) => {
                let join = Message::new(Command::verb("JOIN"), vec![channel.to_string()], None).with_prefix(
                    Prefix::with_user_host(
                        &session.nickname,
                        session.username.clone().unwrap_or_default(),
                        state.name.clone(),
                    ),
                );
                let _ = send_to_channel(state, channel, join, conn_id);

                let topic = state.channels.topic(channel).await.unwrap_or_default();
                replies::topic(state, conn_id, &session.nickname, channel, &topic);

                if let Some(names) = state.channels.names_list(channel) {
                    replies::names(state, conn_id, &session.nickname, channel, &names);
                }
            }
            Err(err) => send_error(state, conn_id, &session.nickname, &err),
        }
    }
}

/// `PART <channel>[,<channel>] [:<message>]`.
pub async fn handle_part(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
    let Some(channels_arg) = msg.params.first() else {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("PART".into()));
        return;
    };
    for channel in channels_arg.split(',') {
        match state.channels.part(channel, &session.nickname) {
            Ok(()) => {
                let part = Message::new(Command::verb("PART"), vec![channel.to_string()], msg.trailing.clone())
                    .with_prefix(Prefix::new(session.nickname.clone()));
                let _ = send_to_channel(state, channel, part, conn_id);
            }
            Err(err) => send_error(state, conn_id, &session.nickname, &err),
        }
    }
}

/// `KICK <channel> <nick> [:<comment>]`.
pub async fn handle_kick(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
    let (Some(channel), Some(target)) = (msg.params.first(), msg.params.get(1)) else {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("KICK".into()));
        return;
    };
    match state.channels.kick(channel, &session.nickname, target) {
        Ok(()) => {
            let kick = Message::new(
                Command::verb("KICK"),
                vec![channel.clone(), target.clone()],
                msg.trailing.clone().or_else(|| Some(session.nickname.clone())),
            )
            .with_prefix(Prefix::new(session.nickname.clone()));
            let _ = send_to_channel(state, channel, kick, conn_id);
        }
        Err(err) => send_error(state, conn_id, &session.nickname, &err),
    }
}

/// `NAMES <channel>`.
pub async fn handle_names(state: &ServerState, conn_id: ConnId, msg: Message) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
    let Some(channel) = msg.params.first() else {
        send_error(state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("NAMES".into()));
        return;
    };
    match state.channels.names_list(channel) {
        Some(names) => replies::names(state, conn_id, &session.nickname, channel, &names),
        None => send_error(state, conn_id, &session.nickname, &ErrorKind::NoSuchChannel(channel.clone())),
    }
}
