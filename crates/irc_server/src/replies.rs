//! Numeric reply construction. Handlers build a [`Message`] through these
//! helpers rather than formatting raw strings, and translate an [`ErrorKind`]
//! into its matching numeric via [`send_error`] without a second lookup.

use crate::constants::*;
use crate::errors::ErrorKind;
use crate::routing::send_numeric;
use crate::session::ConnId;
use crate::state::ServerState;

/// Translates a registry/channel-operation error into the numeric reply
/// RFC 1459 assigns it and sends it to `conn_id`. `nick` is the recipient
/// slot (`*` before a nickname has been chosen).
pub fn send_error(state: &ServerState, conn_id: ConnId, nick: &str, err: &ErrorKind) {
    let nick = if nick.is_empty() { "*" } else { nick };
    match err {
        ErrorKind::NoSuchNick(target) => {
            send_numeric(state, conn_id, ERR_NOSUCHNICK_NB, nick, vec![target.clone()], Some(ERR_NOSUCHNICK_STR.into()))
        }
        ErrorKind::NoSuchServer(target) => send_numeric(
            state,
            conn_id,
            ERR_NOSUCHSERVER_NB,
            nick,
            vec![target.clone()],
            Some(ERR_NOSUCHSERVER_STR.into()),
        ),
        ErrorKind::NoSuchChannel(channel) => send_numeric(
            state,
            conn_id,
            ERR_NOSUCHCHANNEL_NB,
            nick,
            vec![channel.clone()],
            Some(ERR_NOSUCHCHANNEL_STR.into()),
        ),
        ErrorKind::NotOnChannel(channel) => send_numeric(
            state,
            conn_id,
            ERR_NOTONCHANNEL_NB,
            nick,
            vec![channel.clone()],
            Some(ERR_NOTONCHANNEL_STR.into()),
        ),
        ErrorKind::BannedFromChannel(channel) => send_numeric(
            state,
            conn_id,
            ERR_BANNEDFROMCHAN_NB,
            nick,
            vec![channel.clone()],
            Some(ERR_BANNEDFROMCHAN_STR.into()),
        ),
        ErrorKind::BadChannelKey(channel) => send_numeric(
            state,
            conn_id,
            ERR_BADCHANNELKEY_NB,
            nick,
            vec![channel.clone()],
            Some(ERR_BADCHANNELKEY_STR.into()),
        ),
        ErrorKind::ChanOpPrivsNeeded(channel) => send_numeric(
            state,
            conn_id,
            ERR_CHANOPRIVSNEEDED_NB,
            nick,
            vec![channel.clone()],
            Some(ERR_CHANOPRIVSNEEDED_STR.into()),
        ),
        ErrorKind::NickAlreadyInUse(target) | ErrorKind::NickCollision(target) => send_numeric(
            state,
            conn_id,
            ERR_NICKCOLLISION_NB,
            nick,
            vec![target.clone()],
            Some(ERR_NICKCOLLISION_STR.into()),
        ),
        ErrorKind::NotRegistered => send_numeric(
            state,
            conn_id,
            ERR_NOTREGISTERED_NB,
            nick,
            vec![],
            Some(ERR_NOTREGISTERED_STR.into()),
        ),
        ErrorKind::AlreadyRegistered => send_numeric(
            state,
            conn_id,
            ERR_ALREADYREGISTRED_NB,
            nick,
            vec![],
            Some(ERR_ALREADYREGISTRED_STR.into()),
        ),
        ErrorKind::PasswordMismatch => send_numeric(
            state,
            conn_id,
            ERR_PASSWDMISMATCH_NB,
            nick,
            vec![],
            Some(ERR_PASSWDMISMATCH_STR.into()),
        ),
        ErrorKind::NeedMoreParams(command) => send_numeric(
            state,
            conn_id,
            ERR_NEEDMOREPARAMS_NB,
            nick,
            vec![command.clone()],
            Some(ERR_NEEDMOREPARAMS_STR.into()),
        ),
        ErrorKind::NoPrivileges => send_numeric(
            state,
            conn_id,
            ERR_NOPRIVILEGES_NB,
            nick,
            vec![],
            Some(ERR_NOPRIVILEGES_STR.into()),
        ),
        ErrorKind::InvalidCommand(command) => send_numeric(
            state,
            conn_id,
            ERR_UNKNOWNCOMMAND_NB,
            nick,
            vec![command.clone()],
            Some(ERR_UNKNOWNCOMMAND_STR.into()),
        ),
        ErrorKind::Internal(detail) => {
            log::error!("internal invariant violation: {detail}");
        }
    }
}

/// Sends the full registration burst: `RPL_WELCOME`, `RPL_YOURHOST`, and
/// `RPL_CREATED`. The latter two carry no invariant of their own; they are
/// the conventional lines a client expects right after `001`.
pub fn welcome(state: &ServerState, conn_id: ConnId, nick: &str, user: &str, host: &str) {
    send_numeric(
        state,
        conn_id,
        RPL_WELCOME_NB,
        nick,
        vec![],
        Some(format!("{RPL_WELCOME_STR} {nick}!{user}@{host}")),
    );
    send_numeric(
        state,
        conn_id,
        RPL_YOURHOST_NB,
        nick,
        vec![],
        Some(format!("Your host is {}, running since {}", state.name, state.created)),
    );
    send_numeric(
        state,
        conn_id,
        RPL_CREATED_NB,
        nick,
        vec![],
        Some(format!("This server was created {}", state.created)),
    );
}

pub fn youreoper(state: &ServerState, conn_id: ConnId, nick: &str) {
    send_numeric(state, conn_id, RPL_YOUREOPER_NB, nick, vec![], Some(RPL_YOUREOPER_STR.into()));
}

/// `RPL_TOPIC`, per §4.4 step 3: sent on every successful `JOIN` whether or
/// not a topic has been set, with the fixed placeholder text when it hasn't.
pub fn topic(state: &ServerState, conn_id: ConnId, nick: &str, channel: &str, topic: &str) {
    let trailing = if topic.is_empty() { RPL_NOTOPIC_STR.to_string() } else { topic.to_string() };
    send_numeric(state, conn_id, RPL_TOPIC_NB, nick, vec![channel.to_string()], Some(trailing));
}

/// `RPL_NAMREPLY` followed by `RPL_ENDOFNAMES`. The visibility symbol is
/// always `=`; see Design Notes.
pub fn names(state: &ServerState, conn_id: ConnId, nick: &str, channel: &str, members: &[String]) {
    send_numeric(
        state,
        conn_id,
        RPL_NAMREPLY_NB,
        nick,
        vec!["=".to_string(), channel.to_string()],
        Some(members.join(" ")),
    );
    send_numeric(
        state,
        conn_id,
        RPL_ENDOFNAMES_NB,
        nick,
        vec![channel.to_string()],
        Some(RPL_ENDOFNAMES_STR.into()),
    );
}
