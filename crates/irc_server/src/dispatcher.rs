//! The Command Dispatcher (§4.3): a data table mapping a verb to its
//! handler, not a chain of type-level fallbacks. `CONNECT` is special-cased
//! ahead of the table because it alone needs to dial out and spawn a new
//! connection, rather than just mutate the registries and reply.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use log::warn;
use tokio::sync::mpsc;

use crate::connection::Inbound;
use crate::errors::ErrorKind;
use crate::handlers::{channels, messaging, peer, registration};
use crate::message::Message;
use crate::replies::send_error;
use crate::session::ConnId;
use crate::state::ServerState;

type Handler = for<'a> fn(&'a ServerState, ConnId, Message) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Verbs admitted before registration completes, per §4.2's transition
/// table: everything else gets `ERR_NOTREGISTERED`.
const PRE_REGISTRATION: &[&str] = &["PASS", "NICK", "USER", "SERVER", "CAP", "QUIT"];

fn handler_table() -> &'static HashMap<&'static str, Handler> {
    static TABLE: OnceLock<HashMap<&'static str, Handler>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut m: HashMap<&'static str, Handler> = HashMap::new();
        m.insert("PASS", |s, c, msg| Box::pin(registration::handle_pass(s, c, msg)));
        m.insert("NICK", |s, c, msg| Box::pin(registration::handle_nick(s, c, msg)));
        m.insert("USER", |s, c, msg| Box::pin(registration::handle_user(s, c, msg)));
        m.insert("SERVER", |s, c, msg| Box::pin(registration::handle_server(s, c, msg)));
        m.insert("OPER", |s, c, msg| Box::pin(registration::handle_oper(s, c, msg)));
        m.insert("QUIT", |s, c, msg| Box::pin(registration::handle_quit(s, c, msg)));
        m.insert("CAP", |s, c, msg| Box::pin(registration::handle_cap(s, c, msg)));
        m.insert("JOIN", |s, c, msg| Box::pin(channels::handle_join(s, c, msg)));
        m.insert("PART", |s, c, msg| Box::pin(channels::handle_part(s, c, msg)));
        m.insert("KICK", |s, c, msg| Box::pin(channels::handle_kick(s, c, msg)));
        m.insert("NAMES", |s, c, msg| Box::pin(channels::handle_names(s, c, msg)));
        m.insert("PRIVMSG", |s, c, msg| Box::pin(messaging::handle_privmsg(s, c, msg)));
        m.insert("PING", |s, c, msg| Box::pin(messaging::handle_ping(s, c, msg)));
        m.insert("PONG", |s, c, msg| Box::pin(messaging::handle_pong(s, c, msg)));
        m
    })
}

/// Entry point the main dispatch loop calls for every inbound line, once
/// parsed into a [`Message`].
pub async fn dispatch(state: Arc<ServerState>, inbound_tx: mpsc::Sender<Inbound>, conn_id: ConnId, message: Message) {
    if message.command.is_numeric() {
        warn!("dropping numeric command received from conn {conn_id:?}");
        return;
    }
    let verb = message.command.as_str_upper();

    if verb == "CONNECT" {
        let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
        if !session.registered() {
            send_error(&state, conn_id, &session.nickname, &ErrorKind::NotRegistered);
            return;
        }
        peer::handle_connect(state, conn_id, message, inbound_tx).await;
        return;
    }

    let Some(session) = state.sessions.get_snapshot(conn_id) else {
        log::error!("dispatch for unknown conn {conn_id:?}");
        return;
    };

    if !session.registered() && !PRE_REGISTRATION.contains(&verb.as_str()) {
        send_error(&state, conn_id, &session.nickname, &ErrorKind::NotRegistered);
        return;
    }

    match handler_table().get(verb.as_str()) {
        Some(handler) => handler(&state, conn_id, message).await,
        None => warn!("dropping unknown command '{verb}' from conn {conn_id:?}"),
    }
}
