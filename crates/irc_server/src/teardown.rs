//! Shared connection teardown (§4.7 Disconnection). Both a voluntary `QUIT`
//! and a socket closing out from under the dispatcher (EOF/write failure)
//! run this same cleanup; only the reason text differs.

use log::{info, warn};

use crate::message::{Command, Message, Prefix};
use crate::principal::Principal;
use crate::routing::{broadcast_server_event, send_to_channel};
use crate::session::{ConnId, SessionType};
use crate::state::ServerState;

/// Removes `conn_id`'s session — dropping its write handle, which lets that
/// connection's writer task drain and close the socket — and unwinds
/// whatever the session was registered as.
pub fn teardown(state: &ServerState, conn_id: ConnId, reason: &str) {
    if let Some((_, handle)) = state.reader_handles.remove(&conn_id) {
        handle.abort();
    }
    let Some(session) = state.sessions.remove(conn_id) else { return };
    match session.session_type {
        SessionType::User if !session.nickname.is_empty() => {
            let nick = session.nickname;
            let quit = Message::new(Command::verb("QUIT"), vec![], Some(reason.to_string()))
                .with_prefix(Prefix::new(nick.clone()));
            for channel in state.channels.channels_of(&nick) {
                let _ = send_to_channel(state, &channel, quit.clone(), conn_id);
            }
            state.clients.remove(&nick);
            state.channels.quit(&nick);
            broadcast_server_event(state, quit, None);
            info!("'{nick}' disconnected ({reason})");
        }
        SessionType::Server if !session.nickname.is_empty() => {
            let peer_nick = session.nickname;
            let purged = state.clients.remove_from_server(&peer_nick);
            state.clients.remove_server(&peer_nick);
            for principal in purged {
                let Principal::ExternalUser { nick, .. } = principal else { continue };
                for channel in state.channels.channels_of(&nick) {
                    let quit = Message::new(Command::verb("QUIT"), vec![], Some("left the network".to_string()))
                        .with_prefix(Prefix::new(nick.clone()));
                    let _ = send_to_channel(state, &channel, quit, conn_id);
                }
                state.channels.quit(&nick);
                let quit = Message::new(Command::verb("QUIT"), vec![], Some("left the network".to_string()))
                    .with_prefix(Prefix::new(nick));
                broadcast_server_event(state, quit, Some(&peer_nick));
            }
            warn!("peer '{peer_nick}' link closed ({reason})");
        }
        SessionType::User | SessionType::Server | SessionType::Unknown | SessionType::ExternalUser => {}
    }
}
