//! `CONNECT` — an operator-only command that dials another node and
//! establishes a peer link, bounded by §5's 5 s outbound timeout.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::connection::{Inbound, spawn_connection};
use crate::errors::ErrorKind;
use crate::message::{Command, Message};
use crate::replies::send_error;
use crate::routing::send_to_conn;
use crate::session::{ConnId, SessionType};
use crate::state::ServerState;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// `CONNECT <host> <port> [<server>]`.
pub async fn handle_connect(
    state: Arc<ServerState>,
    conn_id: ConnId,
    msg: Message,
    inbound_tx: mpsc::Sender<Inbound>,
) {
    let Some(session) = state.sessions.get_snapshot(conn_id) else { return };
    if !session.is_oper {
        send_error(&state, conn_id, &session.nickname, &ErrorKind::NoPrivileges);
        return;
    }
    let (Some(host), Some(port)) = (msg.params.first(), msg.params.get(1)) else {
        send_error(&state, conn_id, &session.nickname, &ErrorKind::NeedMoreParams("CONNECT".into()));
        return;
    };
    let peer_name = msg.params.get(2).cloned().unwrap_or_else(|| host.clone());
    let addr = format!("{host}:{port}");

    let socket = match timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr)).await {
        Ok(Ok(socket)) => socket,
        Ok(Err(err)) => {
            warn!("CONNECT to {addr} failed: {err}");
            return;
        }
        Err(_) => {
            warn!("CONNECT to {addr} timed out after {CONNECT_TIMEOUT:?}");
            return;
        }
    };

    let peer_conn_id = spawn_connection(state.clone(), socket, addr.clone(), inbound_tx).await;
    if let Err(err) = state.clients.add_server(&peer_name, 1, peer_conn_id) {
        warn!("CONNECT to {addr}: {err}");
        return;
    }
    state.sessions.with_session(peer_conn_id, |s| {
        s.nickname = peer_name.clone();
        s.servername = Some(peer_name.clone());
        s.hops = 1;
        s.session_type = SessionType::Server;
    });

    let password = state.acl.get_connect_password(host).unwrap_or("").to_string();
    send_to_conn(&state, peer_conn_id, Message::new(Command::verb("PASS"), vec![password], None));
    send_to_conn(
        &state,
        peer_conn_id,
        Message::new(Command::verb("SERVER"), vec![state.name.clone(), "1".to_string()], Some("peer link".to_string())),
    );
    for nick in state.clients.list_local_users() {
        send_to_conn(&state, peer_conn_id, Message::new(Command::verb("NICK"), vec![nick, "1".to_string()], None));
    }

    info!("peer link to {addr} ('{peer_name}') established");
}
