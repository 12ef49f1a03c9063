//! Connection Manager plumbing: a reader task and a writer task per
//! accepted (or dialed-out) socket, feeding one shared inbound queue that
//! the single dispatcher task drains. Per §5, reader tasks never touch the
//! registries directly — they only turn bytes into `(conn_id, line)` pairs.

use std::sync::Arc;

use log::warn;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::message::Message;
use crate::session::{ConnId, SessionInfo, next_conn_id};
use crate::state::ServerState;

/// One item the dispatcher pulls off the shared inbound queue.
pub enum Inbound {
    Line(ConnId, String),
    Closed(ConnId),
}

/// Registers a freshly-accepted or freshly-dialed socket: inserts its
/// `SessionInfo`, then spawns the reader and writer tasks that carry it for
/// the rest of its life. Returns the `ConnId` the caller (and the
/// dispatcher, once lines start arriving) should use to refer to it.
pub async fn spawn_connection(
    state: Arc<ServerState>,
    socket: TcpStream,
    peer_addr: String,
    inbound_tx: mpsc::Sender<Inbound>,
) -> ConnId {
    let conn_id = next_conn_id();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<Message>();
    state.sessions.insert(SessionInfo::new(conn_id, outbound_tx, peer_addr));

    let (read_half, write_half) = socket.into_split();
    let reader = tokio::spawn(reader_task(read_half, conn_id, inbound_tx));
    state.reader_handles.insert(conn_id, reader.abort_handle());
    tokio::spawn(writer_task(write_half, conn_id, outbound_rx));

    conn_id
}

async fn reader_task(
    read_half: tokio::net::tcp::OwnedReadHalf,
    conn_id: ConnId,
    inbound_tx: mpsc::Sender<Inbound>,
) {
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let text = line.trim_end_matches(['\r', '\n']);
                if text.is_empty() {
                    continue;
                }
                if inbound_tx.send(Inbound::Line(conn_id, text.to_string())).await.is_err() {
                    break;
                }
            }
        }
    }
    let _ = inbound_tx.send(Inbound::Closed(conn_id)).await;
}

async fn writer_task(
    mut write_half: tokio::net::tcp::OwnedWriteHalf,
    conn_id: ConnId,
    mut outbound_rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = outbound_rx.recv().await {
        if let Err(err) = write_half.write_all(message.serialize().as_bytes()).await {
            warn!("write failed on conn {conn_id:?}: {err}");
            break;
        }
    }
    let _ = write_half.shutdown().await;
}
