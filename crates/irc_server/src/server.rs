//! Wires the Connection Manager, Codec, and Command Dispatcher together:
//! one accept loop spawning a reader/writer pair per socket (§5's "Mixed"
//! scheduling model), and a single dispatcher task draining the shared
//! inbound queue so it remains the sole mutator of the registries.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::connection::{Inbound, spawn_connection};
use crate::dispatcher::dispatch;
use crate::message::Message;
use crate::state::ServerState;
use crate::teardown::teardown;

/// Inbound queue capacity; bounds how far a burst of reader tasks can get
/// ahead of the single dispatcher before backpressuring their `send`.
const INBOUND_QUEUE_CAPACITY: usize = 1024;

/// Runs the dispatcher task and the accept loop for `listener` until it
/// returns an error (socket closed). Returns only on accept failure, which
/// the caller treats as shutdown.
pub async fn serve(state: Arc<ServerState>, listener: TcpListener) -> std::io::Result<()> {
    let (inbound_tx, inbound_rx) = mpsc::channel::<Inbound>(INBOUND_QUEUE_CAPACITY);

    tokio::spawn(dispatch_loop(state.clone(), inbound_tx.clone(), inbound_rx));

    loop {
        let (socket, addr) = listener.accept().await?;
        info!("accepted connection from {addr}");
        spawn_connection(state.clone(), socket, addr.to_string(), inbound_tx.clone()).await;
    }
}

/// The single dispatcher task: parses each inbound line with the Codec and
/// hands it to the command table, or runs teardown on connection closure.
async fn dispatch_loop(state: Arc<ServerState>, inbound_tx: mpsc::Sender<Inbound>, mut inbound_rx: mpsc::Receiver<Inbound>) {
    while let Some(item) = inbound_rx.recv().await {
        match item {
            Inbound::Line(conn_id, line) => match Message::parse(&line) {
                Ok(message) => dispatch(state.clone(), inbound_tx.clone(), conn_id, message).await,
                Err(err) => debug!("dropping unparseable line from conn {conn_id:?}: {err}"),
            },
            Inbound::Closed(conn_id) => {
                teardown(&state, conn_id, "connection closed");
            }
        }
    }
    warn!("inbound queue closed; dispatcher task exiting");
}
