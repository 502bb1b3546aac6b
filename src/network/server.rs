use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};

use crate::dispatch::Dispatcher;
use crate::protocol::{GameSnapshotView, PlayerInput, ServerMessage};
use crate::resonance::AlchemistOracle;
use crate::store::GameStore;

/// WebSocket front door for the presentation layer.
///
/// Every connected client gets its own pair of tasks:
///
/// 1. **Write task** – sends a msgpack `ServerMessage::Snapshot` every
///    broadcast period, interleaved with replies to that client's actions.
/// 2. **Read loop** – decodes binary frames as `PlayerInput` and hands them
///    to the dispatcher.
pub struct GameServer<O> {
    store: GameStore,
    dispatcher: Dispatcher<O>,
    broadcast_period: Duration,
}

impl<O: AlchemistOracle> GameServer<O> {
    pub fn new(store: GameStore, dispatcher: Dispatcher<O>, broadcast_period: Duration) -> Self {
        Self {
            store,
            dispatcher,
            broadcast_period,
        }
    }

    /// Accepts clients on `addr` until the listener fails to bind.
    pub async fn serve(self, addr: &str) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Game server listening on ws://{}", addr);

        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Accept error: {}", e);
                    continue;
                }
            };
            info!("Client connected from {}", peer);

            tokio::spawn(handle_client(
                stream,
                peer,
                self.store.clone(),
                self.dispatcher.clone(),
                self.broadcast_period,
            ));
        }
    }
}

async fn handle_client<O: AlchemistOracle>(
    stream: TcpStream,
    peer: SocketAddr,
    store: GameStore,
    dispatcher: Dispatcher<O>,
    broadcast_period: Duration,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            error!("WebSocket handshake with {} failed: {}", peer, e);
            return;
        }
    };
    let (mut ws_write, mut ws_read) = ws_stream.split();

    // Channel: dispatcher -> write task -> WebSocket
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ServerMessage>();

    // ── Write task ──────────────────────────────────────────────
    let writer = tokio::spawn(async move {
        let mut ticker = interval(broadcast_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            let msg = tokio::select! {
                _ = ticker.tick() => {
                    ServerMessage::Snapshot(GameSnapshotView::from(store.snapshot().as_ref()))
                }
                Some(msg) = reply_rx.recv() => msg,
            };
            let bytes = match rmp_serde::to_vec_named(&msg) {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!("Failed to serialize ServerMessage: {}", e);
                    continue;
                }
            };
            if let Err(e) = ws_write.send(Message::Binary(bytes.into())).await {
                warn!("Failed to send to {}: {}", peer, e);
                break;
            }
        }
    });

    // ── Read loop ───────────────────────────────────────────────
    while let Some(result) = ws_read.next().await {
        match result {
            Ok(msg) if msg.is_binary() => {
                let data = msg.into_data();
                match rmp_serde::from_slice::<PlayerInput>(&data) {
                    Ok(input) => dispatcher.handle(input, &reply_tx),
                    Err(e) => warn!("Failed to decode PlayerInput from {}: {}", peer, e),
                }
            }
            Ok(msg) if msg.is_close() => break,
            Ok(_) => {}
            Err(e) => {
                error!("WebSocket read error from {}: {}", peer, e);
                break;
            }
        }
    }

    writer.abort();
    info!("Client {} disconnected", peer);
}
