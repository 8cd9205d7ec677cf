//! Channel dialing abstraction and the WebSocket implementation
//!
//! The connection manager is generic over [`Dialer`] so tests can
//! substitute a fake transport without touching shared state. The real
//! implementation dials the backend over WebSocket and pumps frames
//! between the socket and a pair of mpsc channels from a background task.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use url::Url;

use hwatch_core::prelude::*;

/// Global socket ID counter
static SOCKET_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a client-local socket ID for a dialed channel
fn next_socket_id() -> String {
    format!("sock-{}", SOCKET_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// A live channel as handed back by a [`Dialer`]
///
/// `outbound` carries text frames toward the backend; `inbound` yields text
/// frames from it. The channel is closed when `outbound` is dropped, and a
/// closed `inbound` means the connection is gone.
#[derive(Debug)]
pub struct DialedChannel {
    pub socket_id: String,
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<String>,
}

/// Dials a namespace URL and returns a live channel
#[trait_variant::make(Dialer: Send)]
pub trait LocalDialer {
    async fn dial(&self, url: &Url) -> Result<DialedChannel>;
}

/// WebSocket dialer backed by tokio-tungstenite
///
/// Connection and request timeouts are whatever the underlying library and
/// OS defaults provide; none are layered on here.
#[derive(Debug, Clone, Default)]
pub struct WsDialer;

impl WsDialer {
    pub fn new() -> Self {
        Self
    }
}

impl Dialer for WsDialer {
    async fn dial(&self, url: &Url) -> Result<DialedChannel> {
        let (ws, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::transport(format!("dial {url}: {e}")))?;

        let socket_id = next_socket_id();
        debug!(%url, %socket_id, "websocket connected");

        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

        // Pump frames between the socket and the channel pair until either
        // side goes away.
        let pump_id = socket_id.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    outgoing = out_rx.recv() => match outgoing {
                        Some(text) => {
                            if let Err(e) = sink.send(WsMessage::Text(text.into())).await {
                                warn!(socket_id = %pump_id, "websocket send failed: {e}");
                                break;
                            }
                        }
                        // Sender dropped: the channel was torn down locally.
                        None => {
                            let _ = sink.close().await;
                            break;
                        }
                    },
                    incoming = stream.next() => match incoming {
                        Some(Ok(WsMessage::Text(text))) => {
                            if in_tx.send(text.to_string()).is_err() {
                                break;
                            }
                        }
                        Some(Ok(WsMessage::Close(_))) | None => {
                            debug!(socket_id = %pump_id, "websocket closed by peer");
                            break;
                        }
                        Some(Ok(_)) => {} // ping/pong/binary: nothing to forward
                        Some(Err(e)) => {
                            warn!(socket_id = %pump_id, "websocket read failed: {e}");
                            break;
                        }
                    },
                }
            }
        });

        Ok(DialedChannel {
            socket_id,
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}
