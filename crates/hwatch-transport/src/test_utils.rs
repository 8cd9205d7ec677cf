//! Fake dialer for exercising the connection manager without a backend
//!
//! Available to other crates through the `test-helpers` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use url::Url;

use hwatch_core::prelude::*;

use crate::dialer::{DialedChannel, Dialer};
use crate::protocol::WireMessage;

/// In-memory dialer: every dial hands back a channel pair wired to a
/// [`FakeRemote`] the test can drive.
#[derive(Debug, Clone, Default)]
pub struct FakeDialer {
    inner: Arc<Mutex<FakeState>>,
}

#[derive(Debug, Default)]
struct FakeState {
    fail_dials: bool,
    remotes: Vec<FakeRemote>,
}

impl FakeDialer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent dial fail
    pub fn fail_dials(&self, fail: bool) {
        self.lock().fail_dials = fail;
    }

    /// Number of dials that produced a channel
    pub fn dial_count(&self) -> usize {
        self.lock().remotes.len()
    }

    /// Server end of the nth successful dial
    pub fn remote(&self, index: usize) -> Option<FakeRemote> {
        self.lock().remotes.get(index).cloned()
    }

    /// URL of the most recent dial
    pub fn last_dialed_url(&self) -> Option<Url> {
        self.lock().remotes.last().map(|r| r.url.clone())
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Dialer for FakeDialer {
    async fn dial(&self, url: &Url) -> Result<DialedChannel> {
        let mut state = self.lock();
        if state.fail_dials {
            return Err(Error::transport(format!("refused dial to {url}")));
        }

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let socket_id = format!("fake-{}", state.remotes.len());

        state.remotes.push(FakeRemote {
            url: url.clone(),
            inner: Arc::new(Mutex::new(RemoteInner {
                inbound_tx: Some(in_tx),
                sent_rx: out_rx,
            })),
        });

        Ok(DialedChannel {
            socket_id,
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}

/// The server side of one fake channel
#[derive(Debug, Clone)]
pub struct FakeRemote {
    pub url: Url,
    inner: Arc<Mutex<RemoteInner>>,
}

#[derive(Debug)]
struct RemoteInner {
    inbound_tx: Option<mpsc::UnboundedSender<String>>,
    sent_rx: mpsc::UnboundedReceiver<String>,
}

impl FakeRemote {
    /// Push a raw text frame to the client
    pub fn push_frame(&self, frame: &str) {
        if let Some(tx) = &self.lock().inbound_tx {
            let _ = tx.send(frame.to_string());
        }
    }

    /// Push a wire message to the client
    pub fn push_message(&self, msg: &WireMessage) {
        let frame = msg.encode().expect("wire message must encode");
        self.push_frame(&frame);
    }

    /// Pop the next frame the client sent, if any
    pub fn try_recv_sent(&self) -> Option<String> {
        self.lock().sent_rx.try_recv().ok()
    }

    /// Simulate the server closing the connection
    pub fn close(&self) {
        self.lock().inbound_tx = None;
    }

    fn lock(&self) -> MutexGuard<'_, RemoteInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
