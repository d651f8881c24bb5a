//! Transport-agnostic connection driver.
//!
//! One driver runs per connection. It feeds client frames and topic
//! deliveries to the state machine strictly one at a time, pings on a fixed
//! interval, and always runs `disconnect` on the way out.

use futures::{Stream, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use parley_core::traits::identity::Credentials;

use crate::bridge::TopicEvent;
use crate::message::serializer::serialize_outbound;
use crate::message::types::OutboundMessage;

use super::Connection;
use super::close::CloseReason;
use super::heartbeat::{HeartbeatConfig, HeartbeatTracker};

/// What the transport observed from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A text frame.
    Text(String),
    /// A pong answering our ping.
    Pong,
    /// The client closed the socket or the transport failed.
    Closed,
}

/// What the driver wants written to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    /// A JSON text frame.
    Text(String),
    /// A keepalive ping.
    Ping,
    /// A close frame; nothing follows it.
    Close(CloseReason),
}

/// How a driven connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// The server closed it with a reason.
    Closed(CloseReason),
    /// The client went away or the writer shut down.
    Disconnected,
    /// No pong arrived in time.
    TimedOut,
}

/// Run `conn` until it closes.
pub async fn drive<C, S>(
    mut conn: C,
    credentials: Credentials,
    mut client: S,
    mut inbox: mpsc::Receiver<TopicEvent>,
    frames: mpsc::Sender<ServerFrame>,
    heartbeat: HeartbeatConfig,
    mut shutdown: broadcast::Receiver<()>,
) -> DriveOutcome
where
    C: Connection,
    S: Stream<Item = ClientEvent> + Unpin + Send,
{
    let conn_id = conn.id();

    if let Err(reason) = conn.connect(&credentials).await {
        debug!(conn_id = %conn_id, kind = %conn.kind(), reason = %reason, "Connect rejected");
        let _ = frames.send(ServerFrame::Close(reason)).await;
        conn.disconnect().await;
        return DriveOutcome::Closed(reason);
    }

    let mut ticker = time::interval_at(
        Instant::now() + heartbeat.ping_interval,
        heartbeat.ping_interval,
    );
    let mut tracker = HeartbeatTracker::new(heartbeat);

    let outcome = loop {
        tokio::select! {
            event = client.next() => match event {
                Some(ClientEvent::Text(raw)) => {
                    tracker.record();
                    match conn.receive(&raw).await {
                        Ok(Some(msg)) => {
                            if !send(&frames, &msg).await {
                                break DriveOutcome::Disconnected;
                            }
                        }
                        Ok(None) => {}
                        Err(reason) => break DriveOutcome::Closed(reason),
                    }
                }
                Some(ClientEvent::Pong) => tracker.record(),
                Some(ClientEvent::Closed) | None => break DriveOutcome::Disconnected,
            },
            Some(delivery) = inbox.recv() => match conn.relay(delivery).await {
                Ok(Some(msg)) => {
                    if !send(&frames, &msg).await {
                        break DriveOutcome::Disconnected;
                    }
                }
                Ok(None) => {}
                Err(reason) => break DriveOutcome::Closed(reason),
            },
            _ = ticker.tick() => {
                if tracker.is_expired() {
                    warn!(conn_id = %conn_id, "Heartbeat timeout");
                    break DriveOutcome::TimedOut;
                }
                if frames.send(ServerFrame::Ping).await.is_err() {
                    break DriveOutcome::Disconnected;
                }
            }
            Ok(()) = shutdown.recv() => break DriveOutcome::Closed(CloseReason::GoingAway),
        }
    };

    if let DriveOutcome::Closed(reason) = outcome {
        let _ = frames.send(ServerFrame::Close(reason)).await;
    }
    conn.disconnect().await;

    debug!(conn_id = %conn_id, kind = %conn.kind(), outcome = ?outcome, "Connection driver finished");
    outcome
}

async fn send(frames: &mpsc::Sender<ServerFrame>, msg: &OutboundMessage) -> bool {
    match serialize_outbound(msg) {
        Ok(text) => frames.send(ServerFrame::Text(text)).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize outbound frame");
            true
        }
    }
}
