//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use futures::Stream;
use tokio::sync::{broadcast, mpsc};
use tracing::info;

use parley_core::config::RealtimeConfig;
use parley_core::traits::identity::{Credentials, IdentityResolver};
use parley_database::repositories::{ChatRepository, UserRepository};

use crate::bridge::{BroadcastPort, MemoryBroadcast, TopicEvent};
use crate::channel::registry::ChannelRegistry;
use crate::connection::driver::{ClientEvent, DriveOutcome, ServerFrame, drive};
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::manager::ConnectionManager;
use crate::connection::pool::ConnectionPool;
use crate::connection::{
    ChatConnection, Connection, ConnectionContext, ConnectionKind, ListConnection,
    NotificationConnection,
};
use crate::fanout::FanoutEngine;
use crate::metrics::RealtimeMetrics;
use crate::session::{MemorySessionStore, SessionStore};

/// Central real-time engine that coordinates all connection subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection manager.
    pub connections: Arc<ConnectionManager>,
    /// Channel registry.
    pub channels: Arc<ChannelRegistry>,
    /// Group broadcast port.
    pub broadcast: Arc<dyn BroadcastPort>,
    /// Session store.
    pub sessions: Arc<dyn SessionStore>,
    /// Fan-out engine.
    pub fanout: Arc<FanoutEngine>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Shared connection collaborators.
    context: ConnectionContext,
    /// Heartbeat timing.
    heartbeat: HeartbeatConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.connections.connection_count())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        config: RealtimeConfig,
        identity: Arc<dyn IdentityResolver>,
        users: Arc<dyn UserRepository>,
        chats: Arc<dyn ChatRepository>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let pool = Arc::new(ConnectionPool::new());
        let channels = Arc::new(ChannelRegistry::new());
        let connections = Arc::new(ConnectionManager::new(
            pool.clone(),
            channels.clone(),
            metrics.clone(),
            config.channel_buffer_size,
        ));
        let broadcast: Arc<dyn BroadcastPort> = Arc::new(MemoryBroadcast::new(
            channels.clone(),
            pool,
            metrics.clone(),
        ));
        let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new(
            users.clone(),
            config.session_history_per_scope,
        ));
        let fanout = Arc::new(FanoutEngine::new(
            sessions.clone(),
            chats.clone(),
            users,
            broadcast.clone(),
            metrics.clone(),
        ));

        let context = ConnectionContext {
            identity,
            sessions: sessions.clone(),
            chats,
            broadcast: broadcast.clone(),
            fanout: fanout.clone(),
            metrics: metrics.clone(),
            max_message_bytes: config.max_message_bytes,
        };

        info!("Real-time engine initialized");

        Self {
            connections,
            channels,
            broadcast,
            sessions,
            fanout,
            metrics,
            context,
            heartbeat: HeartbeatConfig::from(&config),
            shutdown_tx,
        }
    }

    /// Register a new chat-list connection.
    pub fn list_connection(&self) -> (ListConnection, mpsc::Receiver<TopicEvent>) {
        let (handle, inbox) = self.connections.register(ConnectionKind::List);
        (ListConnection::new(handle.id, self.context.clone()), inbox)
    }

    /// Register a new chat connection for the raw chat id from the route.
    pub fn chat_connection(&self, chat_id: &str) -> (ChatConnection, mpsc::Receiver<TopicEvent>) {
        let (handle, inbox) = self.connections.register(ConnectionKind::Chat);
        (
            ChatConnection::new(handle.id, self.context.clone(), chat_id),
            inbox,
        )
    }

    /// Register a new notification connection.
    pub fn notification_connection(&self) -> (NotificationConnection, mpsc::Receiver<TopicEvent>) {
        let (handle, inbox) = self.connections.register(ConnectionKind::Notification);
        (NotificationConnection::new(handle.id, self.context.clone()), inbox)
    }

    /// Drive a registered connection to completion, then unregister it.
    pub async fn serve<C, S>(
        &self,
        conn: C,
        inbox: mpsc::Receiver<TopicEvent>,
        credentials: Credentials,
        client: S,
        frames: mpsc::Sender<ServerFrame>,
    ) -> DriveOutcome
    where
        C: Connection,
        S: Stream<Item = ClientEvent> + Unpin + Send,
    {
        let conn_id = conn.id();
        let outcome = drive(
            conn,
            credentials,
            client,
            inbox,
            frames,
            self.heartbeat,
            self.shutdown_tx.subscribe(),
        )
        .await;
        self.connections.unregister(&conn_id);
        outcome
    }

    /// Signals every driver to close and drops remaining registrations.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let _ = self.shutdown_tx.send(());
        self.connections.close_all();
    }
}
