//! Chat-list connection: tracks global presence and refreshes list previews.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use parley_core::traits::identity::Credentials;
use parley_core::types::id::UserId;
use parley_entity::session::PresenceSession;

use crate::bridge::TopicEvent;
use crate::channel::Topic;
use crate::message::types::{BroadcastEvent, OutboundMessage};

use super::close::CloseReason;
use super::context::ConnectionContext;
use super::handle::{ConnectionId, ConnectionKind};
use super::lifecycle::{ConnectionState, Lifecycle};
use super::link::TopicLink;
use super::Connection;

/// One user's connection to the global chat-list view.
pub struct ListConnection {
    id: ConnectionId,
    ctx: ConnectionContext,
    lifecycle: Lifecycle,
    link: TopicLink,
    user: Option<UserId>,
    session: Option<PresenceSession>,
}

impl ListConnection {
    /// Create a list connection in the `DISCONNECTED` state.
    pub fn new(id: ConnectionId, ctx: ConnectionContext) -> Self {
        let link = TopicLink::new(id, ctx.broadcast.clone());
        Self {
            id,
            ctx,
            lifecycle: Lifecycle::default(),
            link,
            user: None,
            session: None,
        }
    }

    /// The presence session this connection started, if any.
    pub fn session(&self) -> Option<&PresenceSession> {
        self.session.as_ref()
    }
}

#[async_trait]
impl Connection for ListConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn kind(&self) -> ConnectionKind {
        ConnectionKind::List
    }

    fn state(&self) -> ConnectionState {
        self.lifecycle.state()
    }

    async fn connect(&mut self, credentials: &Credentials) -> Result<(), CloseReason> {
        if !self.lifecycle.begin() {
            return Err(CloseReason::ServerError);
        }
        let user = self.ctx.authenticate(credentials).await?;
        self.user = Some(user);

        let session = self.ctx.sessions.start_presence(user).await.map_err(|e| {
            warn!(conn_id = %self.id, user_id = %user, error = %e, "Presence start failed");
            CloseReason::ServerError
        })?;
        self.session = Some(session);

        self.link.join(Topic::UserChats(user)).await.map_err(|e| {
            warn!(conn_id = %self.id, error = %e, "List topic subscribe failed");
            CloseReason::ServerError
        })?;

        self.lifecycle.open();
        info!(conn_id = %self.id, user_id = %user, "List connection open");
        Ok(())
    }

    async fn receive(&mut self, _raw: &str) -> Result<Option<OutboundMessage>, CloseReason> {
        debug!(conn_id = %self.id, "Ignoring client frame on list connection");
        Ok(None)
    }

    async fn relay(&mut self, delivery: TopicEvent) -> Result<Option<OutboundMessage>, CloseReason> {
        let (Some(user), true) = (self.user, self.lifecycle.is_open()) else {
            return Ok(None);
        };
        let BroadcastEvent::ChatUpdated { chat_id } = delivery.event.as_ref() else {
            return Ok(None);
        };
        let chat_id = *chat_id;

        match self.ctx.chats.chat_summary(chat_id, user).await {
            Ok(Some(summary)) => Ok(Some(OutboundMessage::Chat(summary))),
            Ok(None) => {
                debug!(conn_id = %self.id, chat_id = %chat_id, "Refreshed chat no longer exists");
                Ok(None)
            }
            Err(e) => {
                warn!(conn_id = %self.id, chat_id = %chat_id, error = %e, "Chat refresh failed");
                Ok(None)
            }
        }
    }

    async fn disconnect(&mut self) {
        if !self.lifecycle.close() {
            return;
        }
        self.link.leave_all().await;
        if let Some(session) = self.session.take() {
            if let Err(e) = self.ctx.sessions.end_presence(&session).await {
                warn!(conn_id = %self.id, session_id = %session.id, error = %e, "Presence end failed");
            }
        }
        debug!(conn_id = %self.id, "List connection closed");
    }
}
