//! Chat connection: tracks per-chat presence, accepts new messages and
//! relays the room to its client.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use parley_core::error::ErrorKind;
use parley_core::traits::identity::Credentials;
use parley_core::types::id::{ChatId, UserId};
use parley_entity::chat::Chat;
use parley_entity::message::NewMessage;
use parley_entity::session::ChatSession;

use crate::bridge::TopicEvent;
use crate::channel::Topic;
use crate::message::builder::build_ack;
use crate::message::types::{BroadcastEvent, OutboundMessage};
use crate::message::validator::validate_inbound;
use crate::session::SessionError;

use super::close::CloseReason;
use super::context::ConnectionContext;
use super::handle::{ConnectionId, ConnectionKind};
use super::lifecycle::{ConnectionState, Lifecycle};
use super::link::TopicLink;
use super::Connection;

/// One user's connection to one chat's live room.
pub struct ChatConnection {
    id: ConnectionId,
    ctx: ConnectionContext,
    lifecycle: Lifecycle,
    link: TopicLink,
    /// Chat id exactly as requested; parsed during connect.
    requested_chat: String,
    user: Option<UserId>,
    chat: Option<Chat>,
    session: Option<ChatSession>,
}

impl ChatConnection {
    /// Create a chat connection for the raw chat id taken from the route.
    pub fn new(id: ConnectionId, ctx: ConnectionContext, requested_chat: impl Into<String>) -> Self {
        let link = TopicLink::new(id, ctx.broadcast.clone());
        Self {
            id,
            ctx,
            lifecycle: Lifecycle::default(),
            link,
            requested_chat: requested_chat.into(),
            user: None,
            chat: None,
            session: None,
        }
    }

    /// The chat session this connection started, if any.
    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    async fn load_chat(&self, user: UserId) -> Result<Chat, CloseReason> {
        let chat_id: ChatId = self
            .requested_chat
            .parse()
            .map_err(|_| CloseReason::ChatNotFound)?;

        let chat = self
            .ctx
            .chats
            .get_chat(chat_id)
            .await
            .map_err(|e| {
                warn!(conn_id = %self.id, chat_id = %chat_id, error = %e, "Chat lookup failed");
                CloseReason::ServerError
            })?
            .ok_or(CloseReason::ChatNotFound)?;

        let member = self.ctx.chats.is_member(chat_id, user).await.map_err(|e| {
            warn!(conn_id = %self.id, chat_id = %chat_id, error = %e, "Membership check failed");
            CloseReason::ServerError
        })?;
        if !member {
            return Err(CloseReason::UnauthorizedAccess);
        }
        Ok(chat)
    }
}

#[async_trait]
impl Connection for ChatConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn kind(&self) -> ConnectionKind {
        ConnectionKind::Chat
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

        let chat = self.load_chat(user).await?;

        let session = self
            .ctx
            .sessions
            .start_chat_session(user, chat.id)
            .await
            .map_err(|e| match e {
                SessionError::UnknownUser(_) => CloseReason::AuthMissing,
                SessionError::Backend(_) => {
                    warn!(conn_id = %self.id, error = %e, "Chat session start failed");
                    CloseReason::ServerError
                }
            })?;
        self.session = Some(session);

        self.link.join(Topic::ChatRoom(chat.id)).await.map_err(|e| {
            warn!(conn_id = %self.id, error = %e, "Room subscribe failed");
            CloseReason::ServerError
        })?;

        info!(conn_id = %self.id, user_id = %user, chat_id = %chat.id, "Chat connection open");
        self.chat = Some(chat);
        self.lifecycle.open();
        Ok(())
    }

    async fn receive(&mut self, raw: &str) -> Result<Option<OutboundMessage>, CloseReason> {
        let (Some(user), Some(chat), true) = (self.user, self.chat.clone(), self.lifecycle.is_open())
        else {
            debug!(conn_id = %self.id, "Dropping frame received before open");
            return Ok(None);
        };
        self.ctx.metrics.message_received();

        let payload = validate_inbound(raw, self.ctx.max_message_bytes)
            .and_then(|()| NewMessage::parse(raw))
            .map_err(|e| {
                debug!(conn_id = %self.id, error = %e, "Rejected inbound message");
                CloseReason::InvalidMessage
            })?;

        let message = self
            .ctx
            .chats
            .create_message(chat.id, user, payload)
            .await
            .map_err(|e| match e.kind {
                ErrorKind::Validation => CloseReason::InvalidMessage,
                ErrorKind::NotFound => CloseReason::ChatNotFound,
                _ => {
                    warn!(conn_id = %self.id, chat_id = %chat.id, error = %e, "Message create failed");
                    CloseReason::ServerError
                }
            })?;

        // Runs to completion even if this connection goes away mid-flight.
        let fanout = self.ctx.fanout.clone();
        let stored = message.clone();
        let task = tokio::spawn(async move { fanout.dispatch(&stored, &chat).await });
        match task.await {
            Ok(report) => debug!(
                conn_id = %self.id,
                message_id = %message.id,
                failures = report.failures,
                "Message fanned out"
            ),
            Err(e) => warn!(conn_id = %self.id, message_id = %message.id, error = %e, "Fan-out task failed"),
        }

        Ok(Some(build_ack(message.id)))
    }

    async fn relay(&mut self, delivery: TopicEvent) -> Result<Option<OutboundMessage>, CloseReason> {
        if !self.lifecycle.is_open() {
            return Ok(None);
        }
        match delivery.event.as_ref() {
            BroadcastEvent::ChatMessage { message } => {
                Ok(Some(OutboundMessage::ChatMessage(message.clone())))
            }
            _ => Ok(None),
        }
    }

    async fn disconnect(&mut self) {
        if !self.lifecycle.close() {
            return;
        }
        self.link.leave_all().await;
        if let Some(session) = self.session.take() {
            if let Err(e) = self.ctx.sessions.end_chat_session(&session).await {
                warn!(conn_id = %self.id, session_id = %session.id, error = %e, "Chat session end failed");
            }
        }
        debug!(conn_id = %self.id, "Chat connection closed");
    }
}
