//! Notification connection: marks its user notification-eligible and
//! forwards notifications.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use parley_core::traits::identity::Credentials;
use parley_core::types::id::UserId;

use crate::bridge::TopicEvent;
use crate::channel::Topic;
use crate::message::builder::build_notification;
use crate::message::types::OutboundMessage;

use super::close::CloseReason;
use super::context::ConnectionContext;
use super::handle::{ConnectionId, ConnectionKind};
use super::lifecycle::{ConnectionState, Lifecycle};
use super::link::TopicLink;
use super::Connection;

/// One user's connection to the global notification channel.
pub struct NotificationConnection {
    id: ConnectionId,
    ctx: ConnectionContext,
    lifecycle: Lifecycle,
    link: TopicLink,
    /// Set once eligibility was granted, so close only revokes what it set.
    eligible_user: Option<UserId>,
}

impl NotificationConnection {
    /// Create a notification connection in the `DISCONNECTED` state.
    pub fn new(id: ConnectionId, ctx: ConnectionContext) -> Self {
        let link = TopicLink::new(id, ctx.broadcast.clone());
        Self {
            id,
            ctx,
            lifecycle: Lifecycle::default(),
            link,
            eligible_user: None,
        }
    }
}

#[async_trait]
impl Connection for NotificationConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn kind(&self) -> ConnectionKind {
        ConnectionKind::Notification
    }

    fn state(&self) -> ConnectionState {
        self.lifecycle.state()
    }

    async fn connect(&mut self, credentials: &Credentials) -> Result<(), CloseReason> {
        if !self.lifecycle.begin() {
            return Err(CloseReason::ServerError);
        }
        let user = self.ctx.authenticate(credentials).await?;

        self.ctx
            .sessions
            .set_notification_eligible(user, true)
            .await
            .map_err(|e| {
                warn!(conn_id = %self.id, user_id = %user, error = %e, "Eligibility update failed");
                CloseReason::ServerError
            })?;
        self.eligible_user = Some(user);

        self.link
            .join(Topic::UserNotifications(user))
            .await
            .map_err(|e| {
                warn!(conn_id = %self.id, error = %e, "Notification topic subscribe failed");
                CloseReason::ServerError
            })?;

        self.lifecycle.open();
        info!(conn_id = %self.id, user_id = %user, "Notification connection open");
        Ok(())
    }

    async fn receive(&mut self, _raw: &str) -> Result<Option<OutboundMessage>, CloseReason> {
        debug!(conn_id = %self.id, "Ignoring client frame on notification connection");
        Ok(None)
    }

    async fn relay(&mut self, delivery: TopicEvent) -> Result<Option<OutboundMessage>, CloseReason> {
        if !self.lifecycle.is_open() {
            return Ok(None);
        }
        Ok(build_notification(&delivery.event))
    }

    async fn disconnect(&mut self) {
        if !self.lifecycle.close() {
            return;
        }
        self.link.leave_all().await;
        if let Some(user) = self.eligible_user.take() {
            if let Err(e) = self.ctx.sessions.set_notification_eligible(user, false).await {
                warn!(conn_id = %self.id, user_id = %user, error = %e, "Eligibility clear failed");
            }
        }
        debug!(conn_id = %self.id, "Notification connection closed");
    }
}
