//! The fan-out engine.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use parley_core::types::id::{ChatId, UserId};
use parley_database::repositories::{ChatRepository, UserRepository};
use parley_entity::chat::{Chat, ChatSummary};
use parley_entity::message::Message;
use parley_entity::user::UserSummary;

use crate::bridge::BroadcastPort;
use crate::channel::Topic;
use crate::message::builder::{build_chat_updated, build_new_message, build_room_message};
use crate::message::types::BroadcastEvent;
use crate::metrics::RealtimeMetrics;
use crate::session::{SessionError, SessionStore};

use super::classify::{MemberPresence, Recipients, classify};

/// Outcome of one fan-out pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanoutReport {
    /// Whether the room publish succeeded.
    pub room_published: bool,
    /// How members were classified.
    pub recipients: Recipients,
    /// List-refresh signals published.
    pub list_refreshes: usize,
    /// Notifications published.
    pub notifications: usize,
    /// Publishes that failed or were skipped.
    pub failures: usize,
}

/// Computes recipient sets for a new message and issues the broadcasts.
///
/// Publish failures are logged and counted; they never propagate, since the
/// message is already persisted by the time fan-out runs.
pub struct FanoutEngine {
    sessions: Arc<dyn SessionStore>,
    chats: Arc<dyn ChatRepository>,
    users: Arc<dyn UserRepository>,
    broadcast: Arc<dyn BroadcastPort>,
    metrics: Arc<RealtimeMetrics>,
}

impl std::fmt::Debug for FanoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutEngine").finish()
    }
}

impl FanoutEngine {
    /// Creates a fan-out engine.
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        chats: Arc<dyn ChatRepository>,
        users: Arc<dyn UserRepository>,
        broadcast: Arc<dyn BroadcastPort>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            sessions,
            chats,
            users,
            broadcast,
            metrics,
        }
    }

    /// Run one full fan-out pass for `message` in `chat`.
    ///
    /// Membership is re-read from the store, so only the chat's current
    /// members are classified. If the chat can no longer be read, only the
    /// room publish happens.
    pub async fn dispatch(&self, message: &Message, chat: &Chat) -> FanoutReport {
        self.metrics.fanout_run();
        let author = message.user_id;
        let mut report = FanoutReport::default();

        let room = Topic::ChatRoom(chat.id).to_topic_string();
        report.room_published = self.publish(&room, build_room_message(message)).await;
        if !report.room_published {
            report.failures += 1;
        }

        let Some(chat) = self.current(chat.id).await else {
            return report;
        };
        let chat = &chat;

        let presence = self.gather(author, chat).await;
        let recipients = classify(author, chat.id, &presence);

        for member in &recipients.chat_active {
            let topic = Topic::UserChats(*member).to_topic_string();
            if self.publish(&topic, build_chat_updated(chat.id)).await {
                report.list_refreshes += 1;
                self.metrics.list_refresh();
            } else {
                report.failures += 1;
            }
        }

        if !recipients.notify.is_empty() {
            match self.hydrate(author, chat.id).await {
                Some((summary, author_summary)) => {
                    for member in &recipients.notify {
                        let topic = Topic::UserNotifications(*member).to_topic_string();
                        let event = build_new_message(summary.clone(), author_summary.clone(), message);
                        if self.publish(&topic, event).await {
                            report.notifications += 1;
                            self.metrics.notification();
                        } else {
                            report.failures += 1;
                        }
                    }
                }
                None => report.failures += recipients.notify.len(),
            }
        }

        debug!(
            chat_id = %chat.id,
            message_id = %message.id,
            chat_active = recipients.chat_active.len(),
            notify = recipients.notify.len(),
            silent = recipients.silent.len(),
            failures = report.failures,
            "Fan-out complete"
        );

        report.recipients = recipients;
        report
    }

    async fn current(&self, chat_id: ChatId) -> Option<Chat> {
        match self.chats.get_chat(chat_id).await {
            Ok(Some(chat)) => Some(chat),
            Ok(None) => {
                warn!(chat_id = %chat_id, "Chat vanished before fan-out");
                None
            }
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "Membership lookup failed");
                None
            }
        }
    }

    async fn publish(&self, topic: &str, event: BroadcastEvent) -> bool {
        match self.broadcast.publish(topic, event).await {
            Ok(_) => {
                self.metrics.publish(true);
                true
            }
            Err(e) => {
                warn!(topic = %topic, error = %e, "Publish failed");
                self.metrics.publish(false);
                false
            }
        }
    }

    /// Fetch presence for every member except the author. A member whose
    /// state cannot be read is treated as offline.
    async fn gather(&self, author: UserId, chat: &Chat) -> Vec<MemberPresence> {
        let mut out = Vec::with_capacity(chat.members.len());
        for user_id in chat.members_except(&author) {
            match self.presence_of(user_id, chat.id).await {
                Ok(presence) => out.push(presence),
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Presence lookup failed");
                    out.push(MemberPresence {
                        user_id,
                        chat_active: false,
                        notification_eligible: false,
                        active_chats: HashSet::new(),
                    });
                }
            }
        }
        out
    }

    async fn presence_of(
        &self,
        user_id: UserId,
        chat_id: ChatId,
    ) -> Result<MemberPresence, SessionError> {
        let chat_active = self.sessions.has_active_chat_session(user_id, chat_id).await?;
        let notification_eligible = self.sessions.is_notification_eligible(user_id).await?;
        let active_chats = if notification_eligible && !chat_active {
            self.sessions.active_chat_sessions_for(user_id).await?
        } else {
            HashSet::new()
        };
        Ok(MemberPresence {
            user_id,
            chat_active,
            notification_eligible,
            active_chats,
        })
    }

    /// Author-perspective chat summary plus the author's own summary.
    async fn hydrate(&self, author: UserId, chat_id: ChatId) -> Option<(ChatSummary, UserSummary)> {
        let summary = match self.chats.chat_summary(chat_id, author).await {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                warn!(chat_id = %chat_id, "Chat vanished before notifications were sent");
                return None;
            }
            Err(e) => {
                warn!(chat_id = %chat_id, error = %e, "Chat summary lookup failed");
                return None;
            }
        };
        let user = match self.users.find_by_id(author).await {
            Ok(Some(user)) => user.summary(),
            Ok(None) => {
                warn!(user_id = %author, "Author vanished before notifications were sent");
                return None;
            }
            Err(e) => {
                warn!(user_id = %author, error = %e, "Author lookup failed");
                return None;
            }
        };
        Some((summary, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use parley_core::error::AppError;
    use parley_core::result::AppResult;
    use parley_core::types::id::MessageId;
    use parley_database::MemoryDatabase;
    use parley_entity::chat::ChatKind;
    use parley_entity::message::{MessageKind, NewMessage};
    use parley_entity::user::User;

    use crate::connection::handle::ConnectionId;
    use crate::session::MemorySessionStore;

    #[derive(Default)]
    struct RecordingPort {
        published: Mutex<Vec<(String, BroadcastEvent)>>,
        failing: Mutex<HashSet<String>>,
    }

    impl RecordingPort {
        fn on(&self, topic: Topic) -> Vec<BroadcastEvent> {
            let topic = topic.to_topic_string();
            self.published
                .lock()
                .unwrap()
                .iter()
                .filter(|(t, _)| *t == topic)
                .map(|(_, e)| e.clone())
                .collect()
        }

        fn fail(&self, topic: Topic) {
            self.failing.lock().unwrap().insert(topic.to_topic_string());
        }
    }

    #[async_trait]
    impl BroadcastPort for RecordingPort {
        async fn subscribe(&self, _topic: &str, _conn_id: ConnectionId) -> AppResult<()> {
            Ok(())
        }

        async fn unsubscribe(&self, _topic: &str, _conn_id: ConnectionId) -> AppResult<()> {
            Ok(())
        }

        async fn publish(&self, topic: &str, event: BroadcastEvent) -> AppResult<usize> {
            if self.failing.lock().unwrap().contains(topic) {
                return Err(AppError::transport("broker unavailable"));
            }
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), event));
            Ok(1)
        }
    }

    /// Counts summary lookups and otherwise defers to the in-memory store.
    struct CountingChats {
        inner: Arc<MemoryDatabase>,
        summaries: AtomicUsize,
    }

    #[async_trait]
    impl ChatRepository for CountingChats {
        async fn get_chat(&self, id: ChatId) -> AppResult<Option<Chat>> {
            self.inner.get_chat(id).await
        }

        async fn is_member(&self, chat_id: ChatId, user_id: UserId) -> AppResult<bool> {
            self.inner.is_member(chat_id, user_id).await
        }

        async fn create_message(
            &self,
            chat_id: ChatId,
            author: UserId,
            payload: NewMessage,
        ) -> AppResult<Message> {
            self.inner.create_message(chat_id, author, payload).await
        }

        async fn chat_summary(
            &self,
            chat_id: ChatId,
            viewer: UserId,
        ) -> AppResult<Option<ChatSummary>> {
            self.summaries.fetch_add(1, Ordering::SeqCst);
            self.inner.chat_summary(chat_id, viewer).await
        }

        async fn insert_chat(&self, chat: Chat) -> AppResult<Chat> {
            self.inner.insert_chat(chat).await
        }

        async fn list_messages(&self, chat_id: ChatId) -> AppResult<Vec<Message>> {
            self.inner.list_messages(chat_id).await
        }
    }

    struct Fixture {
        engine: FanoutEngine,
        port: Arc<RecordingPort>,
        chats: Arc<CountingChats>,
        sessions: Arc<MemorySessionStore>,
        db: Arc<MemoryDatabase>,
        u1: User,
        u2: User,
        chat: Chat,
    }

    impl Fixture {
        async fn new() -> Self {
            let db = Arc::new(MemoryDatabase::new());
            let u1 = db.insert_user(User::new("u1", "u1@example.com")).await.unwrap();
            let u2 = db.insert_user(User::new("u2", "u2@example.com")).await.unwrap();
            let chat = db
                .insert_chat(Chat::new(ChatKind::Conversation, [u1.id, u2.id]))
                .await
                .unwrap();

            let port = Arc::new(RecordingPort::default());
            let chats = Arc::new(CountingChats {
                inner: db.clone(),
                summaries: AtomicUsize::new(0),
            });
            let sessions = Arc::new(MemorySessionStore::new(db.clone(), 16));
            let engine = FanoutEngine::new(
                sessions.clone(),
                chats.clone(),
                db.clone(),
                port.clone(),
                Arc::new(RealtimeMetrics::new()),
            );

            Self {
                engine,
                port,
                chats,
                sessions,
                db,
                u1,
                u2,
                chat,
            }
        }

        async fn send(&self, author: &User, content: &str) -> (Message, FanoutReport) {
            let message = self
                .db
                .create_message(
                    self.chat.id,
                    author.id,
                    NewMessage {
                        kind: MessageKind::Text,
                        content: content.to_string(),
                    },
                )
                .await
                .unwrap();
            let report = self.engine.dispatch(&message, &self.chat).await;
            (message, report)
        }
    }

    #[tokio::test]
    async fn test_chat_active_member_gets_list_refresh_only() {
        let fx = Fixture::new().await;
        fx.sessions.start_chat_session(fx.u2.id, fx.chat.id).await.unwrap();
        fx.sessions.set_notification_eligible(fx.u2.id, true).await.unwrap();

        let (message, report) = fx.send(&fx.u1, "hello").await;

        assert_eq!(
            fx.port.on(Topic::ChatRoom(fx.chat.id)),
            vec![build_room_message(&message)]
        );
        assert_eq!(
            fx.port.on(Topic::UserChats(fx.u2.id)),
            vec![build_chat_updated(fx.chat.id)]
        );
        assert!(fx.port.on(Topic::UserNotifications(fx.u2.id)).is_empty());
        assert_eq!(report.recipients.chat_active, vec![fx.u2.id]);
        assert_eq!(fx.chats.summaries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_notification_only_member_gets_hydrated_notification() {
        let fx = Fixture::new().await;
        fx.sessions.set_notification_eligible(fx.u2.id, true).await.unwrap();

        let (message, report) = fx.send(&fx.u1, "ping").await;

        let events = fx.port.on(Topic::UserNotifications(fx.u2.id));
        assert_eq!(events.len(), 1);
        match &events[0] {
            BroadcastEvent::NewMessage {
                chat,
                user,
                message: view,
            } => {
                assert_eq!(chat.id, fx.chat.id);
                assert_eq!(chat.users, vec![fx.u2.summary()]);
                assert_eq!(user, &fx.u1.summary());
                assert_eq!(view, &message.view());
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(fx.port.on(Topic::UserChats(fx.u2.id)).is_empty());
        assert_eq!(report.notifications, 1);
        assert_eq!(fx.chats.summaries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_member_watching_other_chat_is_notified() {
        let fx = Fixture::new().await;
        fx.sessions.start_chat_session(fx.u2.id, ChatId::new()).await.unwrap();
        fx.sessions.set_notification_eligible(fx.u2.id, true).await.unwrap();

        let (_, report) = fx.send(&fx.u1, "over here").await;

        assert_eq!(report.recipients.notify, vec![fx.u2.id]);
        assert_eq!(fx.port.on(Topic::UserNotifications(fx.u2.id)).len(), 1);
        assert!(fx.port.on(Topic::UserChats(fx.u2.id)).is_empty());
    }

    #[tokio::test]
    async fn test_offline_member_hears_nothing() {
        let fx = Fixture::new().await;

        let (_, report) = fx.send(&fx.u1, "anyone?").await;

        assert!(fx.port.on(Topic::UserChats(fx.u2.id)).is_empty());
        assert!(fx.port.on(Topic::UserNotifications(fx.u2.id)).is_empty());
        assert_eq!(report.recipients.silent, vec![fx.u2.id]);
        assert_eq!(fx.port.on(Topic::ChatRoom(fx.chat.id)).len(), 1);
        assert_eq!(fx.chats.summaries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_author_gets_no_personal_signal() {
        let fx = Fixture::new().await;
        fx.sessions.start_chat_session(fx.u1.id, fx.chat.id).await.unwrap();
        fx.sessions.set_notification_eligible(fx.u1.id, true).await.unwrap();

        fx.send(&fx.u1, "talking to myself").await;

        assert!(fx.port.on(Topic::UserChats(fx.u1.id)).is_empty());
        assert!(fx.port.on(Topic::UserNotifications(fx.u1.id)).is_empty());
    }

    #[tokio::test]
    async fn test_room_failure_does_not_block_recipients() {
        let fx = Fixture::new().await;
        fx.port.fail(Topic::ChatRoom(fx.chat.id));
        fx.sessions.start_chat_session(fx.u2.id, fx.chat.id).await.unwrap();

        let (_, report) = fx.send(&fx.u1, "still here").await;

        assert!(!report.room_published);
        assert_eq!(report.failures, 1);
        assert_eq!(report.list_refreshes, 1);
    }

    #[tokio::test]
    async fn test_membership_is_read_at_send_time() {
        let fx = Fixture::new().await;
        let u3 = fx
            .db
            .insert_user(User::new("u3", "u3@example.com"))
            .await
            .unwrap();
        fx.sessions.set_notification_eligible(fx.u2.id, true).await.unwrap();
        fx.sessions.set_notification_eligible(u3.id, true).await.unwrap();
        let mut replaced = fx.chat.clone();
        replaced.members = [fx.u1.id, u3.id].into_iter().collect();
        fx.db.insert_chat(replaced).await.unwrap();

        let (_, report) = fx.send(&fx.u1, "who is here").await;

        assert_eq!(report.recipients.notify, vec![u3.id]);
        assert_eq!(fx.port.on(Topic::UserNotifications(u3.id)).len(), 1);
        assert!(fx.port.on(Topic::UserNotifications(fx.u2.id)).is_empty());
    }

    #[tokio::test]
    async fn test_missing_chat_publishes_room_only() {
        let fx = Fixture::new().await;
        fx.sessions.set_notification_eligible(fx.u2.id, true).await.unwrap();
        let message = Message {
            id: MessageId::new(),
            chat_id: ChatId::new(),
            user_id: fx.u1.id,
            kind: MessageKind::Text,
            content: "into the void".to_string(),
            created_at: chrono::Utc::now(),
            is_disabled: false,
        };
        let orphan = Chat::new(ChatKind::Conversation, [fx.u1.id, fx.u2.id]);

        let report = fx.engine.dispatch(&message, &orphan).await;

        assert!(report.room_published);
        assert_eq!(fx.port.on(Topic::ChatRoom(orphan.id)).len(), 1);
        assert!(fx.port.on(Topic::UserNotifications(fx.u2.id)).is_empty());
        assert_eq!(report.recipients, Recipients::default());
    }

    #[tokio::test]
    async fn test_recipient_failures_are_independent() {
        let db = Arc::new(MemoryDatabase::new());
        let mut users = Vec::new();
        for name in ["author", "a", "b", "c"] {
            users.push(
                db.insert_user(User::new(name, format!("{name}@example.com")))
                    .await
                    .unwrap(),
            );
        }
        let chat = db
            .insert_chat(Chat::new(ChatKind::Room, users.iter().map(|u| u.id)))
            .await
            .unwrap();

        let port = Arc::new(RecordingPort::default());
        let sessions = Arc::new(MemorySessionStore::new(db.clone(), 16));
        let engine = FanoutEngine::new(
            sessions.clone(),
            db.clone(),
            db.clone(),
            port.clone(),
            Arc::new(RealtimeMetrics::new()),
        );
        for u in &users[1..] {
            sessions.set_notification_eligible(u.id, true).await.unwrap();
        }
        port.fail(Topic::UserNotifications(users[2].id));

        let message = db
            .create_message(
                chat.id,
                users[0].id,
                NewMessage {
                    kind: MessageKind::Text,
                    content: "all hands".to_string(),
                },
            )
            .await
            .unwrap();
        let report = engine.dispatch(&message, &chat).await;

        assert_eq!(report.notifications, 2);
        assert_eq!(report.failures, 1);
        assert_eq!(port.on(Topic::UserNotifications(users[1].id)).len(), 1);
        assert_eq!(port.on(Topic::UserNotifications(users[3].id)).len(), 1);
    }
}
