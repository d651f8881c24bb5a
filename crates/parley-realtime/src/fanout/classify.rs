//! Recipient classification.
//!
//! Pure computation over presence state that has already been fetched.
//! Every non-author member lands in exactly one of three sets:
//!
//! - `chat_active`: holds an active chat session on this chat and gets a
//!   list-refresh signal.
//! - `notify`: has an open notification connection and is not tracking this
//!   chat and gets a hydrated notification.
//! - `silent`: neither; relies on the persisted read path.

use std::collections::HashSet;

use parley_core::types::id::{ChatId, UserId};

/// Presence snapshot for one chat member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPresence {
    /// The member.
    pub user_id: UserId,
    /// Has an active chat session on the chat being fanned out.
    pub chat_active: bool,
    /// Has an open notification connection.
    pub notification_eligible: bool,
    /// All chats the member currently holds an active chat session on.
    pub active_chats: HashSet<ChatId>,
}

/// The three disjoint delivery sets, each sorted by user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recipients {
    /// Members receiving a list-refresh signal.
    pub chat_active: Vec<UserId>,
    /// Members receiving a hydrated notification.
    pub notify: Vec<UserId>,
    /// Members receiving nothing.
    pub silent: Vec<UserId>,
}

/// Partition `members` for a message by `author` in `chat_id`.
///
/// The author is skipped if present. A chat-active member never also lands
/// in `notify`, even when notification-eligible.
pub fn classify(author: UserId, chat_id: ChatId, members: &[MemberPresence]) -> Recipients {
    let mut out = Recipients::default();

    for member in members.iter().filter(|m| m.user_id != author) {
        if member.chat_active {
            out.chat_active.push(member.user_id);
        } else if member.notification_eligible && !member.active_chats.contains(&chat_id) {
            out.notify.push(member.user_id);
        } else {
            out.silent.push(member.user_id);
        }
    }

    out.chat_active.sort();
    out.notify.sort();
    out.silent.sort();
    out
}
