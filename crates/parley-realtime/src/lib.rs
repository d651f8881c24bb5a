//! # parley-realtime
//!
//! Real-time engine for Parley. Provides:
//!
//! - Topic naming and an in-memory group broadcast port
//! - Presence and chat session tracking with single-active-session enforcement
//! - List, chat and notification connection state machines
//! - The per-message fan-out engine that decides who hears about what
//! - A transport-agnostic connection driver with ping/pong heartbeat

pub mod bridge;
pub mod channel;
pub mod connection;
pub mod fanout;
pub mod message;
pub mod metrics;
pub mod server;
pub mod session;

pub use bridge::{BroadcastPort, MemoryBroadcast, TopicEvent};
pub use channel::{ChannelRegistry, Topic};
pub use connection::manager::ConnectionManager;
pub use fanout::FanoutEngine;
pub use server::RealtimeEngine;
pub use session::{MemorySessionStore, SessionError, SessionStore};
