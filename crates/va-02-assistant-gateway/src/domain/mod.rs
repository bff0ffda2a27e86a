//! # Domain Layer
//!
//! Skill payloads, intent routing and the spoken replies.

pub mod blog;
pub mod config;
pub mod error;
pub mod intents;
pub mod messages;
pub mod skill;
