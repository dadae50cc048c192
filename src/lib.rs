//! chatmarks — a bookmark engine for AI chat transcripts.
//!
//! Captures a text selection from a chat page (ChatGPT, Claude, Grok) as a
//! durable fingerprint, relocates it later in a DOM that may have re-rendered
//! since capture, and scrolls/highlights the recovered location. The page DOM
//! is an explicit in-memory document; a host shim owns the event loop and
//! drives the engine with millisecond timestamps.

pub mod app;
pub mod dom;
pub mod managers;
pub mod message_handler;
pub mod platform;
pub mod services;
pub mod storage;
pub mod types;
