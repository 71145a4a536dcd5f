//! Interview session orchestration
//!
//! This module provides the `InterviewSession` state machine that
//! manages:
//! - Question generation and narration
//! - Answer capture and the per-answer analysis pipeline
//! - Result and report persistence with an idempotent-save guard
//! - Cancellation of stale asynchronous completions via a generation
//!   counter

mod config;
mod controller;
mod phase;

pub use config::SessionConfig;
pub use controller::{InterviewSession, SessionSummary};
pub use phase::SessionPhase;
