//! Client library for the Agentic Kernel.
//!
//! Provides the REST wrapper, server-sent event parsing, typed job events,
//! and the polling clients that track a generation job until its exports
//! are available.

pub mod api;
pub mod events;
pub mod poller;
pub mod sse;
