//! Checker worker wiring.
//!
//! This module exposes the command/event protocol, the worker spawn helper,
//! and the owner-thread client used by the editor session.

mod client;
mod protocol;
#[cfg(test)]
pub(crate) mod test_support;
mod worker;

pub use client::{CheckReply, CheckerClient, PendingCheck, NOT_READY, SHUT_DOWN, UNAVAILABLE};
pub use protocol::{CheckCmd, CheckEvent, RequestId};
pub use worker::{spawn_checker, CheckerHandle, CheckerServices, SUPERSEDED};
