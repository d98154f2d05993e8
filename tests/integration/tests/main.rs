//! Cross-crate integration tests.
//!
//! These tests wire the pool, the failover client, and the security handler
//! together against an in-process STS stub that answers over the real
//! transport seam.

mod common;
mod failover_flow;
mod validation_flow;
