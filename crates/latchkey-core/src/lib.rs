//! Service plumbing shared by Latchkey services: tracing setup, request ids
//! and health probes.

pub mod health;
pub mod middleware;
pub mod tracing;
