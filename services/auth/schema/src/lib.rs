//! sea-orm entities owned by the auth service.

pub mod outbox_events;
pub mod projects;
pub mod refresh_tokens;
pub mod users;
pub mod verification_codes;
