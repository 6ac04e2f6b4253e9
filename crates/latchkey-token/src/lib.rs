//! Session access tokens shared across Latchkey services.
//!
//! Every service that authenticates requests validates access tokens with
//! [`token::validate_access_token`]. Minting is behind the `issue` feature.

pub mod token;
