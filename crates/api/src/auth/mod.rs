//! Authentication primitives.
//!
//! Users sign in with the external identity provider; this service only
//! checks the bearer tokens it hands out.
//!
//! - [`jwt`] -- Access-token validation (and minting, for tooling and tests).

pub mod jwt;
