//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionStore`: the credential + identity pair with durable,
//!   versioned persistence across restarts
//! - `SessionHandle`: a cheaply-cloneable handle the fetcher and executor
//!   receive by constructor injection
//!
//! The store never validates credential freshness beyond presence; the
//! backend remains the authority and signals staleness with 401, which the
//! consumers translate into a logout.

pub mod session;

pub use session::{SessionHandle, SessionStore};
