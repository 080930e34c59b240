//! # Veturi
//!
//! Authentication and profile API for a two-sided ride-hailing platform.
//! Two account roles share the same lifecycle (register, login, profile,
//! logout): **users** (riders) and **captains** (drivers, who also carry a
//! vehicle record and an active/inactive status).
//!
//! Bearer tokens are JWTs signed with a server-side secret. Logout revokes
//! the presented token by inserting it into a blacklist table consulted on
//! every authenticated request; revoked rows are purged once the token
//! itself has expired.

pub mod api;
pub mod auth;
pub mod cli;
