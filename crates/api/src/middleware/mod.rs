//! Request extractors that establish who is calling.
//!
//! [`auth::AuthUser`] and [`auth::MaybeAuthUser`] read the bearer token;
//! [`rbac`] narrows an authenticated caller by role.

pub mod auth;
pub mod rbac;
