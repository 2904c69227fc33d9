//! Credentials: Argon2id password hashes and the token pair handed out by
//! `/auth/login`, `/auth/register` and `/auth/refresh`.

pub mod jwt;
pub mod password;
