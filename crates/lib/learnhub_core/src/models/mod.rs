//! Domain models shared by the auth core and the HTTP layer.

pub mod auth;
