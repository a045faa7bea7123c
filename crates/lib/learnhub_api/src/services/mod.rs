//! Services composing `learnhub_core` into request flows.

pub mod auth;
