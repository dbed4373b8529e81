pub mod auth;
pub mod roster;
pub mod scoring;
