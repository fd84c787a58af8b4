pub mod auth;
pub mod checker;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod mail;
pub mod store;
