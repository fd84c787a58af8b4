pub mod api;
pub mod gmail;
pub mod session;
