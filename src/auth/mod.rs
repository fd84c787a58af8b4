pub mod credentials;
pub mod oauth;
pub mod prompt;
