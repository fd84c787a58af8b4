use std::path::PathBuf;

/// Error taxonomy for the credential/session lifecycle and the poll loop.
///
/// Everything raised inside a tick ends up logged exactly once at the
/// checker boundary; nothing here should abort the process.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The client credentials file is missing or unreadable. Fatal to the
    /// current tick: no mailbox access is possible without app credentials.
    #[error("cannot read client credentials file {path}: {source}")]
    CredentialsUnavailable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// No stored token (absent or corrupt file). Recoverable: the caller
    /// runs the interactive grant.
    #[error("cannot read token file {path}: {source}")]
    TokenUnavailable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The interactive authorization grant failed (bad code, network error,
    /// denied scope). The session stays Unauthenticated.
    #[error("authorization grant failed: {0}")]
    GrantFailed(String),

    /// No stored token and the process is running without an interactive
    /// channel. Run the one-time `authorize` command first.
    #[error("no stored token; run `mail_checker authorize` once to grant access")]
    NeedsAuthorization,

    /// A query operation was attempted before `authenticate()` succeeded.
    #[error("session is not authenticated yet")]
    NotAuthenticated,

    /// Transport or provider failure on a remote call.
    #[error("remote call failed: {0}")]
    RemoteCallFailed(String),

    /// The remote call succeeded but matched nothing. Distinct from a
    /// transport error so callers can tell "nothing matched" from "call
    /// failed".
    #[error("no {0} found")]
    NotFound(&'static str),
}

impl MailError {
    pub fn remote(err: impl std::fmt::Display) -> Self {
        MailError::RemoteCallFailed(err.to_string())
    }
}
