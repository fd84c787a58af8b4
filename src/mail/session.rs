//! Session/credential lifecycle: Unauthenticated → Authenticating →
//! Authenticated, with token persistence and transparent refresh.

use crate::auth::credentials::{ClientCredentials, CredentialStore, Token};
use crate::auth::oauth;
use crate::auth::prompt::AuthPrompt;
use crate::error::MailError;
use crate::mail::api::{Label, MailMessage, MailboxApi, MessageRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unauthenticated,
    /// Transient, while the interactive grant is in flight.
    Authenticating,
    /// Terminal until process restart; there is no explicit logout.
    Authenticated,
}

/// Owns the OAuth2 credentials, the current token and the authentication
/// status. Query operations are valid only when Authenticated and fail fast
/// otherwise, before any remote call is made.
pub struct MailSession {
    store: CredentialStore,
    api: Box<dyn MailboxApi>,
    prompt: Box<dyn AuthPrompt>,
    status: SessionStatus,
    credentials: Option<ClientCredentials>,
    token: Option<Token>,
}

impl MailSession {
    pub fn new(
        store: CredentialStore,
        api: Box<dyn MailboxApi>,
        prompt: Box<dyn AuthPrompt>,
    ) -> Self {
        Self {
            store,
            api,
            prompt,
            status: SessionStatus::Unauthenticated,
            credentials: None,
            token: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// Idempotent: a second call when already Authenticated is a no-op.
    ///
    /// A stored token is trusted without a network round-trip; its validity
    /// is discovered lazily on the first real query. Only when no usable
    /// token file exists does this run the interactive grant, and any grant
    /// failure reverts the session to Unauthenticated.
    pub fn authenticate(&mut self) -> Result<(), MailError> {
        if self.is_authenticated() {
            return Ok(());
        }

        let creds = self.store.load_credentials()?;

        match self.store.load_token() {
            Ok(token) => {
                self.install(creds, token);
                Ok(())
            }
            Err(MailError::TokenUnavailable { path, source }) => {
                log::warn!(
                    "cannot read token file {}: {source}; starting interactive grant",
                    path.display()
                );
                self.status = SessionStatus::Authenticating;
                match self.interactive_grant(&creds) {
                    Ok(token) => {
                        self.install(creds, token);
                        Ok(())
                    }
                    Err(e) => {
                        self.status = SessionStatus::Unauthenticated;
                        Err(e)
                    }
                }
            }
            Err(other) => Err(other),
        }
    }

    pub fn list_labels(&mut self) -> Result<Vec<Label>, MailError> {
        let access = self.access_token()?;
        let labels = self.api.list_labels(&access)?;
        if labels.is_empty() {
            return Err(MailError::NotFound("labels"));
        }
        Ok(labels)
    }

    /// One bounded list call. `max_results` is authoritative (clamped to the
    /// provider ceiling by the transport). Zero matches is `NotFound`, not an
    /// empty success.
    pub fn list_message_ids(
        &mut self,
        max_results: u32,
        query: &str,
    ) -> Result<Vec<MessageRef>, MailError> {
        let access = self.access_token()?;
        let refs = self.api.list_message_ids(&access, max_results, query)?;
        if refs.is_empty() {
            return Err(MailError::NotFound("messages"));
        }
        Ok(refs)
    }

    pub fn get_message(&mut self, id: &str) -> Result<MailMessage, MailError> {
        let access = self.access_token()?;
        self.api.get_message(&access, id)
    }

    fn install(&mut self, creds: ClientCredentials, token: Token) {
        self.credentials = Some(creds);
        self.token = Some(token);
        self.status = SessionStatus::Authenticated;
    }

    fn interactive_grant(&self, creds: &ClientCredentials) -> Result<Token, MailError> {
        let auth_url =
            oauth::authorize_url(creds).map_err(|e| MailError::GrantFailed(e.to_string()))?;
        let code = self.prompt.prompt_code(&auth_url)?;
        let token = self.api.exchange_code(creds, &code)?;
        self.store
            .save_token(&token)
            .map_err(|e| MailError::GrantFailed(format!("could not persist token: {e}")))?;
        log::debug!("token stored in {}", self.store.token_path().display());
        Ok(token)
    }

    /// Current access token, refreshed (and re-persisted) first if it has
    /// gone stale and a refresh token is on hand. Without a refresh token
    /// the stale one goes out as-is; revocation or expiry then surfaces as
    /// a query failure, which is the lazy-validity contract.
    fn access_token(&mut self) -> Result<String, MailError> {
        let (Some(creds), Some(token)) = (&self.credentials, &self.token) else {
            return Err(MailError::NotAuthenticated);
        };
        if self.status != SessionStatus::Authenticated {
            return Err(MailError::NotAuthenticated);
        }

        if token.is_expired(oauth::now_epoch())
            && let Some(refresh) = token.refresh_token.clone()
        {
            let fresh = self.api.refresh_token(creds, &refresh)?;
            if let Err(e) = self.store.save_token(&fresh) {
                log::warn!("could not persist refreshed token: {e}");
            }
            let access = fresh.access_token.clone();
            self.token = Some(fresh);
            return Ok(access);
        }

        Ok(token.access_token.clone())
    }
}
