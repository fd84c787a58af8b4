use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MailError;

/// OAuth2 app credentials in Google's "installed app" credentials.json shape.
/// Loaded once, immutable for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
}

/// credentials.json nests the actual fields under an "installed" key.
#[derive(Debug, Serialize, Deserialize)]
pub struct CredentialsFile {
    pub installed: ClientCredentials,
}

/// Bearer + refresh token as persisted to the token file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Epoch seconds after which the access token is considered stale.
    pub expires_at_epoch: i64,
}

impl Token {
    /// Stale slightly early so a token doesn't expire mid-request.
    pub fn is_expired(&self, now_epoch: i64) -> bool {
        now_epoch >= self.expires_at_epoch - 60
    }
}

/// Reads client credentials and reads/writes the token file.
pub struct CredentialStore {
    credentials_path: PathBuf,
    token_path: PathBuf,
}

impl CredentialStore {
    pub fn new(credentials_path: impl Into<PathBuf>, token_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            token_path: token_path.into(),
        }
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    /// Missing or corrupt credentials are fatal: nothing works without them.
    pub fn load_credentials(&self) -> Result<ClientCredentials, MailError> {
        let read = |p: &Path| -> anyhow::Result<ClientCredentials> {
            let s = fs::read_to_string(p)?;
            let f: CredentialsFile = serde_json::from_str(&s)?;
            Ok(f.installed)
        };
        read(&self.credentials_path).map_err(|e| MailError::CredentialsUnavailable {
            path: self.credentials_path.clone(),
            source: e,
        })
    }

    /// A missing or corrupt token is recoverable: the caller runs the
    /// interactive grant to obtain a fresh one.
    pub fn load_token(&self) -> Result<Token, MailError> {
        let read = |p: &Path| -> anyhow::Result<Token> {
            let s = fs::read_to_string(p)?;
            Ok(serde_json::from_str(&s)?)
        };
        read(&self.token_path).map_err(|e| MailError::TokenUnavailable {
            path: self.token_path.clone(),
            source: e,
        })
    }

    /// Atomic replace: write a sibling temp file, then rename over the
    /// target, so a concurrent reader never observes a half-written token.
    pub fn save_token(&self, token: &Token) -> anyhow::Result<()> {
        if let Some(dir) = self.token_path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.token_path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(token)?)?;
        fs::rename(&tmp, &self.token_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> CredentialStore {
        CredentialStore::new(dir.join("credentials.json"), dir.join("token.json"))
    }

    fn write_credentials(dir: &Path) {
        let file = CredentialsFile {
            installed: ClientCredentials {
                client_id: "app.example".into(),
                client_secret: "s3cret".into(),
                redirect_uris: vec!["urn:ietf:wg:oauth:2.0:oob".into()],
            },
        };
        fs::write(
            dir.join("credentials.json"),
            serde_json::to_string(&file).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn loads_credentials_from_installed_shape() {
        let dir = tempdir().unwrap();
        write_credentials(dir.path());
        let creds = store_in(dir.path()).load_credentials().unwrap();
        assert_eq!(creds.client_id, "app.example");
        assert_eq!(creds.redirect_uris.len(), 1);
    }

    #[test]
    fn missing_credentials_is_credentials_unavailable() {
        let dir = tempdir().unwrap();
        let err = store_in(dir.path()).load_credentials().unwrap_err();
        assert!(matches!(err, MailError::CredentialsUnavailable { .. }));
    }

    #[test]
    fn corrupt_credentials_is_credentials_unavailable() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("credentials.json"), "{not json").unwrap();
        let err = store_in(dir.path()).load_credentials().unwrap_err();
        assert!(matches!(err, MailError::CredentialsUnavailable { .. }));
    }

    #[test]
    fn missing_token_is_token_unavailable() {
        let dir = tempdir().unwrap();
        let err = store_in(dir.path()).load_token().unwrap_err();
        assert!(matches!(err, MailError::TokenUnavailable { .. }));
    }

    #[test]
    fn corrupt_token_is_token_unavailable() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("token.json"), "][").unwrap();
        let err = store_in(dir.path()).load_token().unwrap_err();
        assert!(matches!(err, MailError::TokenUnavailable { .. }));
    }

    #[test]
    fn token_round_trips_field_for_field() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let token = Token {
            access_token: "tok1".into(),
            refresh_token: Some("ref1".into()),
            expires_at_epoch: 1_900_000_000,
        };
        store.save_token(&token).unwrap();
        assert_eq!(store.load_token().unwrap(), token);
    }

    #[test]
    fn save_overwrites_prior_token_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let old = Token {
            access_token: "old".into(),
            refresh_token: None,
            expires_at_epoch: 1,
        };
        let new = Token {
            access_token: "new".into(),
            refresh_token: Some("ref".into()),
            expires_at_epoch: 2,
        };
        store.save_token(&old).unwrap();
        store.save_token(&new).unwrap();
        assert_eq!(store.load_token().unwrap(), new);
        assert!(!dir.path().join("token.json.tmp").exists());
    }

    #[test]
    fn expiry_uses_a_safety_margin() {
        let token = Token {
            access_token: "t".into(),
            refresh_token: None,
            expires_at_epoch: 1000,
        };
        assert!(!token.is_expired(900));
        assert!(token.is_expired(940));
        assert!(token.is_expired(1000));
    }
}
