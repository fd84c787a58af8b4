//! Poll orchestration: one bounded mailbox query per scheduled tick, with
//! every failure absorbed at this boundary so the loop never dies.

use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::error::MailError;
use crate::mail::session::MailSession;

pub struct PollChecker {
    session: MailSession,
    query: String,
    max_results: u32,
    in_tick: AtomicBool,
}

impl PollChecker {
    pub fn new(session: MailSession, query: impl Into<String>, max_results: u32) -> Self {
        Self {
            session,
            query: query.into(),
            max_results,
            in_tick: AtomicBool::new(false),
        }
    }

    /// One poll cycle. Errors are caught here, logged once with their source
    /// chain, and absorbed; there is no retry within a tick and no backoff
    /// between ticks. The fixed schedule is the retry mechanism.
    pub fn tick(&mut self) {
        if self.in_tick.swap(true, Ordering::SeqCst) {
            log::warn!("previous mail check still running; skipping this tick");
            return;
        }

        log::debug!("mail check started");
        if let Err(e) = self.check_mail() {
            log::error!("mail check failed: {:#}", anyhow::Error::new(e));
        }

        self.in_tick.store(false, Ordering::SeqCst);
    }

    fn check_mail(&mut self) -> Result<(), MailError> {
        if !self.session.is_authenticated() {
            // may block on first run, waiting for the operator grant
            self.session.authenticate()?;
        }

        let refs = self
            .session
            .list_message_ids(self.max_results, &self.query)?;
        log::debug!("{} message(s) matched query {:?}", refs.len(), self.query);

        // Sequential fetches keep log ordering deterministic; the result
        // count is small and bounded, so latency is not a concern.
        let mut report = String::new();
        for r in &refs {
            let msg = self.session.get_message(&r.id)?;
            report.push_str(&format!("  {}\n", msg.summary()));
        }

        log::debug!("mail check finished:\n{report}");
        Ok(())
    }

    /// Drive ticks on the fixed cadence: one immediately, then one per
    /// interval, until Ctrl-C.
    pub fn run(&mut self, interval: Duration) -> Result<()> {
        let running = Arc::new(AtomicBool::new(true));
        let r2 = running.clone();
        ctrlc::set_handler(move || {
            r2.store(false, Ordering::SeqCst);
        })?;

        log::info!("checking mail every {}s", interval.as_secs());

        while running.load(Ordering::SeqCst) {
            self.tick();

            // sleep in short slices so Ctrl-C takes effect promptly
            let mut remaining = interval;
            while running.load(Ordering::SeqCst) && remaining > Duration::ZERO {
                let step = remaining.min(Duration::from_millis(500));
                thread::sleep(step);
                remaining -= step;
            }
        }

        log::info!("shutting down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::{
        ClientCredentials, CredentialStore, CredentialsFile, Token,
    };
    use crate::auth::oauth;
    use crate::auth::prompt::NoPrompt;
    use crate::mail::api::{Label, MailMessage, MailboxApi, MessageRef};
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Calls {
        list_ids: Cell<u32>,
        get: Cell<u32>,
    }

    struct FakeApi {
        calls: Rc<Calls>,
        matches: u32,
    }

    impl MailboxApi for FakeApi {
        fn exchange_code(&self, _c: &ClientCredentials, _code: &str) -> Result<Token, MailError> {
            Err(MailError::GrantFailed("not under test".into()))
        }

        fn refresh_token(&self, _c: &ClientCredentials, _rt: &str) -> Result<Token, MailError> {
            Err(MailError::remote("not under test"))
        }

        fn list_labels(&self, _access_token: &str) -> Result<Vec<Label>, MailError> {
            Ok(vec![])
        }

        fn list_message_ids(
            &self,
            _access_token: &str,
            max_results: u32,
            _query: &str,
        ) -> Result<Vec<MessageRef>, MailError> {
            self.calls.list_ids.set(self.calls.list_ids.get() + 1);
            Ok((0..self.matches.min(max_results))
                .map(|i| MessageRef {
                    id: format!("m{i}"),
                    thread_id: None,
                })
                .collect())
        }

        fn get_message(&self, _access_token: &str, id: &str) -> Result<MailMessage, MailError> {
            self.calls.get.set(self.calls.get.get() + 1);
            serde_json::from_str(&format!(r#"{{"id": "{id}", "snippet": "hi"}}"#))
                .map_err(MailError::remote)
        }
    }

    fn write_fixture(dir: &Path, with_token: bool) {
        let file = CredentialsFile {
            installed: ClientCredentials {
                client_id: "app.example".into(),
                client_secret: "s3cret".into(),
                redirect_uris: vec![],
            },
        };
        std::fs::write(
            dir.join("credentials.json"),
            serde_json::to_string(&file).unwrap(),
        )
        .unwrap();

        if with_token {
            let store =
                CredentialStore::new(dir.join("credentials.json"), dir.join("token.json"));
            store
                .save_token(&Token {
                    access_token: "tok".into(),
                    refresh_token: None,
                    expires_at_epoch: oauth::now_epoch() + 3600,
                })
                .unwrap();
        }
    }

    fn checker_in(dir: &Path, matches: u32) -> (PollChecker, Rc<Calls>) {
        let calls = Rc::new(Calls::default());
        let api = FakeApi {
            calls: calls.clone(),
            matches,
        };
        let store = CredentialStore::new(dir.join("credentials.json"), dir.join("token.json"));
        let session = MailSession::new(store, Box::new(api), Box::new(NoPrompt));
        (PollChecker::new(session, "from:example.com", 10), calls)
    }

    #[test]
    fn tick_fetches_each_matched_message_once() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), true);
        let (mut checker, calls) = checker_in(dir.path(), 3);

        checker.tick();

        assert_eq!(calls.list_ids.get(), 1);
        assert_eq!(calls.get.get(), 3);
    }

    #[test]
    fn tick_with_no_matches_ends_cleanly() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), true);
        let (mut checker, calls) = checker_in(dir.path(), 0);

        // NotFound is logged at error level and absorbed
        checker.tick();

        assert_eq!(calls.list_ids.get(), 1);
        assert_eq!(calls.get.get(), 0);
        assert!(checker.session.is_authenticated());
    }

    #[test]
    fn tick_absorbs_credential_failures() {
        let dir = tempdir().unwrap();
        // no credentials file at all
        let (mut checker, calls) = checker_in(dir.path(), 3);

        checker.tick();

        assert!(!checker.session.is_authenticated());
        assert_eq!(calls.list_ids.get(), 0);
    }

    #[test]
    fn tick_absorbs_missing_authorization_in_non_interactive_mode() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), false);
        let (mut checker, calls) = checker_in(dir.path(), 3);

        // NoPrompt turns the grant into NeedsAuthorization; the tick survives
        checker.tick();

        assert!(!checker.session.is_authenticated());
        assert_eq!(calls.list_ids.get(), 0);
    }

    #[test]
    fn authenticated_session_is_reused_across_ticks() {
        let dir = tempdir().unwrap();
        write_fixture(dir.path(), true);
        let (mut checker, calls) = checker_in(dir.path(), 1);

        checker.tick();
        checker.tick();

        assert_eq!(calls.list_ids.get(), 2);
        assert_eq!(calls.get.get(), 2);
    }
}
