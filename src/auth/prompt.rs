use std::io::{BufRead, Write};
use url::Url;

use crate::error::MailError;

/// The interactive channel used during the grant: show the authorization URL,
/// get one line (the grant code) back from the operator.
pub trait AuthPrompt {
    fn prompt_code(&self, auth_url: &Url) -> Result<String, MailError>;
}

/// Prompts on stdout/stdin. Opens the browser as a convenience; the printed
/// URL is the thing that matters.
pub struct StdioPrompt;

impl AuthPrompt for StdioPrompt {
    fn prompt_code(&self, auth_url: &Url) -> Result<String, MailError> {
        println!("Authorize this app by visiting this url:\n{auth_url}");
        if let Err(e) = open::that(auth_url.as_str()) {
            log::warn!("could not open browser automatically: {e}");
        }

        print!("Enter the code from that page here: ");
        std::io::stdout()
            .flush()
            .map_err(|e| MailError::GrantFailed(e.to_string()))?;

        let mut code = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut code)
            .map_err(|e| MailError::GrantFailed(format!("reading grant code: {e}")))?;

        let code = code.trim();
        if code.is_empty() {
            return Err(MailError::GrantFailed("empty grant code".into()));
        }
        Ok(code.to_string())
    }
}

/// Refuses to prompt. Used by non-interactive runs so a missing token fails
/// the tick with a distinguished error instead of blocking the poll loop on
/// stdin forever.
pub struct NoPrompt;

impl AuthPrompt for NoPrompt {
    fn prompt_code(&self, _auth_url: &Url) -> Result<String, MailError> {
        Err(MailError::NeedsAuthorization)
    }
}
