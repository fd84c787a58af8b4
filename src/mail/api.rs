//! Gmail API wire types and the remote calling contract.

use serde::Deserialize;

use crate::auth::credentials::{ClientCredentials, Token};
use crate::domain::email::MessageSummary;
use crate::error::MailError;

/// Response from listing labels
#[derive(Debug, Deserialize)]
pub struct ListLabelsResponse {
    pub labels: Option<Vec<Label>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
}

/// Response from listing messages
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesResponse {
    pub messages: Option<Vec<MessageRef>>,
    pub next_page_token: Option<String>,
    pub result_size_estimate: Option<u32>,
}

/// Reference to a message (just ID and thread ID); owns no content.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    pub thread_id: Option<String>,
}

/// Full message from the get-by-id call
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    pub id: String,
    pub thread_id: Option<String>,
    pub label_ids: Option<Vec<String>>,
    pub snippet: Option<String>,
    /// Epoch milliseconds, as a string on the wire.
    pub internal_date: Option<String>,
    pub payload: Option<MessagePayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub mime_type: Option<String>,
    pub headers: Option<Vec<Header>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl MailMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .as_ref()?
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn summary(&self) -> MessageSummary {
        MessageSummary {
            id: self.id.clone(),
            from: self.header("From").unwrap_or("(unknown)").to_string(),
            subject: self.header("Subject").unwrap_or("(no subject)").to_string(),
            snippet: self.snippet.clone().unwrap_or_default(),
            date_epoch: self
                .internal_date
                .as_deref()
                .and_then(|ms| ms.parse::<i64>().ok())
                .map(|ms| ms / 1000)
                .unwrap_or(0),
        }
    }
}

/// The remote calling contract: token endpoints plus the three mailbox
/// queries. `MailSession` talks to the provider only through this trait, so
/// tests can count calls without a network.
pub trait MailboxApi {
    fn exchange_code(&self, creds: &ClientCredentials, code: &str) -> Result<Token, MailError>;

    fn refresh_token(
        &self,
        creds: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<Token, MailError>;

    fn list_labels(&self, access_token: &str) -> Result<Vec<Label>, MailError>;

    fn list_message_ids(
        &self,
        access_token: &str,
        max_results: u32,
        query: &str,
    ) -> Result<Vec<MessageRef>, MailError>;

    fn get_message(&self, access_token: &str, id: &str) -> Result<MailMessage, MailError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_pulls_headers_and_converts_internal_date() {
        let msg: MailMessage = serde_json::from_str(
            r#"{
                "id": "m1",
                "threadId": "t1",
                "snippet": "Hello there",
                "internalDate": "1700000000000",
                "payload": {
                    "mimeType": "text/plain",
                    "headers": [
                        {"name": "from", "value": "Alice <alice@example.com>"},
                        {"name": "Subject", "value": "Greetings"}
                    ]
                }
            }"#,
        )
        .unwrap();

        let s = msg.summary();
        assert_eq!(s.id, "m1");
        assert_eq!(s.from, "Alice <alice@example.com>");
        assert_eq!(s.subject, "Greetings");
        assert_eq!(s.snippet, "Hello there");
        assert_eq!(s.date_epoch, 1_700_000_000);
    }

    #[test]
    fn summary_defaults_for_missing_payload() {
        let msg: MailMessage = serde_json::from_str(r#"{"id": "m2"}"#).unwrap();
        let s = msg.summary();
        assert_eq!(s.from, "(unknown)");
        assert_eq!(s.subject, "(no subject)");
        assert_eq!(s.snippet, "");
        assert_eq!(s.date_epoch, 0);
    }

    #[test]
    fn list_response_with_no_matches_deserializes_to_none() {
        let resp: ListMessagesResponse =
            serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(resp.messages.is_none());
    }
}
