//! Blocking HTTP implementation of [`MailboxApi`] against the Gmail REST API.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::auth::credentials::{ClientCredentials, Token};
use crate::auth::oauth;
use crate::error::MailError;
use crate::mail::api::{
    Label, ListLabelsResponse, ListMessagesResponse, MailMessage, MailboxApi, MessageRef,
};

const BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Gmail caps maxResults for a list call; larger values are rejected.
const MAX_RESULTS_CEILING: u32 = 500;

pub struct GmailApi {
    http: Client,
}

impl GmailApi {
    pub fn new() -> Result<Self, MailError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(MailError::remote)?;
        Ok(Self { http })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, access_token: &str) -> Result<T, MailError> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .map_err(MailError::remote)?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MailError::NotFound("resource"));
        }
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(MailError::RemoteCallFailed(format!(
                "the API returned {status}: {body}"
            )));
        }
        resp.json::<T>().map_err(MailError::remote)
    }
}

impl MailboxApi for GmailApi {
    fn exchange_code(&self, creds: &ClientCredentials, code: &str) -> Result<Token, MailError> {
        oauth::exchange_code(creds, code).map_err(|e| MailError::GrantFailed(e.to_string()))
    }

    fn refresh_token(
        &self,
        creds: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<Token, MailError> {
        oauth::refresh_access_token(creds, refresh_token).map_err(MailError::remote)
    }

    fn list_labels(&self, access_token: &str) -> Result<Vec<Label>, MailError> {
        let url = format!("{BASE_URL}/users/me/labels");
        let resp: ListLabelsResponse = self.get_json(&url, access_token)?;
        Ok(resp.labels.unwrap_or_default())
    }

    fn list_message_ids(
        &self,
        access_token: &str,
        max_results: u32,
        query: &str,
    ) -> Result<Vec<MessageRef>, MailError> {
        let url = format!(
            "{BASE_URL}/users/me/messages?maxResults={}&q={}",
            max_results.min(MAX_RESULTS_CEILING),
            urlencode(query),
        );
        let resp: ListMessagesResponse = self.get_json(&url, access_token)?;
        Ok(resp.messages.unwrap_or_default())
    }

    fn get_message(&self, access_token: &str, id: &str) -> Result<MailMessage, MailError> {
        let url = format!("{BASE_URL}/users/me/messages/{id}?format=full");
        self.get_json(&url, access_token)
            .map_err(|e| match e {
                MailError::NotFound(_) => MailError::NotFound("message"),
                other => other,
            })
    }
}

fn urlencode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
