use anyhow::{Result, anyhow};
use oauth2::TokenResponse;
use oauth2::basic::BasicClient;
use oauth2::reqwest::http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, RefreshToken,
    Scope, TokenUrl,
};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

use crate::auth::credentials::{ClientCredentials, Token};

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Narrowest scope that still lets us list and read messages.
pub const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Manual copy/paste flow: the provider displays the grant code to the user.
const OOB_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Build the oauth2 client for these app credentials. Uses the first
/// configured redirect URI, falling back to the out-of-band flow.
pub fn oauth_client(creds: &ClientCredentials) -> Result<BasicClient> {
    let redirect = creds
        .redirect_uris
        .first()
        .map(String::as_str)
        .unwrap_or(OOB_REDIRECT);

    Ok(BasicClient::new(
        ClientId::new(creds.client_id.clone()),
        Some(ClientSecret::new(creds.client_secret.clone())),
        AuthUrl::new(AUTH_URL.to_string())?,
        Some(TokenUrl::new(TOKEN_URL.to_string())?),
    )
    .set_redirect_uri(RedirectUrl::new(redirect.to_string())?))
}

/// Authorization URL requesting offline access and the read-only scope.
pub fn authorize_url(creds: &ClientCredentials) -> Result<Url> {
    let client = oauth_client(creds)?;
    let (url, _csrf_token) = client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new(READONLY_SCOPE.to_string()))
        .add_extra_param("access_type", "offline")
        .url();
    Ok(url)
}

/// Exchange an interactive grant code for tokens.
pub fn exchange_code(creds: &ClientCredentials, code: &str) -> Result<Token> {
    let client = oauth_client(creds)?;
    let resp = client
        .exchange_code(AuthorizationCode::new(code.to_string()))
        .request(http_client)
        .map_err(|e| anyhow!("token exchange failed: {e}"))?;
    Ok(token_from_response(&resp, None))
}

/// Exchange a refresh token for a new access token. Providers usually omit
/// the refresh token in this response, so the old one is carried over.
pub fn refresh_access_token(creds: &ClientCredentials, refresh_token: &str) -> Result<Token> {
    let client = oauth_client(creds)?;
    let rt = RefreshToken::new(refresh_token.to_string());
    let resp = client
        .exchange_refresh_token(&rt)
        .request(http_client)
        .map_err(|e| anyhow!("token refresh failed: {e}"))?;
    Ok(token_from_response(&resp, Some(refresh_token)))
}

pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn token_from_response(
    resp: &oauth2::basic::BasicTokenResponse,
    prior_refresh: Option<&str>,
) -> Token {
    let now = now_epoch();
    Token {
        access_token: resp.access_token().secret().to_string(),
        refresh_token: resp
            .refresh_token()
            .map(|r| r.secret().to_string())
            .or_else(|| prior_refresh.map(str::to_string)),
        expires_at_epoch: resp
            .expires_in()
            .map(|d| now + d.as_secs() as i64)
            .unwrap_or(now + 3500),
    }
}
