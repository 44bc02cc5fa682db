//! OAuthFlow - installed-app OAuth2 flow against Google's endpoints
//!
//! Runs the interactive PKCE consent flow through a loopback redirect and
//! talks to the token endpoint for code exchange and refresh.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;
use crate::Result;
use crate::config::ClientSecrets;
use crate::error::Error;
use super::callback_server::CallbackListener;
use super::credentials::Credential;
use super::manager::Authorizer;
use super::pkce::ConsentChallenge;

/// Google OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
    /// Space separated
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'a str,
}

#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    code_verifier: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

/// Production [`Authorizer`]: browser consent plus token endpoint calls
#[derive(Clone)]
pub struct OAuthFlow {
    secrets: ClientSecrets,
    scopes: Vec<String>,
    http_client: Client,
}

impl OAuthFlow {
    pub fn new(secrets: ClientSecrets, scopes: Vec<String>) -> Self {
        Self {
            secrets,
            scopes,
            http_client: Client::new(),
        }
    }

    /// Build the URL the user visits to grant access
    pub fn build_auth_url(&self, challenge: &ConsentChallenge, redirect_uri: &str) -> Result<String> {
        let mut url = Url::parse(&self.secrets.auth_uri)
            .map_err(|e| Error::Auth(format!("Invalid auth URI {}: {}", self.secrets.auth_uri, e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.secrets.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("code_challenge", &challenge.challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("state", &challenge.state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");

        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str, code_verifier: &str, redirect_uri: &str) -> Result<Credential> {
        let request = TokenExchangeRequest {
            client_id: &self.secrets.client_id,
            client_secret: &self.secrets.client_secret,
            code,
            code_verifier,
            redirect_uri,
            grant_type: "authorization_code",
        };

        let response = self.token_request(&request, "Token exchange").await?;
        Ok(self.to_credential(response, None))
    }

    /// Trade a refresh token for a new access token
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Credential> {
        let request = RefreshRequest {
            client_id: &self.secrets.client_id,
            client_secret: &self.secrets.client_secret,
            refresh_token,
            grant_type: "refresh_token",
        };

        let response = self.token_request(&request, "Token refresh").await?;
        Ok(self.to_credential(response, Some(refresh_token)))
    }

    async fn token_request<T: Serialize>(&self, form: &T, what: &str) -> Result<TokenResponse> {
        let response = self.http_client
            .post(&self.secrets.token_uri)
            .form(form)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("{} request failed: {}", what, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("{} failed ({}): {}", what, status, error_text)));
        }

        response.json().await
            .map_err(|e| Error::Auth(format!("{} returned an unreadable response: {}", what, e)))
    }

    fn to_credential(&self, response: TokenResponse, previous_refresh: Option<&str>) -> Credential {
        // Google omits the refresh token on refresh responses; keep the old one
        let refresh = response.refresh_token
            .or_else(|| previous_refresh.map(str::to_string));

        let scopes = match response.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => self.scopes.clone(),
        };

        let mut credential = Credential::new(response.access_token, refresh, response.expires_in)
            .with_scopes(scopes);
        if let Some(token_type) = response.token_type {
            credential.token_type = token_type;
        }
        credential
    }
}

#[async_trait]
impl Authorizer for OAuthFlow {
    async fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let refresh_token = credential.refresh_token.as_deref()
            .ok_or_else(|| Error::Auth("Credential has no refresh token".to_string()))?;
        self.refresh_token(refresh_token).await
    }

    async fn consent(&self) -> Result<Credential> {
        let challenge = ConsentChallenge::generate();
        let listener = CallbackListener::bind().await?;
        let redirect_uri = listener.redirect_uri();
        let auth_url = self.build_auth_url(&challenge, &redirect_uri)?;

        // stdout carries the protocol stream, so the user sees stderr
        eprintln!("\nOpening browser for Google authorization...");
        eprintln!("If the browser doesn't open, visit this URL:\n{}\n", auth_url);

        if let Err(e) = open::that(&auth_url) {
            tracing::warn!("Failed to open browser: {}", e);
        }

        eprintln!("Waiting for authorization...");
        let code = listener.wait_for_code(&challenge.state).await?;
        tracing::info!("Authorization code received, exchanging for tokens");

        self.exchange_code(&code, &challenge.verifier, &redirect_uri).await
    }
}
