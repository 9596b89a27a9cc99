//! Shared HTTP plumbing.
//!
//! Public endpoints are sent bare. Protected endpoints carry the stored bearer token and the
//! clinic header; a `401` on a protected call clears the stored credentials.

use crate::{ClientError, ClientResult};
use ctrls_core::{AuthState, AuthStore, ClientConfig, CLINIC_ID_HEADER};
use ctrls_forms::ProblemDetailWire;
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    auth: AuthStore,
}

impl ApiClient {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the TLS backend cannot be initialised.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let auth = AuthStore::new(config.auth_file());
        Ok(Self { http, config, auth })
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Store for the staff credentials, rooted at [`ClientConfig::auth_file`].
    pub fn auth_store(&self) -> &AuthStore {
        &self.auth
    }

    pub(crate) fn public_get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.config.endpoint(path))
    }

    pub(crate) fn public_post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.config.endpoint(path))
    }

    /// Attach the stored credentials to a request.
    fn authorize(&self, req: RequestBuilder, auth: &AuthState) -> RequestBuilder {
        req.header(AUTHORIZATION, format!("Bearer {}", auth.token))
            .header(CLINIC_ID_HEADER, auth.clinic_id.as_str())
    }

    /// `GET` a protected endpoint and decode its JSON body.
    pub(crate) async fn protected_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let auth = self.auth.load()?.ok_or(ClientError::NotAuthenticated)?;
        let req = self.authorize(self.http.get(self.config.endpoint(path)), &auth);
        let resp = req.query(query).send().await?;

        let status = resp.status();
        let body = resp.bytes().await?;
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "token rejected, clearing stored credentials");
            self.auth.clear()?;
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Error for a non-2xx response outside the public form flow.
pub(crate) fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    let message = serde_json::from_slice::<ProblemDetailWire>(body)
        .ok()
        .and_then(|p| p.detail.or(p.title))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}
