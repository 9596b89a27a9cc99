//! Clinic staff endpoints: login and the submissions dashboard listing.

use crate::api::api_error;
use crate::{ApiClient, ClientResult};
use ctrls_core::{AuthState, DEFAULT_PAGE_SIZE, DEFAULT_SUBMISSIONS_SORT};
use ctrls_forms::{Page, SubmissionSummary};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequestWire<'a> {
    email: &'a str,
    password: &'a str,
    clinic_id: &'a str,
}

#[derive(Deserialize)]
struct LoginResponseWire {
    token: String,
}

/// Paging and ordering for the submissions listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionsQuery {
    pub page: u32,
    pub size: u32,
    pub sort: String,
}

impl Default for SubmissionsQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SUBMISSIONS_SORT.to_string(),
        }
    }
}

impl SubmissionsQuery {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("sort", self.sort.clone()),
        ]
    }
}

impl ApiClient {
    /// Log in as clinic staff and persist the resulting credentials.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Api`] when the backend rejects the credentials, or a
    /// storage error if the credentials cannot be written.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        clinic_id: &str,
    ) -> ClientResult<AuthState> {
        let body = LoginRequestWire {
            email,
            password,
            clinic_id,
        };
        let resp = self.public_post("/api/auth/login").json(&body).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(api_error(status, &bytes));
        }

        let LoginResponseWire { token } = serde_json::from_slice(&bytes)?;
        let state = AuthState::new(token, clinic_id)?;
        self.auth_store().save(&state)?;
        tracing::info!(clinic_id, "logged in");
        Ok(state)
    }

    /// Forget the stored credentials.
    pub fn logout(&self) -> ClientResult<()> {
        self.auth_store().clear()?;
        Ok(())
    }

    /// One page of the clinic's submissions, newest first by default.
    pub async fn list_submissions(
        &self,
        query: &SubmissionsQuery,
    ) -> ClientResult<Page<SubmissionSummary>> {
        self.protected_get("/api/submissions", &query.to_pairs())
            .await
    }
}
