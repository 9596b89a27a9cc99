//! One patient's visit to a public form, from template fetch to submission.
//!
//! Network calls are the only suspension points. The page state lives behind an async mutex that
//! is never held across a request. Every pending request checks the session's
//! [`SessionScope`] before writing back, so a closed page is never mutated by late results.

use crate::{ApiClient, ClientError, ClientResult};
use ctrls_core::{FormPage, FormSession, PageState, SessionScope, ThemeContext};
use ctrls_forms::SubmissionReceipt;
use ctrls_types::PublicId;
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct PublicFormPage {
    api: ApiClient,
    page: Mutex<FormPage>,
    scope: SessionScope,
}

impl PublicFormPage {
    /// Creates a page in the `Loading` state with a fresh session scope.
    ///
    /// # Arguments
    ///
    /// * `api` - client used for both the template fetch and the submission.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            page: Mutex::new(FormPage::new()),
            scope: SessionScope::new(),
        }
    }

    /// Fetch `public_id` and settle the page into `Ready`, `NotFound` or `Unavailable`.
    ///
    /// Calling this again with another identifier replaces the displayed template and its theme.
    /// When loads overlap, the one started last decides the page; an earlier load that settles
    /// afterwards is dropped and returns `Ok(())` without touching the page.
    ///
    /// # Errors
    ///
    /// - [`ClientError::ReloadBlocked`] while a submission is in flight; nothing is fetched
    /// - [`ClientError::SessionClosed`] if the page was closed before the fetch settled
    ///
    /// Template failures are not errors here; they are reflected in [`PublicFormPage::state`].
    pub async fn load(&self, public_id: &PublicId) -> ClientResult<()> {
        self.ensure_open()?;
        let ticket = self.page.lock().await.start_loading()?;

        let result = self.api.load_template(public_id).await;

        let mut page = self.page.lock().await;
        if self.scope.is_cancelled() {
            tracing::debug!(%public_id, "discarding template for closed page");
            return Err(ClientError::SessionClosed);
        }
        if !page.on_template_loaded(ticket, result) {
            tracing::debug!(%public_id, "template fetch superseded by a later load");
        }
        Ok(())
    }

    /// Edit the form session while the page is `Ready`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::SessionClosed`] for a closed page, or
    /// [`ctrls_core::SubmitBlocked::NotReady`] when there is no editable form.
    pub async fn edit<R>(&self, f: impl FnOnce(&mut FormSession) -> R) -> ClientResult<R> {
        self.ensure_open()?;
        let mut page = self.page.lock().await;
        let session = page
            .session_mut()
            .ok_or(ctrls_core::SubmitBlocked::NotReady)?;
        Ok(f(session))
    }

    /// Validate and submit the current session.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Blocked`] when validation fails locally or another attempt is in flight;
    ///   no request is sent
    /// - [`ClientError::Submission`] when the backend or network rejects the attempt; the form
    ///   stays editable
    /// - [`ClientError::SessionClosed`] when the page was closed while the request was pending
    pub async fn submit(&self) -> ClientResult<SubmissionReceipt> {
        self.ensure_open()?;
        let (public_id, payload) = self.page.lock().await.begin_submit()?;

        let result = self.api.submit(&public_id, &payload).await;

        let mut page = self.page.lock().await;
        if self.scope.is_cancelled() {
            tracing::debug!(%public_id, "discarding submission result for closed page");
            return Err(ClientError::SessionClosed);
        }
        page.finish_submit(result.clone());
        Ok(result?)
    }

    /// Snapshot of the page state.
    pub async fn state(&self) -> PageState {
        self.page.lock().await.state().clone()
    }

    /// Snapshot of the theme variables for the displayed template.
    pub async fn theme(&self) -> ThemeContext {
        self.page.lock().await.theme().clone()
    }

    /// End the session. Pending requests finish but their results are dropped.
    pub fn close(&self) {
        self.scope.cancel();
    }

    /// True once [`PublicFormPage::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.scope.is_cancelled()
    }

    fn ensure_open(&self) -> ClientResult<()> {
        if self.scope.is_cancelled() {
            return Err(ClientError::SessionClosed);
        }
        Ok(())
    }
}

impl Drop for PublicFormPage {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client, serve, TEMPLATE_JSON};
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use ctrls_core::{PatientField, SubmitBlocked, SubmitFeedback};
    use ctrls_forms::to_display_color;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Backend {
        submits: Arc<AtomicUsize>,
    }

    fn json_response(body: &'static str) -> ([(&'static str, &'static str); 1], &'static str) {
        ([("content-type", "application/json")], body)
    }

    fn router(backend: Backend, submit_delay: Duration) -> Router {
        Router::new()
            .route(
                "/api/public/forms/form-1",
                get(|| async { json_response(TEMPLATE_JSON) }),
            )
            .route(
                "/api/public/forms/form-2",
                get(|| async {
                    json_response(
                        r##"{"id":"form-2","title":"Retorno","schemaJson":"[]",
                            "clinicBranding":{"name":"Outra","primaryColor":"#FF0000"}}"##,
                    )
                }),
            )
            .route(
                "/api/public/forms/broken-schema",
                get(|| async {
                    json_response(
                        r#"{"id":"broken-schema","title":"T","schemaJson":"{not a list",
                            "clinicBranding":{"name":"C"}}"#,
                    )
                }),
            )
            .route(
                "/api/public/forms/missing",
                get(|| async { StatusCode::NOT_FOUND }),
            )
            .route(
                "/api/public/forms/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    json_response(TEMPLATE_JSON)
                }),
            )
            .route(
                "/api/public/forms/:id/submit",
                post(move |State(backend): State<Backend>| async move {
                    backend.submits.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(submit_delay).await;
                    (
                        StatusCode::ACCEPTED,
                        Json(json!({"submissionId": null, "status": "PENDING"})),
                    )
                }),
            )
            .with_state(backend)
    }

    async fn page_with(backend: Backend, delay: Duration, dir: &TempDir) -> PublicFormPage {
        let base = serve(router(backend, delay)).await;
        PublicFormPage::new(client(&base, dir))
    }

    fn fill(session: &mut FormSession) {
        session
            .update_patient_field(PatientField::Name, "Maria")
            .expect("name");
        session
            .update_patient_field(PatientField::Cpf, "12345678901")
            .expect("cpf");
        session
            .update_patient_field(PatientField::BirthDate, "1990-01-31")
            .expect("birth date");
        session.update_answer("q1", "dor de cabeça");
    }

    fn id(s: &str) -> PublicId {
        PublicId::parse(s).expect("public id")
    }

    #[tokio::test]
    async fn ready_page_already_carries_clinic_theme() {
        let dir = TempDir::new().expect("tempdir");
        let page = page_with(Backend::default(), Duration::ZERO, &dir).await;
        page.load(&id("form-1")).await.expect("load");

        assert!(matches!(page.state().await, PageState::Ready(_)));
        let expected = to_display_color("#007bff").expect("color").to_string();
        assert_eq!(page.theme().await.primary(), Some(expected.as_str()));

        page.load(&id("form-2")).await.expect("reload");
        assert_eq!(page.theme().await.primary(), Some("0 100% 50%"));
    }

    #[tokio::test]
    async fn missing_and_malformed_templates() {
        let dir = TempDir::new().expect("tempdir");
        let page = page_with(Backend::default(), Duration::ZERO, &dir).await;

        page.load(&id("missing")).await.expect("load");
        assert!(matches!(page.state().await, PageState::NotFound));

        page.load(&id("broken-schema")).await.expect("load");
        assert!(matches!(page.state().await, PageState::Unavailable { .. }));
        let err = page.edit(|_| ()).await.expect_err("nothing to edit");
        assert!(matches!(err, ClientError::Blocked(SubmitBlocked::NotReady)));
    }

    #[tokio::test]
    async fn blank_patient_is_rejected_without_request() {
        let backend = Backend::default();
        let dir = TempDir::new().expect("tempdir");
        let page = page_with(backend.clone(), Duration::ZERO, &dir).await;
        page.load(&id("form-1")).await.expect("load");

        let err = page.submit().await.expect_err("blank patient");
        assert!(matches!(err, ClientError::Blocked(SubmitBlocked::Invalid(_))));
        assert_eq!(backend.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submit_reaches_submitted_state() {
        let backend = Backend::default();
        let dir = TempDir::new().expect("tempdir");
        let page = page_with(backend.clone(), Duration::ZERO, &dir).await;
        page.load(&id("form-1")).await.expect("load");
        page.edit(fill).await.expect("edit");

        page.submit().await.expect("submitted");
        assert!(matches!(page.state().await, PageState::Submitted { .. }));
        assert_eq!(backend.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_submit_is_rejected_without_request() {
        let backend = Backend::default();
        let dir = TempDir::new().expect("tempdir");
        let page = page_with(backend.clone(), Duration::from_millis(200), &dir).await;
        page.load(&id("form-1")).await.expect("load");
        page.edit(fill).await.expect("edit");

        let (first, second) = tokio::join!(page.submit(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            page.submit().await
        });
        first.expect("first attempt");
        let err = second.expect_err("second attempt");
        assert!(matches!(err, ClientError::Blocked(SubmitBlocked::InFlight)));
        assert_eq!(backend.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closing_discards_pending_result() {
        let backend = Backend::default();
        let dir = TempDir::new().expect("tempdir");
        let page = Arc::new(page_with(backend.clone(), Duration::from_millis(200), &dir).await);
        page.load(&id("form-1")).await.expect("load");
        page.edit(fill).await.expect("edit");

        let pending = tokio::spawn({
            let page = page.clone();
            async move { page.submit().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        page.close();

        let err = pending.await.expect("join").expect_err("closed");
        assert!(matches!(err, ClientError::SessionClosed));
        match page.state().await {
            PageState::Ready(form) => {
                assert!(form.is_submitting());
                assert!(form.feedback.is_none());
            }
            other => panic!("closed page must not move on, got {other:?}"),
        }
        assert!(matches!(
            page.load(&id("form-1")).await,
            Err(ClientError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn latest_load_wins_over_slower_earlier_load() {
        let dir = TempDir::new().expect("tempdir");
        let page = page_with(Backend::default(), Duration::ZERO, &dir).await;

        let slow_id = id("slow");
        let (slow, fast) = tokio::join!(page.load(&slow_id), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            page.load(&id("form-2")).await
        });
        slow.expect("superseded load");
        fast.expect("latest load");

        match page.state().await {
            PageState::Ready(form) => assert_eq!(form.template.public_id.as_str(), "form-2"),
            other => panic!("expected Ready, got {other:?}"),
        }
        assert_eq!(page.theme().await.primary(), Some("0 100% 50%"));
    }

    #[tokio::test]
    async fn reload_during_submit_is_refused() {
        let backend = Backend::default();
        let dir = TempDir::new().expect("tempdir");
        let page = Arc::new(page_with(backend.clone(), Duration::from_millis(300), &dir).await);
        page.load(&id("form-1")).await.expect("load");
        page.edit(fill).await.expect("edit");

        let pending = tokio::spawn({
            let page = page.clone();
            async move { page.submit().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let err = page.load(&id("form-1")).await.expect_err("reload while submitting");
        assert!(matches!(err, ClientError::ReloadBlocked(_)));
        let err = page.submit().await.expect_err("second attempt");
        assert!(matches!(err, ClientError::Blocked(SubmitBlocked::InFlight)));

        pending.await.expect("join").expect("first attempt");
        assert!(matches!(page.state().await, PageState::Submitted { .. }));
        assert_eq!(backend.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn remote_rejection_is_left_as_feedback() {
        let router = Router::new()
            .route(
                "/api/public/forms/form-1",
                get(|| async { json_response(TEMPLATE_JSON) }),
            )
            .route(
                "/api/public/forms/form-1/submit",
                post(|| async {
                    (
                        StatusCode::CONFLICT,
                        Json(json!({"detail": "Clinic inactive"})),
                    )
                }),
            );
        let base = serve(router).await;
        let dir = TempDir::new().expect("tempdir");
        let page = PublicFormPage::new(client(&base, &dir));
        page.load(&id("form-1")).await.expect("load");
        page.edit(fill).await.expect("edit");

        let err = page.submit().await.expect_err("rejected");
        assert!(matches!(err, ClientError::Submission(_)));
        match page.state().await {
            PageState::Ready(form) => {
                let feedback = form.feedback.expect("feedback");
                assert!(matches!(feedback, SubmitFeedback::Remote(_)));
                assert_eq!(feedback.user_message(), "Clinic inactive");
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }
}
