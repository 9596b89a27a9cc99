//! Public form endpoints. Never authenticated.

use crate::ApiClient;
use ctrls_core::{
    interpret_submission_response, interpret_template_response, SubmissionError, TemplateError,
};
use ctrls_forms::{FormTemplate, SubmissionPayload, SubmissionReceipt};
use ctrls_types::PublicId;

fn template_path(public_id: &PublicId) -> String {
    format!("/api/public/forms/{public_id}")
}

fn submit_path(public_id: &PublicId) -> String {
    format!("/api/public/forms/{public_id}/submit")
}

impl ApiClient {
    /// Fetch the public view of a form template.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::NotFound`] for an unknown identifier
    /// - [`TemplateError::Unavailable`] for network failures and unexpected statuses
    /// - [`TemplateError::Malformed`] when a 2xx body is not a template
    pub async fn load_template(&self, public_id: &PublicId) -> Result<FormTemplate, TemplateError> {
        tracing::info!(%public_id, "loading form template");
        let resp = self
            .public_get(&template_path(public_id))
            .send()
            .await
            .map_err(|e| TemplateError::Unavailable(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| TemplateError::Unavailable(e.to_string()))?;
        interpret_template_response(status, &body)
    }

    /// Send one submission attempt.
    ///
    /// Transport failures (connection refused, timeout, truncated body) become
    /// [`SubmissionError::Unknown`].
    pub async fn submit(
        &self,
        public_id: &PublicId,
        payload: &SubmissionPayload,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        tracing::info!(%public_id, "submitting form");
        tracing::debug!(
            answers_bytes = payload.answers_json().len(),
            "submission payload built"
        );
        let resp = self
            .public_post(&submit_path(public_id))
            .json(payload)
            .send()
            .await
            .map_err(|e| SubmissionError::Unknown(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| SubmissionError::Unknown(e.to_string()))?;
        interpret_submission_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{client, serve, TEMPLATE_JSON};
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use ctrls_core::{AuthState, SubmissionError, TemplateError};
    use ctrls_forms::{PatientWire, SubmissionPayload, SubmissionStatus};
    use ctrls_types::PublicId;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn payload() -> SubmissionPayload {
        let patient = PatientWire {
            name: "Maria".into(),
            cpf: "12345678901".into(),
            sexo: "F".into(),
            nascimento: "04/11/2025".into(),
            email: None,
            celular: None,
        };
        let answers = BTreeMap::from([("q1".to_string(), "dor".to_string())]);
        SubmissionPayload::new(patient, &answers).expect("payload")
    }

    fn id(s: &str) -> PublicId {
        PublicId::parse(s).expect("public id")
    }

    #[tokio::test]
    async fn template_is_fetched_without_auth_headers() {
        let seen = Arc::new(Mutex::new(None::<HeaderMap>));
        let recorder = seen.clone();
        let router = Router::new().route(
            "/api/public/forms/:id",
            get(move |Path(id): Path<String>, headers: HeaderMap| {
                let recorder = recorder.clone();
                async move {
                    assert_eq!(id, "form-1");
                    *recorder.lock().expect("lock") = Some(headers);
                    (
                        [("content-type", "application/json")],
                        TEMPLATE_JSON.to_string(),
                    )
                }
            }),
        );
        let base = serve(router).await;
        let dir = TempDir::new().expect("tempdir");
        let api = client(&base, &dir);
        api.auth_store()
            .save(&AuthState::new("tok", "clinic-1").expect("state"))
            .expect("save");

        let template = api.load_template(&id("form-1")).await.expect("template");
        assert_eq!(template.title, "Anamnese");
        assert_eq!(template.fields().expect("fields")[0].id, "q1");

        let headers = seen.lock().expect("lock").take().expect("request seen");
        assert!(headers.get("authorization").is_none());
        assert!(headers.get("x-clinic-id").is_none());
    }

    #[tokio::test]
    async fn unknown_template_is_not_found() {
        let router = Router::new()
            .route(
                "/api/public/forms/missing",
                get(|| async { StatusCode::NOT_FOUND }),
            )
            .route(
                "/api/public/forms/bad-request",
                get(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"detail": "Formulário não encontrado"})),
                    )
                }),
            )
            .route(
                "/api/public/forms/down",
                get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
            );
        let base = serve(router).await;
        let dir = TempDir::new().expect("tempdir");
        let api = client(&base, &dir);

        let err = api.load_template(&id("missing")).await.expect_err("404");
        assert!(matches!(err, TemplateError::NotFound));
        let err = api.load_template(&id("bad-request")).await.expect_err("400");
        assert!(matches!(err, TemplateError::NotFound));
        let err = api.load_template(&id("down")).await.expect_err("503");
        assert!(matches!(err, TemplateError::Unavailable(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn unreachable_backend_is_unavailable_or_unknown() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        let dir = TempDir::new().expect("tempdir");
        let api = client(&format!("http://{addr}"), &dir);

        let err = api.load_template(&id("form-1")).await.expect_err("refused");
        assert!(matches!(err, TemplateError::Unavailable(_)));
        let err = api.submit(&id("form-1"), &payload()).await.expect_err("refused");
        assert!(matches!(err, SubmissionError::Unknown(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn submission_sends_wire_payload_and_reads_receipt() {
        let seen = Arc::new(Mutex::new(None::<Value>));
        let recorder = seen.clone();
        let router = Router::new().route(
            "/api/public/forms/:id/submit",
            post(move |Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    *recorder.lock().expect("lock") = Some(body);
                    (
                        StatusCode::ACCEPTED,
                        Json(json!({
                            "submissionId": "123e4567-e89b-12d3-a456-426614174000",
                            "status": "PENDING"
                        })),
                    )
                }
            }),
        );
        let base = serve(router).await;
        let dir = TempDir::new().expect("tempdir");
        let api = client(&base, &dir);

        let receipt = api.submit(&id("form-1"), &payload()).await.expect("accepted");
        assert_eq!(receipt.status, Some(SubmissionStatus::Pending));

        let body = seen.lock().expect("lock").take().expect("request seen");
        assert_eq!(body["patient"]["nascimento"], "04/11/2025");
        assert_eq!(body["answersJson"], r#"{"q1":"dor"}"#);
        assert!(body["patient"].get("email").is_none());
    }

    #[tokio::test]
    async fn submission_failures_are_classified() {
        async fn field_errors() -> impl IntoResponse {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"errors": {"cpf": "CPF inválido", "name": "Nome obrigatório"}})),
            )
        }
        async fn detail() -> impl IntoResponse {
            (
                StatusCode::CONFLICT,
                Json(json!({"detail": "Clinic inactive"})),
            )
        }
        async fn broken() -> impl IntoResponse {
            (StatusCode::INTERNAL_SERVER_ERROR, "boom")
        }
        let router = Router::new()
            .route("/api/public/forms/fields/submit", post(field_errors))
            .route("/api/public/forms/detail/submit", post(detail))
            .route("/api/public/forms/broken/submit", post(broken));
        let base = serve(router).await;
        let dir = TempDir::new().expect("tempdir");
        let api = client(&base, &dir);

        match api.submit(&id("fields"), &payload()).await {
            Err(SubmissionError::FieldValidation(messages)) => {
                assert!(messages.contains(&"CPF inválido".to_string()));
                assert!(messages.contains(&"Nome obrigatório".to_string()));
            }
            other => panic!("expected FieldValidation, got {other:?}"),
        }
        assert_eq!(
            api.submit(&id("detail"), &payload()).await,
            Err(SubmissionError::Detail("Clinic inactive".into()))
        );
        assert!(matches!(
            api.submit(&id("broken"), &payload()).await,
            Err(SubmissionError::Unknown(_))
        ));
    }
}
