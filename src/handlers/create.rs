use crate::envelope::Envelope;
use crate::models::{CreateRequest, Record};
use crate::routes;
use crate::state::AppState;
use axum::extract::State;
use uuid::Uuid;

/// POST /records handler - Create one record
///
/// The request body must be a JSON object with a `name` string; nothing
/// else is read from it. A fresh time-ordered UUID becomes the record id,
/// so the insert cannot collide and overwrite-if-present semantics are
/// safe. On success the response echoes the caller's payload verbatim;
/// the generated id is not returned. Parse and write failures both map
/// to a 422 envelope carrying the original payload.
#[utoipa::path(
    post,
    path = routes::RECORDS,
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Record created; body echoes the input payload", body = String),
        (status = 422, description = "Payload parse failure or store write failure", body = Envelope)
    ),
    tag = "records"
)]
pub async fn create_handler(State(state): State<AppState>, payload: String) -> Envelope {
    let request: CreateRequest = match serde_json::from_str(&payload) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("Failed to parse create payload: {}", e);
            return Envelope::unprocessable(format!("Error to create record: {}", e), payload);
        }
    };

    let record = Record {
        id: Uuid::now_v7().to_string(),
        name: request.name,
    };

    match state
        .store
        .write_one(&state.config.table_name, record.clone())
        .await
    {
        Ok(()) => {
            tracing::info!("Created record: {}", payload);
            Envelope::created(payload)
        }
        Err(e) => {
            let params = serde_json::json!({
                "TableName": state.config.table_name,
                "Item": record,
            });
            tracing::error!("Failed to create record: {:#}", e);
            Envelope::unprocessable(
                format!("Error to create record: {:#} params={}", e, params),
                payload,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::test_support::{FailingStore, MemoryStore};
    use crate::store::Store;
    use axum::http::StatusCode;
    use axum::{body::Body, http::Request, routing::post, Router};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app(store: Arc<dyn Store>) -> Router {
        let config = Config {
            spanner_emulator_host: None,
            spanner_project: "test-project".to_string(),
            spanner_instance: "test-instance".to_string(),
            spanner_database: "test-database".to_string(),
            table_name: "records".to_string(),
            service_port: 3000,
            service_host: "0.0.0.0".to_string(),
        };

        let state = AppState {
            store,
            config: Arc::new(config),
        };

        Router::new()
            .route(routes::RECORDS, post(create_handler))
            .with_state(state)
    }

    async fn post_record(app: Router, payload: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/records")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_create_echoes_input_payload() {
        let store = Arc::new(MemoryStore::default());
        let payload = r#"{"name":"Inception"}"#;

        let (status, body) = post_record(test_app(store.clone()), payload).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, payload, "201 body must be the literal input payload");

        let records = store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Inception");
        assert!(!records[0].id.is_empty(), "id must be assigned at creation");
    }

    #[tokio::test]
    async fn test_generated_ids_are_unique() {
        let store = Arc::new(MemoryStore::default());
        let app = test_app(store.clone());

        for name in ["one", "two", "three"] {
            let payload = format!(r#"{{"name":"{}"}}"#, name);
            let (status, _) = post_record(app.clone(), &payload).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let records = store.records();
        assert_eq!(records.len(), 3);
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                assert_ne!(a.id, b.id, "every create must generate a distinct id");
            }
        }
    }

    #[tokio::test]
    async fn test_extra_payload_fields_are_ignored() {
        let store = Arc::new(MemoryStore::default());
        let payload = r#"{"name":"Inception","year":2010}"#;

        let (status, body) = post_record(test_app(store.clone()), payload).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, payload);
        assert_eq!(store.records()[0].name, "Inception");
    }

    #[tokio::test]
    async fn test_malformed_payload_writes_nothing() {
        let store = Arc::new(MemoryStore::default());

        let (status, body) = post_record(test_app(store.clone()), "not-json").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let envelope: Envelope = serde_json::from_str(&body).unwrap();
        assert_eq!(envelope.status_code, 422);
        assert_eq!(envelope.error_title.as_deref(), Some("Unprocessable Entity"));
        assert_eq!(
            envelope.body.as_deref(),
            Some("not-json"),
            "422 envelope must carry the original payload"
        );
        assert!(!envelope.error_detail.unwrap().is_empty());
        assert!(store.records().is_empty(), "no record may be written");
    }

    #[tokio::test]
    async fn test_missing_name_is_unprocessable() {
        let store = Arc::new(MemoryStore::default());

        let (status, _) = post_record(test_app(store.clone()), r#"{"title":"x"}"#).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_surfaces_store_error_and_params() {
        let payload = r#"{"name":"Inception"}"#;

        let (status, body) = post_record(test_app(Arc::new(FailingStore)), payload).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let envelope: Envelope = serde_json::from_str(&body).unwrap();
        let detail = envelope.error_detail.unwrap();
        assert!(detail.contains("ConnectionError"), "detail: {}", detail);
        assert!(detail.contains("records"), "detail should name the table: {}", detail);
        assert_eq!(envelope.body.as_deref(), Some(payload));
    }
}
