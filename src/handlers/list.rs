use crate::envelope::Envelope;
use crate::models::ScanOutput;
use crate::routes;
use crate::state::AppState;
use axum::extract::State;

/// GET /records handler - List every record in the collection
///
/// Performs a single full scan of the records table. Records come back in
/// whatever order the store yields them; no ordering is guaranteed. A store
/// response with no usable collection maps to 404, a failed scan to 400.
#[utoipa::path(
    get,
    path = routes::RECORDS,
    responses(
        (status = 200, description = "Serialized array of all records", body = String),
        (status = 404, description = "Store responded without a usable collection", body = Envelope),
        (status = 400, description = "Store scan failed", body = Envelope)
    ),
    tag = "records"
)]
pub async fn list_handler(State(state): State<AppState>) -> Envelope {
    match state.store.read_all(&state.config.table_name).await {
        Ok(ScanOutput {
            items: Some(records),
        }) => match serde_json::to_string(&records) {
            Ok(body) => {
                tracing::info!("Listed records: {}", body);
                Envelope::ok(body)
            }
            Err(e) => {
                tracing::error!("Failed to serialize records: {}", e);
                Envelope::bad_request(format!("Error to find records: {}", e))
            }
        },
        Ok(ScanOutput { items: None }) => {
            tracing::error!("Store responded without a usable record collection");
            Envelope::not_found("Records not found")
        }
        Err(e) => {
            tracing::error!("Failed to list records: {:#}", e);
            Envelope::bad_request(format!("Error to find records: {:#}", e))
        }
    }
}
