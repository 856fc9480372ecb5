use serde::{Deserialize, Serialize};

/// A stored record. The id is assigned once at creation and never changes;
/// there is no update or delete operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Record {
    pub id: String,
    pub name: String,
}

/// Request body for record creation. Extra fields are ignored.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateRequest {
    pub name: String,
}

/// Response type for the health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// Result of a full-collection read.
///
/// `items: None` means the backend responded without a usable collection,
/// which is distinct from `Some(vec![])` (an empty collection).
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub items: Option<Vec<Record>>,
}
