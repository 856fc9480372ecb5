use utoipa::OpenApi;

use crate::envelope::Envelope;
use crate::handlers;
use crate::models::{CreateRequest, HealthResponse, Record, UnhealthyResponse};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "spanner-records API",
        version = "1.0.0",
        description = "A minimal record facade (list all, create one) backed by Google Cloud Spanner"
    ),
    paths(
        handlers::health::health_handler,
        handlers::list::list_handler,
        handlers::create::create_handler
    ),
    components(
        schemas(
            Record,
            CreateRequest,
            Envelope,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "health", description = "Health check operations"),
        (name = "records", description = "Record collection operations")
    )
)]
pub struct ApiDoc;
