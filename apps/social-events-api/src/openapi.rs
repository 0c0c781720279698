//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Social Events API",
        version = "0.1.0",
        description = "List, search and manage social events; writes require a bearer token",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    nest(
        (path = "/api", api = domain_events::ApiDoc)
    ),
    tags(
        (name = "events", description = "Social events: upcoming listings and creator-owned CRUD")
    )
)]
pub struct ApiDoc;
