//! OpenAPI documentation for the HTTP surface.
//!
//! Only request/response endpoints appear here. The `/ws` upgrade and its
//! event protocol are not expressible in OpenAPI and are documented on the
//! `inbound::ws` module instead. Swagger UI serves this document in debug
//! builds.

use utoipa::OpenApi;

use crate::domain::ProductRecord;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Showroom API",
        description = "Health checks and the synthetic product listing.",
        license(
            name = "ISC",
            url = "https://opensource.org/license/isc-license-txt"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::products_test::list_test_products,
    ),
    components(schemas(ProductRecord)),
    tags(
        (name = "health", description = "Endpoints for health checks"),
        (name = "products", description = "Product catalogue listings")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    #[rstest]
    #[case("/health/ready")]
    #[case("/health/live")]
    #[case("/api/productos-test")]
    fn documents_http_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn websocket_endpoint_is_not_documented() {
        assert!(!ApiDoc::openapi().paths.paths.contains_key("/ws"));
    }

    #[rstest]
    fn product_schema_lists_wire_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let RefOr::T(Schema::Object(product)) = schemas.get("ProductRecord").expect("schema")
        else {
            panic!("expected object schema");
        };
        for field in ["id", "title", "price", "thumbnail"] {
            assert!(
                product.properties.contains_key(field),
                "schema should have field '{field}'"
            );
        }
    }
}
