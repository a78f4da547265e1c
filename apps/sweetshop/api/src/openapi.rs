//! OpenAPI documentation configuration

use axum_helpers::ACCESS_TOKEN_COOKIE;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the bearer header and the `accessToken` cookie as equivalent schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                ACCESS_TOKEN_COOKIE,
                "Set by /api/auth/register and /api/auth/login",
            ))),
        );
    }
}

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Sweetshop API",
        version = "0.1.0",
        description = "Sweet shop inventory with token authentication",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/auth", api = domain_users::ApiDoc),
        (path = "/api/sweets", api = domain_sweets::ApiDoc)
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Sweets", description = "Sweet inventory, purchase and restock")
    )
)]
pub struct ApiDoc;
