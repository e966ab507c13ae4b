//! OpenAPI documentation configuration.
//!
//! Defines the OpenAPI spec for the service. The generated document is
//! served as JSON at `/api-docs/openapi.json` and rendered with RapiDoc at
//! `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// Security scheme for the API (session cookie).
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "SessionCookie".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "verdant_session",
                    "JWT session cookie set by the login and registration endpoints.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Verdant API",
        description = "Plant care tracking: plants and their watering schedules, \
                       nearby nursery lookup, and image uploads."
    ),
    modifiers(&SessionCookieAddon),
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::plants::create_plant,
        api::handlers::plants::list_plants,
        api::handlers::plants::get_plant,
        api::handlers::plants::update_plant,
        api::handlers::plants::delete_plant,
        api::handlers::plants::list_user_plants,
        api::handlers::nurseries::nearby_nurseries,
        api::handlers::images::upload_image,
    ),
    components(schemas(
        api::models::auth::RegisterRequest,
        api::models::auth::LoginRequest,
        api::models::auth::AuthResponse,
        api::models::auth::AuthSuccessResponse,
        api::models::users::UserResponse,
        api::models::plants::PlantCreate,
        api::models::plants::PlantUpdate,
        api::models::plants::PlantResponse,
        api::models::nurseries::NurseryResponse,
        api::models::images::ImageUploadResponse,
    )),
    tags(
        (name = "authentication", description = "Registration, login, and logout"),
        (name = "plants", description = "Plant records and watering schedules"),
        (name = "nurseries", description = "Nearby nursery lookup"),
        (name = "images", description = "Image uploads"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi as _;

    #[test]
    fn test_openapi_document_generates() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/plants/{id}"));
        assert!(json.contains("/nurseries/nearby"));
    }
}
