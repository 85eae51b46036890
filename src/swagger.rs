use rocket_okapi::settings::UrlObject;
use rocket_okapi::swagger_ui::SwaggerUIConfig;

// Swagger UI under /swagger, reading the OpenAPI document generated for /api
pub fn swagger_ui() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/api/openapi.json".to_string(),
        urls: vec![UrlObject::new("Cab booking API", "/api/openapi.json")],
        display_request_duration: true,
        ..Default::default()
    }
}
