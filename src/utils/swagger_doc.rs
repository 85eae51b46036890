use crate::utils::error::AppError;
use rocket_okapi::okapi::openapi3::{Response, Responses, MediaType};
use rocket_okapi::response::OpenApiResponderInner;
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::RefOr;
use okapi::openapi3::SchemaObject;
use indexmap::IndexMap;
use serde_json::json;
use rocket::http::Status;

// Example body for one documented error status
fn error_response(description: &str, error: AppError) -> RefOr<Response> {
    let mut content = IndexMap::new();
    content.insert(
        "application/json".to_string(),
        MediaType {
            schema: Some(SchemaObject::default()),
            example: Some(json!({ "error": error.to_string() })),
            ..Default::default()
        },
    );

    RefOr::Object(Response {
        description: description.to_string(),
        content,
        ..Default::default()
    })
}

impl<'r> OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut responses = Responses::default();

        let documented = [
            (Status::BadRequest, "Malformed or invalid input", AppError::ValidationError("customer_email: email".to_string())),
            (Status::Unauthorized, "Missing or expired staff token", AppError::AuthError("Invalid credentials".to_string())),
            (Status::NotFound, "Booking, payment or reference record not found", AppError::NotFound("Booking BK1A2B3C4D not found".to_string())),
            (Status::Conflict, "Duplicate record", AppError::Conflict("Place already exists".to_string())),
            (Status::UnprocessableEntity, "No fare could be determined", AppError::Unprocessable("No rate defined for this route".to_string())),
            (Status::InternalServerError, "Database failure", AppError::DatabaseError("Internal ServerError".to_string())),
        ];

        for (status, description, error) in documented {
            responses
                .responses
                .insert(status.code.to_string(), error_response(description, error));
        }

        Ok(responses)
    }
}
