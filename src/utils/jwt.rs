use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use serde::{Deserialize, Serialize};
use rocket_okapi::request::OpenApiFromRequest;

use crate::config::AppConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,  // staff id
    pub exp: usize,
}

#[derive(Debug, OpenApiFromRequest)]
pub struct AuthenticatedStaff {
    pub staff_id: i32,
}


pub fn generate_token(staff_id: i32, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    // Tokens are valid for 24 hours
    let expiration = (chrono::Utc::now() + chrono::Duration::hours(24)).timestamp() as usize;

    let claims = Claims {
        sub: staff_id,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedStaff {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = match request.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => token,
                None => return Outcome::Error((Status::Unauthorized, ())),
            },
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        let config = match request.rocket().state::<AppConfig>() {
            Some(config) => config,
            None => return Outcome::Error((Status::InternalServerError, ())),
        };

        match verify_token(token, &config.jwt_secret) {
            Ok(claims) => Outcome::Success(AuthenticatedStaff {
                staff_id: claims.sub,
            }),
            Err(_) => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_staff_id() {
        let token = generate_token(42, "test-secret").unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, 42);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_token(42, "test-secret").unwrap();
        assert!(verify_token(&token, "another-secret").is_err());
    }
}
