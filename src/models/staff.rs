use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

#[derive(Debug, sqlx::FromRow)]
pub struct Staff {
    pub id: i32,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct StaffRegistrationRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StaffLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct StaffLoginResponse {
    pub token: String,
    pub staff_id: i32,
}

#[derive(Debug, Serialize, JsonSchema)]
#[schemars(example = "RegisterResponse::example")]
pub struct RegisterResponse {
    #[schemars(title = "Staff ID")]
    pub staff_id: i32,

    #[schemars(title = "Register Status")]
    pub status: String,
}

impl RegisterResponse {
    pub fn example() -> Self {
        Self {
            staff_id: 7,
            status: "success".to_string(),
        }
    }
}
