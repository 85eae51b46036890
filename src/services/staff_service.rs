use crate::db::inserted_id;
use crate::models::staff::{Staff, StaffLoginRequest, StaffLoginResponse, StaffRegistrationRequest};
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt;
use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::MySqlPool;
use validator::Validate;

#[derive(Clone)]
pub struct StaffService {
    pool: MySqlPool,
    jwt_secret: String,
}

impl StaffService {
    pub fn new(pool: MySqlPool, jwt_secret: String) -> Self {
        StaffService { pool, jwt_secret }
    }

    // Register a staff member
    pub async fn register_staff(&self, request: StaffRegistrationRequest) -> AppResult<i32> {
        request.validate()?;

        let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM staff WHERE username = ?")
            .bind(&request.username)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict("Username already exists".into()));
        }

        let hashed_password = hash(request.password.as_bytes(), DEFAULT_COST)
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        // A concurrent registration can still hit the unique index
        let result = sqlx::query("INSERT INTO staff (username, password) VALUES (?, ?)")
            .bind(&request.username)
            .bind(&hashed_password)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::on_insert(e, "Username"))?;

        let staff_id = inserted_id(&result)?;
        tracing::info!(staff_id, username = %request.username, "staff registered");
        Ok(staff_id)
    }

    /// Create the account unless the username is taken. Returns whether it
    /// was created; an existing password is left alone.
    pub async fn ensure_staff(&self, username: &str, password: &str) -> AppResult<bool> {
        let request = StaffRegistrationRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        match self.register_staff(request).await {
            Ok(staff_id) => {
                tracing::info!(staff_id, username, "bootstrap staff account created");
                Ok(true)
            }
            Err(AppError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn login_staff(&self, request: StaffLoginRequest) -> AppResult<StaffLoginResponse> {
        let staff = sqlx::query_as::<_, Staff>("SELECT id, username, password FROM staff WHERE username = ?")
            .bind(&request.username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid credentials".into()))?;

        let password_matches = verify(request.password.as_bytes(), &staff.password)
            .map_err(|e| AppError::AuthError(e.to_string()))?;
        if !password_matches {
            tracing::warn!(username = %request.username, "rejected staff login");
            return Err(AppError::AuthError("Invalid credentials".into()));
        }

        let token = jwt::generate_token(staff.id, &self.jwt_secret)
            .map_err(|e| AppError::AuthError(e.to_string()))?;

        Ok(StaffLoginResponse {
            token,
            staff_id: staff.id,
        })
    }
}
