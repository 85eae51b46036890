use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Driver {
    pub id: i32,
    pub name: String,
    pub mobile: String,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct DriverRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 10, max = 15))]
    pub mobile: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct VehicleCategory {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct VehicleFeature {
    pub id: i32,
    pub name: String,
}

// Shared body for the name-only lookups (categories, features)
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct NamedRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct VehicleRateCategoryRecord {
    pub id: i32,
    pub name: String,
    pub tariff_per_km: Decimal,
    pub tariff_after_hours: Decimal,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct VehicleRateCategory {
    pub id: i32,
    pub name: String,
    pub tariff_per_km: Decimal,
    pub tariff_after_hours: Decimal,
    pub features: Vec<VehicleFeature>,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct VehicleRateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub tariff_per_km: Decimal,
    pub tariff_after_hours: Decimal,
    #[serde(default)]
    pub feature_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct VehicleView {
    pub id: i32,
    pub name: String,
    pub number: String,
    pub category: String,
    pub driver: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct VehicleRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub number: String,
    pub category_id: i32,
    pub driver_id: Option<i32>,
}
