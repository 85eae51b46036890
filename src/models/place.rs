use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::booking::BookingType;

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Place {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct PlaceRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

// Fare between two places for one vehicle category
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Rate {
    pub id: i32,
    pub source_id: i32,
    pub destination_id: i32,
    pub vehicle_category_id: i32,
    pub oneway_price: Decimal,
    pub roundtrip_price: Decimal,
}

impl Rate {
    pub fn price_for(&self, booking_type: BookingType) -> Decimal {
        match booking_type {
            BookingType::OneWay => self.oneway_price,
            BookingType::RoundTrip => self.roundtrip_price,
        }
    }

    pub fn fare(&self, booking_type: BookingType, vehicle_count: i32) -> Decimal {
        self.price_for(booking_type) * Decimal::from(vehicle_count)
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct RateView {
    pub id: i32,
    pub source: String,
    pub destination: String,
    pub vehicle_category: String,
    pub oneway_price: Decimal,
    pub roundtrip_price: Decimal,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RateRequest {
    pub source_id: i32,
    pub destination_id: i32,
    pub vehicle_category_id: i32,
    pub oneway_price: Decimal,
    pub roundtrip_price: Decimal,
}
