#![allow(dead_code)]

use cab_booking_system::models::booking::{BookingType, CreateBookingRequest};
use cab_booking_system::models::fleet::{
    Driver, DriverRequest, NamedRequest, VehicleCategory, VehicleRequest, VehicleView,
};
use cab_booking_system::models::place::{Place, PlaceRequest, RateRequest};
use cab_booking_system::services::reference_service::ReferenceService;
use cab_booking_system::utils::error::AppError;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlPool as Pool;

use super::test_utils::unique;

/// Reference data every booking needs: a priced route, a driver and a vehicle.
pub struct Fixture {
    pub pool: Pool,
    pub reference: ReferenceService,
    pub source: Place,
    pub destination: Place,
    pub category: VehicleCategory,
    pub driver: Driver,
    pub vehicle: VehicleView,
}

impl Fixture {
    pub async fn seed(pool: Pool) -> Result<Self, AppError> {
        let reference = ReferenceService::new(pool.clone());

        let source = reference
            .create_place(PlaceRequest { name: unique("Bangalore") })
            .await?;
        let destination = reference
            .create_place(PlaceRequest { name: unique("Mysore") })
            .await?;
        let category = reference
            .create_vehicle_category(NamedRequest { name: unique("Sedan") })
            .await?;
        reference
            .create_rate(RateRequest {
                source_id: source.id,
                destination_id: destination.id,
                vehicle_category_id: category.id,
                oneway_price: Decimal::from(2500),
                roundtrip_price: Decimal::from(4500),
            })
            .await?;
        let driver = reference
            .create_driver(DriverRequest {
                name: "Ravi".to_string(),
                mobile: "8888888888".to_string(),
            })
            .await?;
        let vehicle = reference
            .create_vehicle(VehicleRequest {
                name: "Dzire".to_string(),
                number: unique("KA01"),
                category_id: category.id,
                driver_id: Some(driver.id),
            })
            .await?;

        Ok(Fixture {
            pool,
            reference,
            source,
            destination,
            category,
            driver,
            vehicle,
        })
    }

    pub fn booking_request(&self) -> CreateBookingRequest {
        CreateBookingRequest {
            customer_name: "Asha".to_string(),
            customer_mobile: Some("9999999999".to_string()),
            customer_email: None,
            source_id: self.source.id,
            destination_id: self.destination.id,
            travel_date: NaiveDate::from_ymd_opt(2030, 3, 10).unwrap(),
            travel_time: NaiveTime::from_hms_opt(6, 30, 0).unwrap(),
            pickup_point: Some("MG Road".to_string()),
            ssr: None,
            passengers: 3,
            distance: Some(150),
            booking_type: BookingType::OneWay,
            vehicle_type_id: self.category.id,
            vehicle_count: 1,
            fare_details: None,
            total_fare: None,
        }
    }
}
