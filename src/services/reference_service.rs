use rust_decimal::Decimal;
use sqlx::MySqlPool;
use validator::Validate;

use crate::models::fleet::{
    Driver, DriverRequest, NamedRequest, VehicleCategory, VehicleFeature, VehicleRateCategory,
    VehicleRateCategoryRecord, VehicleRateCategoryRequest, VehicleRequest, VehicleView,
};
use crate::db::{contains_pattern, inserted_id};
use crate::models::place::{Place, PlaceRequest, RateRequest, RateView};
use crate::utils::error::{AppError, AppResult};

fn like(search: Option<&str>) -> String {
    contains_pattern(search.map(str::trim).unwrap_or(""))
}

// Lookup tables managed alongside bookings
#[derive(Clone)]
pub struct ReferenceService {
    pool: MySqlPool,
}

impl ReferenceService {
    pub fn new(pool: MySqlPool) -> Self {
        ReferenceService { pool }
    }

    async fn delete_row(&self, table: &'static str, what: &str, id: i32) -> AppResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::on_delete(e, what))?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("{} {} not found", what, id)));
        }
        tracing::info!(table, id, "reference row deleted");
        Ok(())
    }

    // Places

    pub async fn create_place(&self, request: PlaceRequest) -> AppResult<Place> {
        request.validate()?;
        let name = request.name.trim().to_string();
        let result = sqlx::query("INSERT INTO place (name) VALUES (?)")
            .bind(&name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::on_insert(e, "Place"))?;
        Ok(Place {
            id: inserted_id(&result)?,
            name,
        })
    }

    pub async fn list_places(&self, search: Option<&str>) -> AppResult<Vec<Place>> {
        let places = sqlx::query_as::<_, Place>("SELECT id, name FROM place WHERE name LIKE ? ORDER BY name")
            .bind(like(search))
            .fetch_all(&self.pool)
            .await?;
        Ok(places)
    }

    pub async fn delete_place(&self, id: i32) -> AppResult<()> {
        self.delete_row("place", "Place", id).await
    }

    // Drivers

    pub async fn create_driver(&self, request: DriverRequest) -> AppResult<Driver> {
        request.validate()?;
        let result = sqlx::query("INSERT INTO driver (name, mobile) VALUES (?, ?)")
            .bind(&request.name)
            .bind(&request.mobile)
            .execute(&self.pool)
            .await?;
        Ok(Driver {
            id: inserted_id(&result)?,
            name: request.name,
            mobile: request.mobile,
        })
    }

    pub async fn list_drivers(&self, search: Option<&str>) -> AppResult<Vec<Driver>> {
        let pattern = like(search);
        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT id, name, mobile FROM driver WHERE name LIKE ? OR mobile LIKE ? ORDER BY name",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(drivers)
    }

    pub async fn delete_driver(&self, id: i32) -> AppResult<()> {
        self.delete_row("driver", "Driver", id).await
    }

    // Vehicle categories and features

    pub async fn create_vehicle_category(&self, request: NamedRequest) -> AppResult<VehicleCategory> {
        request.validate()?;
        let result = sqlx::query("INSERT INTO vehicle_category (name) VALUES (?)")
            .bind(&request.name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::on_insert(e, "Vehicle category"))?;
        Ok(VehicleCategory {
            id: inserted_id(&result)?,
            name: request.name,
        })
    }

    pub async fn list_vehicle_categories(&self, search: Option<&str>) -> AppResult<Vec<VehicleCategory>> {
        let categories = sqlx::query_as::<_, VehicleCategory>(
            "SELECT id, name FROM vehicle_category WHERE name LIKE ? ORDER BY name",
        )
        .bind(like(search))
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn delete_vehicle_category(&self, id: i32) -> AppResult<()> {
        self.delete_row("vehicle_category", "Vehicle category", id).await
    }

    pub async fn create_feature(&self, request: NamedRequest) -> AppResult<VehicleFeature> {
        request.validate()?;
        let result = sqlx::query("INSERT INTO vehicle_feature (name) VALUES (?)")
            .bind(&request.name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::on_insert(e, "Vehicle feature"))?;
        Ok(VehicleFeature {
            id: inserted_id(&result)?,
            name: request.name,
        })
    }

    pub async fn list_features(&self, search: Option<&str>) -> AppResult<Vec<VehicleFeature>> {
        let features = sqlx::query_as::<_, VehicleFeature>(
            "SELECT id, name FROM vehicle_feature WHERE name LIKE ? ORDER BY name",
        )
        .bind(like(search))
        .fetch_all(&self.pool)
        .await?;
        Ok(features)
    }

    pub async fn delete_feature(&self, id: i32) -> AppResult<()> {
        self.delete_row("vehicle_feature", "Vehicle feature", id).await
    }

    // Rate categories

    pub async fn create_rate_category(&self, request: VehicleRateCategoryRequest) -> AppResult<VehicleRateCategory> {
        request.validate()?;
        if request.tariff_per_km < Decimal::ZERO || request.tariff_after_hours < Decimal::ZERO {
            return Err(AppError::ValidationError("tariffs must not be negative".into()));
        }

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "INSERT INTO vehicle_rate_category (name, tariff_per_km, tariff_after_hours) VALUES (?, ?, ?)",
        )
        .bind(&request.name)
        .bind(request.tariff_per_km)
        .bind(request.tariff_after_hours)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::on_insert(e, "Rate category"))?;
        let id = inserted_id(&result)?;

        for feature_id in &request.feature_ids {
            sqlx::query("INSERT INTO vehicle_rate_category_feature (rate_category_id, feature_id) VALUES (?, ?)")
                .bind(id)
                .bind(feature_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| match e {
                    sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                        AppError::NotFound(format!("Vehicle feature {} not found", feature_id))
                    }
                    other => AppError::on_insert(other, "Rate category feature"),
                })?;
        }
        tx.commit().await?;

        self.rate_category(id).await
    }

    async fn features_of(&self, rate_category_id: i32) -> AppResult<Vec<VehicleFeature>> {
        let features = sqlx::query_as::<_, VehicleFeature>(
            r#"
            SELECT f.id, f.name
            FROM vehicle_feature f
            JOIN vehicle_rate_category_feature rf ON rf.feature_id = f.id
            WHERE rf.rate_category_id = ?
            ORDER BY f.name
            "#,
        )
        .bind(rate_category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(features)
    }

    pub async fn rate_category(&self, id: i32) -> AppResult<VehicleRateCategory> {
        let record = sqlx::query_as::<_, VehicleRateCategoryRecord>(
            "SELECT id, name, tariff_per_km, tariff_after_hours FROM vehicle_rate_category WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Rate category {} not found", id)))?;

        Ok(VehicleRateCategory {
            features: self.features_of(record.id).await?,
            id: record.id,
            name: record.name,
            tariff_per_km: record.tariff_per_km,
            tariff_after_hours: record.tariff_after_hours,
        })
    }

    /// Rate categories matching a name, optionally only those offering a
    /// feature.
    pub async fn list_rate_categories(
        &self,
        search: Option<&str>,
        feature_id: Option<i32>,
    ) -> AppResult<Vec<VehicleRateCategory>> {
        let pattern = like(search);
        let records = match feature_id {
            Some(feature_id) => {
                sqlx::query_as::<_, VehicleRateCategoryRecord>(
                    r#"
                    SELECT c.id, c.name, c.tariff_per_km, c.tariff_after_hours
                    FROM vehicle_rate_category c
                    JOIN vehicle_rate_category_feature rf ON rf.rate_category_id = c.id
                    WHERE rf.feature_id = ? AND c.name LIKE ?
                    ORDER BY c.name
                    "#,
                )
                .bind(feature_id)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, VehicleRateCategoryRecord>(
                    r#"
                    SELECT id, name, tariff_per_km, tariff_after_hours
                    FROM vehicle_rate_category
                    WHERE name LIKE ?
                    ORDER BY name
                    "#,
                )
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut categories = Vec::with_capacity(records.len());
        for record in records {
            categories.push(VehicleRateCategory {
                features: self.features_of(record.id).await?,
                id: record.id,
                name: record.name,
                tariff_per_km: record.tariff_per_km,
                tariff_after_hours: record.tariff_after_hours,
            });
        }
        Ok(categories)
    }

    pub async fn delete_rate_category(&self, id: i32) -> AppResult<()> {
        self.delete_row("vehicle_rate_category", "Rate category", id).await
    }

    // Vehicles

    pub async fn create_vehicle(&self, request: VehicleRequest) -> AppResult<VehicleView> {
        request.validate()?;
        let result = sqlx::query("INSERT INTO vehicle (name, number, category_id, driver_id) VALUES (?, ?, ?, ?)")
            .bind(&request.name)
            .bind(&request.number)
            .bind(request.category_id)
            .bind(request.driver_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    AppError::NotFound("Vehicle category or driver not found".into())
                }
                other => AppError::on_insert(other, "Vehicle number"),
            })?;

        let id = inserted_id(&result)?;
        self.list_vehicles(None, None)
            .await?
            .into_iter()
            .find(|v| v.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found", id)))
    }

    pub async fn list_vehicles(&self, search: Option<&str>, category: Option<&str>) -> AppResult<Vec<VehicleView>> {
        let pattern = like(search);
        let vehicles = sqlx::query_as::<_, VehicleView>(
            r#"
            SELECT v.id, v.name, v.number, c.name AS category, d.name AS driver
            FROM vehicle v
            JOIN vehicle_category c ON c.id = v.category_id
            LEFT JOIN driver d ON d.id = v.driver_id
            WHERE (v.name LIKE ? OR v.number LIKE ?)
            AND (? IS NULL OR c.name = ?)
            ORDER BY v.name, v.number
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(category)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(vehicles)
    }

    pub async fn delete_vehicle(&self, id: i32) -> AppResult<()> {
        self.delete_row("vehicle", "Vehicle", id).await
    }

    // Rates

    pub async fn create_rate(&self, request: RateRequest) -> AppResult<RateView> {
        if request.oneway_price < Decimal::ZERO || request.roundtrip_price < Decimal::ZERO {
            return Err(AppError::ValidationError("prices must not be negative".into()));
        }
        if request.source_id == request.destination_id {
            return Err(AppError::BadRequest("Source and destination must differ".into()));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO rate (source_id, destination_id, vehicle_category_id, oneway_price, roundtrip_price)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.source_id)
        .bind(request.destination_id)
        .bind(request.vehicle_category_id)
        .bind(request.oneway_price)
        .bind(request.roundtrip_price)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::NotFound("Place or vehicle category not found".into())
            }
            other => AppError::on_insert(other, "Rate for this route"),
        })?;

        let id = inserted_id(&result)?;
        self.list_rates(None, None)
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Rate {} not found", id)))
    }

    pub async fn list_rates(&self, search: Option<&str>, vehicle_category_id: Option<i32>) -> AppResult<Vec<RateView>> {
        let pattern = like(search);
        let rates = sqlx::query_as::<_, RateView>(
            r#"
            SELECT r.id, s.name AS source, d.name AS destination, c.name AS vehicle_category,
                r.oneway_price, r.roundtrip_price
            FROM rate r
            JOIN place s ON s.id = r.source_id
            JOIN place d ON d.id = r.destination_id
            JOIN vehicle_category c ON c.id = r.vehicle_category_id
            WHERE (s.name LIKE ? OR d.name LIKE ?)
            AND (? IS NULL OR r.vehicle_category_id = ?)
            ORDER BY s.name, d.name, c.name
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(vehicle_category_id)
        .bind(vehicle_category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rates)
    }

    pub async fn delete_rate(&self, id: i32) -> AppResult<()> {
        self.delete_row("rate", "Rate", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_search_matches_everything() {
        assert_eq!(like(None), "%%");
        assert_eq!(like(Some("  Mys ")), "%Mys%");
    }

    #[test]
    fn search_underscores_do_not_match_any_character() {
        assert_eq!(like(Some("AC_")), "%AC\\_%");
    }
}
