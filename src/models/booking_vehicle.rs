use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BookingVehicle {
    pub id: i32,
    pub booking_id: i32,
    pub vehicle_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub extra_info: Option<String>,
}

impl BookingVehicle {
    // Blank extra info is treated the same as none
    pub fn extra_info(&self) -> Option<&str> {
        self.extra_info
            .as_deref()
            .map(str::trim)
            .filter(|info| !info.is_empty())
    }
}

// Assignment joined with vehicle and driver display data
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct BookingVehicleView {
    pub id: i32,
    pub vehicle_id: Option<i32>,
    pub vehicle_name: Option<String>,
    pub vehicle_number: Option<String>,
    pub driver_id: Option<i32>,
    pub driver_name: Option<String>,
    pub driver_mobile: Option<String>,
    pub extra_info: Option<String>,
}

impl BookingVehicleView {
    pub fn vehicle_label(&self) -> Option<String> {
        match (&self.vehicle_name, &self.vehicle_number) {
            (Some(name), Some(number)) => Some(format!("{} ({})", name, number)),
            (Some(name), None) => Some(name.clone()),
            (None, Some(number)) => Some(number.clone()),
            (None, None) => None,
        }
    }

    /// "driver/vehicle", with "-" for whichever side is unassigned.
    pub fn display_pair(&self) -> String {
        format!(
            "{}/{}",
            self.driver_name.as_deref().unwrap_or("-"),
            self.vehicle_label().as_deref().unwrap_or("-")
        )
    }
}

/// Joined assignment pairs, or "x" when nothing is assigned yet.
pub fn vehicles_column(assignments: &[BookingVehicleView], separator: &str) -> String {
    if assignments.is_empty() {
        return "x".to_string();
    }
    assignments
        .iter()
        .map(BookingVehicleView::display_pair)
        .collect::<Vec<_>>()
        .join(separator)
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema, Validate)]
pub struct BookingVehicleRequest {
    pub vehicle_id: Option<i32>,
    pub driver_id: Option<i32>,
    #[validate(length(max = 1000))]
    pub extra_info: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingVehicleListResponse {
    pub vehicles: Vec<BookingVehicleView>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingVehicleSaveResponse {
    pub id: i32,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(driver: Option<&str>, vehicle: Option<(&str, &str)>) -> BookingVehicleView {
        BookingVehicleView {
            id: 1,
            vehicle_id: vehicle.map(|_| 7),
            vehicle_name: vehicle.map(|(name, _)| name.to_string()),
            vehicle_number: vehicle.map(|(_, number)| number.to_string()),
            driver_id: driver.map(|_| 3),
            driver_name: driver.map(str::to_string),
            driver_mobile: None,
            extra_info: None,
        }
    }

    #[test]
    fn empty_assignment_list_renders_as_x() {
        assert_eq!(vehicles_column(&[], ","), "x");
    }

    #[test]
    fn missing_sides_render_as_dash() {
        let rows = vec![
            view(Some("Ravi"), Some(("Innova", "KA01AB1234"))),
            view(None, Some(("Dzire", "KA02CD5678"))),
            view(Some("Suresh"), None),
        ];
        assert_eq!(
            vehicles_column(&rows, ", "),
            "Ravi/Innova (KA01AB1234), -/Dzire (KA02CD5678), Suresh/-"
        );
    }

    #[test]
    fn whitespace_extra_info_counts_as_empty() {
        let assignment = BookingVehicle {
            id: 1,
            booking_id: 1,
            vehicle_id: None,
            driver_id: None,
            extra_info: Some("  \n".into()),
        };
        assert_eq!(assignment.extra_info(), None);
    }
}
