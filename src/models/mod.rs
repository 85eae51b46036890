pub mod booking;
pub mod booking_vehicle;
pub mod export;
pub mod fleet;
pub mod payment;
pub mod place;
pub mod staff;
