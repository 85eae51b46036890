pub mod booking_service;
pub mod booking_vehicle_service;
pub mod export_service;
pub mod lifecycle;
pub mod notification_service;
pub mod payment_service;
pub mod reference_service;
pub mod staff_service;
