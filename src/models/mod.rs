mod booking;
mod record;
mod settings;
mod vehicle;

pub use booking::{prepare_booking, status_patch, PENDING_CONFIRMATION};
pub use record::{timestamp, Fields, Record};
pub use settings::default_settings;
pub use vehicle::{prepare_vehicle, vehicle_patch};
