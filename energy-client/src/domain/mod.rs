pub mod meter;
pub mod reading;

pub use meter::MeterInfo;
pub use reading::Reading;
