use serde::Serialize;

/// Device inventory row: a meter with its group and site details.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MeterInfo {
    pub id: i32,
    pub meter_number: String,
    pub group_name: Option<String>,
    pub site_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub time_zone: Option<String>,
}
