use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// One timestamped meter measurement, flattened with its meter and group.
///
/// `raw_json` is the payload exactly as the upstream producer stored it; its
/// `Value` field is not guaranteed to be a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub id: Uuid,
    pub raw_json: String,
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    pub meter_id: i32,
    pub meter_number: String,
    pub group_name: String,
}
