use anyhow::Result;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::{MeterInfo, Reading};

// `ingestion_date` is cast so that both `timestamp` and `timestamptz` schemas
// decode into `OffsetDateTime`.
const READINGS_SELECT: &str = r#"
    SELECT
        r.id,
        r.raw_json,
        r.ingestion_date::timestamptz AS ts,
        r.meter_id,
        m.meter_number,
        g.name AS group_name
    FROM readings r
    INNER JOIN meters m ON r.meter_id = m.id
    INNER JOIN groups g ON g.id = m.group_id
"#;

/// Fetch every reading joined with its meter number and group name.
pub async fn all_readings(pool: &PgPool) -> Result<Vec<Reading>> {
    let sql = format!("{READINGS_SELECT} ORDER BY r.ingestion_date, r.id");
    let rows = sqlx::query_as::<_, Reading>(&sql).fetch_all(pool).await?;

    Ok(rows)
}

/// Fetch readings ingested in `[start, end)`.
pub async fn readings_between(
    pool: &PgPool,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<Vec<Reading>> {
    let sql = format!(
        "{READINGS_SELECT} WHERE r.ingestion_date >= $1 AND r.ingestion_date < $2 \
         ORDER BY r.ingestion_date, r.id"
    );
    let rows = sqlx::query_as::<_, Reading>(&sql)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Device inventory: every meter with its group and site, if any.
pub async fn all_meters(pool: &PgPool) -> Result<Vec<MeterInfo>> {
    let rows = sqlx::query_as::<_, MeterInfo>(
        r#"
        SELECT
            m.id,
            m.meter_number,
            g.name                AS group_name,
            s.name                AS site_name,
            s.latitude::float8    AS latitude,
            s.longitude::float8   AS longitude,
            s.altitude::float8    AS altitude,
            s.time_zone
        FROM meters m
        LEFT JOIN groups g ON g.id = m.group_id
        LEFT JOIN sites s  ON s.id = m.site_id
        ORDER BY m.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
