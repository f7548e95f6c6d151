use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, Result, ToSql};
use tracing::debug;

use crate::model::PropertyRecord;

/// Historical rows below this sale count are too thin to trust.
pub const MIN_HOMES_SOLD: i64 = 5;
const PROPERTY_TYPE: &str = "Single Family Residential";

pub fn fetch_property(db_path: &Path, address: &str) -> Result<Option<PropertyRecord>> {
    let conn = Connection::open(db_path)?;

    let mut stmt = conn.prepare(
        "SELECT price, tax_information, estimated_rent, sqft, year_built, zip, city
         FROM listings
         WHERE address = ?1",
    )?;

    stmt.query_row([address], |row| {
        Ok(PropertyRecord {
            price: numeric(row.get_ref(0)?),
            tax_information_raw: text(row.get_ref(1)?),
            estimated_rent_raw: text(row.get_ref(2)?),
            sqft: numeric(row.get_ref(3)?),
            year_built_raw: text(row.get_ref(4)?),
            zip: text(row.get_ref(5)?),
            city: text(row.get_ref(6)?),
        })
    })
    .optional()
}

// Listing columns are loosely typed; rent shows up as TEXT in some imports
// and REAL in others.
fn text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => std::str::from_utf8(t).ok().map(str::to_string),
    }
}

fn numeric(value: ValueRef<'_>) -> Option<f64> {
    match value {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(t) => std::str::from_utf8(t).ok().and_then(|s| s.trim().parse().ok()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    }
}

/// Read accessor for the neighborhood-appreciation history database.
pub struct SqliteHistory {
    db_path: PathBuf,
}

impl SqliteHistory {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Most recent value for a metric, filtered to single-family rows with a
    /// minimum sale count. `like` switches the neighborhood match from exact
    /// to substring.
    fn query_metric(
        &self,
        metric: &str,
        city: Option<&str>,
        neighborhood_norm: &str,
        like: bool,
    ) -> Result<Option<f64>> {
        let conn = Connection::open(&self.db_path)?;

        let mut sql = String::from(
            "SELECT na.value
             FROM neighborhood_appreciation na
             JOIN neighborhood_data nd ON na.neighborhood_data_id = nd.id
             WHERE na.metric_type = ?
               AND nd.property_type = ?
               AND nd.homes_sold >= ?",
        );
        let op = if like { "LIKE" } else { "=" };
        let hood_param = if like {
            format!("%{neighborhood_norm}%")
        } else {
            neighborhood_norm.to_string()
        };
        let city_lower = city.map(str::to_lowercase);

        let mut params: Vec<&dyn ToSql> = vec![&metric, &PROPERTY_TYPE, &MIN_HOMES_SOLD];
        if let Some(city) = &city_lower {
            sql.push_str(" AND lower(nd.city) = ?");
            params.push(city);
        }
        sql.push_str(&format!(" AND lower(nd.neighborhood_name) {op} ?"));
        params.push(&hood_param);
        sql.push_str(" ORDER BY nd.period_end DESC LIMIT 1");

        debug!(sql = %sql, neighborhood = %hood_param, "historical metric query");
        let mut stmt = conn.prepare(&sql)?;
        stmt.query_row(params.as_slice(), |row| row.get::<_, f64>(0))
            .optional()
    }

    /// Exact neighborhood match first, then one substring retry. Database
    /// errors are logged misses; the caller falls through to its next source.
    pub fn latest_metric(&self, metric: &str, city: Option<&str>, neighborhood: &str) -> Option<f64> {
        let neighborhood_norm = neighborhood.to_lowercase().replace('_', " ");
        match self.query_metric(metric, city, &neighborhood_norm, false) {
            Ok(Some(value)) => return Some(value),
            Ok(None) => {
                debug!(neighborhood = %neighborhood_norm, "no exact historical match, retrying with substring");
            }
            Err(e) => {
                debug!(error = %e, "historical lookup failed");
                return None;
            }
        }
        match self.query_metric(metric, city, &neighborhood_norm, true) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "historical substring lookup failed");
                None
            }
        }
    }
}

impl crate::appreciation::HistoricalSource for SqliteHistory {
    fn latest_metric(&self, metric: &str, city: Option<&str>, neighborhood: &str) -> Option<f64> {
        SqliteHistory::latest_metric(self, metric, city, neighborhood)
    }
}
