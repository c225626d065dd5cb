//! Unit model
//!
//! Measurement units from the seeded catalog.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::mixology::{NonNegative, UnitKind};

/// A measurement unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: i64,
    pub name: String,
    pub symbol: String,
    pub kind: UnitKind,
    /// Milliliter equivalent; None for percentage units
    pub ml: Option<f64>,
}

impl Unit {
    /// Create a Unit from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let kind: String = row.get("kind")?;
        let kind = UnitKind::from_str(&kind).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown unit kind '{}'", kind).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            symbol: row.get("symbol")?,
            kind,
            ml: row.get("ml")?,
        })
    }

    /// The ml factor, if this unit can dose an ingredient
    pub fn ml_factor(&self) -> Option<NonNegative> {
        match self.kind {
            UnitKind::Volume => self.ml.and_then(NonNegative::new),
            UnitKind::Percentage => None,
        }
    }

    /// Get a unit by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM units WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(unit) => Ok(Some(unit)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Find a volume unit by symbol or name (case-insensitive)
    pub fn find_volume(conn: &Connection, unit: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM units
            WHERE kind = 'VOLUME'
              AND (LOWER(symbol) = LOWER(?1) OR LOWER(name) = LOWER(?1))
            ORDER BY id
            LIMIT 1
            "#,
        )?;

        let result = stmt.query_row([unit.trim()], Self::from_row);
        match result {
            Ok(unit) => Ok(Some(unit)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a volume unit and its ml factor, failing if it cannot dose
    pub fn require_volume(conn: &Connection, id: i64) -> DbResult<(Self, NonNegative)> {
        let unit = Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Unit", id })?;
        let ml = unit.ml_factor().ok_or_else(|| {
            DbError::InvalidData(format!("unit '{}' is not a volume unit", unit.name))
        })?;
        Ok((unit, ml))
    }

    /// List all units
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM units ORDER BY kind DESC, id")?;

        let units = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::seeded_conn;

    #[test]
    fn test_find_volume_by_symbol_or_name() {
        let conn = seeded_conn();
        let oz = Unit::find_volume(&conn, "OZ").unwrap().unwrap();
        assert_eq!(oz.name, "Ounce");
        assert_eq!(oz.ml_factor().map(NonNegative::get), Some(30.0));

        let dash = Unit::find_volume(&conn, "dash").unwrap().unwrap();
        assert_eq!(dash.kind, UnitKind::Volume);

        // Percentage units never dose
        assert!(Unit::find_volume(&conn, "ABV").unwrap().is_none());
        assert!(Unit::find_volume(&conn, "cup").unwrap().is_none());
    }

    #[test]
    fn test_require_volume_rejects_percentage() {
        let conn = seeded_conn();
        let abv_id: i64 = conn
            .query_row("SELECT id FROM units WHERE name = 'ABV'", [], |r| r.get(0))
            .unwrap();
        assert!(matches!(Unit::require_volume(&conn, abv_id), Err(DbError::InvalidData(_))));
        assert!(matches!(
            Unit::require_volume(&conn, 9999),
            Err(DbError::NotFound { entity: "Unit", .. })
        ));
    }

    #[test]
    fn test_unknown_stored_kind_is_an_error() {
        let conn = seeded_conn();
        conn.execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             INSERT INTO units (name, symbol, kind, ml) VALUES ('Pinch', 'pinch', 'WEIGHT', NULL);",
        )
        .unwrap();
        let id = conn.last_insert_rowid();

        assert!(matches!(Unit::get_by_id(&conn, id), Err(DbError::Sqlite(_))));
        assert!(Unit::list(&conn).is_err());
    }

    #[test]
    fn test_list_units() {
        let conn = seeded_conn();
        let units = Unit::list(&conn).unwrap();
        assert_eq!(units.len(), 9);
        // Volume units list first
        assert_eq!(units[0].kind, UnitKind::Volume);
    }
}
