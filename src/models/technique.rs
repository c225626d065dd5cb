//! Technique model
//!
//! Preparation techniques and their balance windows.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::mixology::{BalanceProperty, MinMax, TechniqueBalance, TechniqueCode};

/// A preparation technique
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technique {
    pub id: i64,
    pub name: String,
    pub code: TechniqueCode,
    pub balance: TechniqueBalance,
}

impl Technique {
    /// Create a Technique from a database row (balance loaded separately)
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let code: String = row.get("code")?;
        let code = TechniqueCode::from_str(&code).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown technique code '{}'", code).into(),
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            code,
            balance: TechniqueBalance::default(),
        })
    }

    fn with_balance(conn: &Connection, mut technique: Self) -> DbResult<Self> {
        technique.balance = Self::load_balance(conn, technique.id)?;
        Ok(technique)
    }

    /// Load the declared balance windows of a technique
    pub fn load_balance(conn: &Connection, id: i64) -> DbResult<TechniqueBalance> {
        let mut stmt = conn.prepare(
            "SELECT property, min, max FROM technique_ranges WHERE technique_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map([id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?, row.get::<_, f64>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut balance = TechniqueBalance::default();
        for (name, min, max) in rows {
            let property = BalanceProperty::from_str(&name)
                .ok_or_else(|| DbError::InvalidData(format!("unknown balance range '{}'", name)))?;
            let range = MinMax::new(min, max)
                .ok_or_else(|| DbError::InvalidData(format!("invalid {} window", name)))?;
            balance.set(property, Some(range));
        }
        Ok(balance)
    }

    /// Get a technique by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM techniques WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(technique) => Ok(Some(Self::with_balance(conn, technique)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a technique by code
    pub fn get_by_code(conn: &Connection, code: TechniqueCode) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM techniques WHERE code = ?1")?;

        let result = stmt.query_row([code.as_str()], Self::from_row);
        match result {
            Ok(technique) => Ok(Some(Self::with_balance(conn, technique)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all techniques
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM techniques ORDER BY id")?;

        let techniques = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        techniques
            .into_iter()
            .map(|technique| Self::with_balance(conn, technique))
            .collect()
    }

    /// Insert or replace one balance window
    pub fn set_range(
        conn: &Connection,
        id: i64,
        property: BalanceProperty,
        range: MinMax,
    ) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO technique_ranges (technique_id, property, min, max)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(technique_id, property)
            DO UPDATE SET min = excluded.min, max = excluded.max
            "#,
            params![id, property.as_str(), range.min.get(), range.max.get()],
        )?;
        Ok(())
    }

    /// Drop one balance window
    pub fn clear_range(conn: &Connection, id: i64, property: BalanceProperty) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM technique_ranges WHERE technique_id = ?1 AND property = ?2",
            params![id, property.as_str()],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixology::get_technique_ranges;
    use crate::models::test_support::seeded_conn;

    #[test]
    fn test_seeded_techniques_have_complete_ranges() {
        let conn = seeded_conn();
        let techniques = Technique::list(&conn).unwrap();
        assert_eq!(techniques.len(), TechniqueCode::ALL.len());
        for technique in &techniques {
            assert!(get_technique_ranges(&technique.balance).is_some(), "{}", technique.code);
        }
    }

    #[test]
    fn test_get_by_code() {
        let conn = seeded_conn();
        let stirred = Technique::get_by_code(&conn, TechniqueCode::Stirred).unwrap().unwrap();
        assert_eq!(stirred.name, "Stirred");
        let again = Technique::get_by_id(&conn, stirred.id).unwrap().unwrap();
        assert_eq!(again.code, TechniqueCode::Stirred);
    }

    #[test]
    fn test_set_and_clear_range() {
        let conn = seeded_conn();
        let built = Technique::get_by_code(&conn, TechniqueCode::Built).unwrap().unwrap();

        let window = MinMax::new(20.0, 26.0).unwrap();
        Technique::set_range(&conn, built.id, BalanceProperty::Dilution, window).unwrap();
        let built = Technique::get_by_id(&conn, built.id).unwrap().unwrap();
        assert_eq!(built.balance.dilution, Some(window));

        assert!(Technique::clear_range(&conn, built.id, BalanceProperty::Dilution).unwrap());
        let built = Technique::get_by_id(&conn, built.id).unwrap().unwrap();
        assert!(built.balance.dilution.is_none());
        assert!(get_technique_ranges(&built.balance).is_none());
    }
}
