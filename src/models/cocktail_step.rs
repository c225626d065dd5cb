//! Cocktail Step model
//!
//! Ordered recipe steps of a cocktail.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// One recipe step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocktailStep {
    pub id: i64,
    pub cocktail_id: i64,
    pub position: i64,
    pub description: String,
}

impl CocktailStep {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            cocktail_id: row.get("cocktail_id")?,
            position: row.get("position")?,
            description: row.get("description")?,
        })
    }

    /// Append a step to a cocktail
    pub fn create(conn: &Connection, cocktail_id: i64, description: &str) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO cocktail_steps (cocktail_id, description, position)
            VALUES (?1, ?2,
                (SELECT COALESCE(MAX(position), -1) + 1
                 FROM cocktail_steps WHERE cocktail_id = ?1))
            "#,
            params![cocktail_id, description.trim()],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Recipe step", id })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM cocktail_steps WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(step) => Ok(Some(step)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Steps of a cocktail in order
    pub fn get_for_cocktail(conn: &Connection, cocktail_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM cocktail_steps WHERE cocktail_id = ?1 ORDER BY position, id",
        )?;

        let steps = stmt
            .query_map([cocktail_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(steps)
    }

    pub fn update(conn: &Connection, id: i64, description: &str) -> DbResult<Option<Self>> {
        conn.execute(
            "UPDATE cocktail_steps SET description = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![description.trim(), id],
        )?;
        Self::get_by_id(conn, id)
    }

    /// Swap a step with its predecessor; the first step stays put
    pub fn move_up(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let step = match Self::get_by_id(conn, id)? {
            Some(step) => step,
            None => return Ok(None),
        };

        let previous: Option<(i64, i64)> = match conn.query_row(
            r#"
            SELECT id, position FROM cocktail_steps
            WHERE cocktail_id = ?1 AND position < ?2
            ORDER BY position DESC
            LIMIT 1
            "#,
            params![step.cocktail_id, step.position],
            |row| Ok((row.get(0)?, row.get(1)?)),
        ) {
            Ok(found) => Some(found),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        if let Some((previous_id, previous_position)) = previous {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "UPDATE cocktail_steps SET position = ?1 WHERE id = ?2",
                params![step.position, previous_id],
            )?;
            tx.execute(
                "UPDATE cocktail_steps SET position = ?1 WHERE id = ?2",
                params![previous_position, id],
            )?;
            tx.commit()?;
        }

        Self::get_by_id(conn, id)
    }

    /// Remove a step and close the gap it leaves
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let step = match Self::get_by_id(conn, id)? {
            Some(step) => step,
            None => return Ok(false),
        };

        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM cocktail_steps WHERE id = ?1", [id])?;
        tx.execute(
            "UPDATE cocktail_steps SET position = position - 1 WHERE cocktail_id = ?1 AND position > ?2",
            params![step.cocktail_id, step.position],
        )?;
        tx.commit()?;
        Ok(true)
    }
}
