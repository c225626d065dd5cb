//! Cocktail model
//!
//! A named cocktail prepared with one technique. Its profile is derived
//! from the dosed ingredients on every read and never stored.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::mixology::{get_cocktail_profile, CocktailProfile, Dose, TechniqueCode};
use super::{CocktailIngredient, CocktailIngredientDetail, Technique};

/// A cocktail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cocktail {
    pub id: i64,
    pub name: String,
    pub technique_id: i64,
    pub garnish: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new cocktail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocktailCreate {
    pub name: String,
    pub technique_id: i64,
    pub garnish: Option<String>,
}

/// Data for updating a cocktail
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CocktailUpdate {
    pub name: Option<String>,
    pub technique_id: Option<i64>,
    pub garnish: Option<String>,
}

impl Cocktail {
    /// Create a Cocktail from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            technique_id: row.get("technique_id")?,
            garnish: row.get("garnish")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new cocktail into the database
    pub fn create(conn: &Connection, data: &CocktailCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO cocktails (name, technique_id, garnish) VALUES (?1, ?2, ?3)",
            params![data.name.trim(), data.technique_id, data.garnish],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Cocktail", id })
    }

    /// Get a cocktail by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM cocktails WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(cocktail) => Ok(Some(cocktail)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List cocktails, optionally filtered by name
    pub fn list(
        conn: &Connection,
        query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query.unwrap_or("").trim());
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM cocktails
            WHERE name LIKE ?1
            ORDER BY name ASC, id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )?;

        let cocktails = stmt
            .query_map(params![pattern, limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(cocktails)
    }

    /// Count cocktails matching an optional name filter
    pub fn count(conn: &Connection, query: Option<&str>) -> DbResult<i64> {
        let pattern = format!("%{}%", query.unwrap_or("").trim());
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cocktails WHERE name LIKE ?1",
            [pattern],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Update a cocktail
    pub fn update(conn: &Connection, id: i64, data: &CocktailUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.trim().to_string()));
        }
        if let Some(technique_id) = data.technique_id {
            updates.push(format!("technique_id = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(technique_id));
        }
        if let Some(ref garnish) = data.garnish {
            // Blank garnish clears it
            let garnish = Some(garnish.trim().to_string()).filter(|g| !g.is_empty());
            updates.push(format!("garnish = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(garnish));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE cocktails SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Bump updated_at after a change to ingredients or steps
    pub fn touch(conn: &Connection, id: i64) -> DbResult<()> {
        conn.execute(
            "UPDATE cocktails SET updated_at = datetime('now') WHERE id = ?1",
            [id],
        )?;
        Ok(())
    }

    /// Delete a cocktail along with its ingredients and steps
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM cocktails WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

/// Compute the current profile of a stored cocktail
pub fn cocktail_profile(conn: &Connection, cocktail_id: i64) -> DbResult<Option<CocktailProfile>> {
    let cocktail = match Cocktail::get_by_id(conn, cocktail_id)? {
        Some(cocktail) => cocktail,
        None => return Ok(None),
    };

    let technique = Technique::get_by_id(conn, cocktail.technique_id)?.ok_or(DbError::NotFound {
        entity: "Technique",
        id: cocktail.technique_id,
    })?;

    let details = CocktailIngredient::get_details_for_cocktail(conn, cocktail_id)?;
    Ok(Some(profile_of_details(technique.code, &details)))
}

/// Profile of already loaded ingredient details
pub fn profile_of_details(
    technique: TechniqueCode,
    details: &[CocktailIngredientDetail],
) -> CocktailProfile {
    let doses: Vec<Dose> = details.iter().map(CocktailIngredientDetail::to_dose).collect();
    get_cocktail_profile(technique, &doses)
}
