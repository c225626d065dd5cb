//! Cocktail Ingredient model
//!
//! A dosed use of an ingredient within a cocktail: amount, volume unit and
//! whether it goes in after the technique.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::mixology::{ChemicalContents, Dose, NonNegative};
use super::{Ingredient, Unit};

/// A cocktail ingredient linking an ingredient to a cocktail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocktailIngredient {
    pub id: i64,
    pub cocktail_id: i64,
    pub ingredient_id: i64,
    pub unit_id: i64,
    pub amount: f64,
    pub after_technique: bool,
    pub position: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Cocktail ingredient with ingredient and unit details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocktailIngredientDetail {
    pub id: i64,
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub amount: NonNegative,
    pub unit: String,
    pub ml_per_unit: NonNegative,
    pub after_technique: bool,
    pub contents: ChemicalContents,
}

impl CocktailIngredientDetail {
    /// The calculator's view of this ingredient
    pub fn to_dose(&self) -> Dose {
        Dose {
            amount: self.amount,
            ml_per_unit: self.ml_per_unit,
            contents: self.contents,
            after_technique: self.after_technique,
        }
    }
}

/// Data for adding an ingredient to a cocktail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocktailIngredientCreate {
    pub cocktail_id: i64,
    pub ingredient_id: i64,
    pub unit_id: i64,
    pub amount: NonNegative,
    #[serde(default)]
    pub after_technique: bool,
}

/// Data for updating a cocktail ingredient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CocktailIngredientUpdate {
    pub amount: Option<NonNegative>,
    pub unit_id: Option<i64>,
    pub after_technique: Option<bool>,
}

impl CocktailIngredient {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            cocktail_id: row.get("cocktail_id")?,
            ingredient_id: row.get("ingredient_id")?,
            unit_id: row.get("unit_id")?,
            amount: row.get("amount")?,
            after_technique: row.get::<_, i32>("after_technique")? != 0,
            position: row.get("position")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Add an ingredient to the end of a cocktail
    pub fn create(conn: &Connection, data: &CocktailIngredientCreate) -> DbResult<Self> {
        // Refuse percentage units before touching the table
        Unit::require_volume(conn, data.unit_id)?;

        conn.execute(
            r#"
            INSERT INTO cocktail_ingredients
                (cocktail_id, ingredient_id, unit_id, amount, after_technique, position)
            VALUES (?1, ?2, ?3, ?4, ?5,
                (SELECT COALESCE(MAX(position), -1) + 1
                 FROM cocktail_ingredients WHERE cocktail_id = ?1))
            "#,
            params![
                data.cocktail_id,
                data.ingredient_id,
                data.unit_id,
                data.amount.get(),
                data.after_technique as i32,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Cocktail ingredient", id })
    }

    /// Get a cocktail ingredient by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM cocktail_ingredients WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get all ingredients for a cocktail, in dosing order
    pub fn get_for_cocktail(conn: &Connection, cocktail_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM cocktail_ingredients WHERE cocktail_id = ?1 ORDER BY position, id",
        )?;

        let items = stmt
            .query_map([cocktail_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Get ingredients with names, units and declared contents for a cocktail
    pub fn get_details_for_cocktail(
        conn: &Connection,
        cocktail_id: i64,
    ) -> DbResult<Vec<CocktailIngredientDetail>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT ci.id, ci.ingredient_id, i.name AS ingredient_name,
                   ci.amount, u.symbol AS unit, u.ml, ci.after_technique
            FROM cocktail_ingredients ci
            INNER JOIN ingredients i ON ci.ingredient_id = i.id
            INNER JOIN units u ON ci.unit_id = u.id
            WHERE ci.cocktail_id = ?1
            ORDER BY ci.position, ci.id
            "#,
        )?;

        let rows = stmt
            .query_map([cocktail_id], |row| {
                Ok((
                    row.get::<_, i64>("id")?,
                    row.get::<_, i64>("ingredient_id")?,
                    row.get::<_, String>("ingredient_name")?,
                    row.get::<_, f64>("amount")?,
                    row.get::<_, String>("unit")?,
                    row.get::<_, Option<f64>>("ml")?,
                    row.get::<_, i32>("after_technique")? != 0,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, ingredient_id, ingredient_name, amount, unit, ml, after_technique)| {
                let amount = NonNegative::new(amount)
                    .ok_or_else(|| DbError::InvalidData(format!("negative amount on {}", id)))?;
                let ml_per_unit = ml.and_then(NonNegative::new).ok_or_else(|| {
                    DbError::InvalidData(format!("unit '{}' has no ml factor", unit))
                })?;

                Ok(CocktailIngredientDetail {
                    id,
                    ingredient_id,
                    ingredient_name,
                    amount,
                    unit,
                    ml_per_unit,
                    after_technique,
                    contents: Ingredient::load_contents(conn, ingredient_id)?,
                })
            })
            .collect()
    }

    /// Update a cocktail ingredient
    pub fn update(
        conn: &Connection,
        id: i64,
        data: &CocktailIngredientUpdate,
    ) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(amount) = data.amount {
            updates.push(format!("amount = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(amount.get()));
        }
        if let Some(unit_id) = data.unit_id {
            Unit::require_volume(conn, unit_id)?;
            updates.push(format!("unit_id = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(unit_id));
        }
        if let Some(after) = data.after_technique {
            updates.push(format!("after_technique = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(after as i32));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE cocktail_ingredients SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Move an ingredient to the front of its cocktail, keeping the others in order
    pub fn move_to_front(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let item = match Self::get_by_id(conn, id)? {
            Some(item) => item,
            None => return Ok(None),
        };

        let tx = conn.unchecked_transaction()?;
        tx.execute(
            r#"
            UPDATE cocktail_ingredients SET position = position + 1
            WHERE cocktail_id = ?1 AND position < ?2
            "#,
            params![item.cocktail_id, item.position],
        )?;
        tx.execute(
            "UPDATE cocktail_ingredients SET position = 0 WHERE id = ?1",
            [id],
        )?;
        tx.commit()?;

        Self::get_by_id(conn, id)
    }

    /// Remove an ingredient from a cocktail
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM cocktail_ingredients WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
