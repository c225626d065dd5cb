//! Ingredient model
//!
//! Represents an ingredient and its declared chemical ranges.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::mixology::{ChemicalContents, ChemicalProperty, NonNegative};

/// An ingredient with its declared contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub contents: ChemicalContents,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new ingredient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientCreate {
    pub name: String,
    #[serde(default)]
    pub contents: ChemicalContents,
}

/// Data for updating an ingredient; provided ranges replace existing ones
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientUpdate {
    pub name: Option<String>,
    #[serde(default)]
    pub contents: ChemicalContents,
}

impl Ingredient {
    /// Create an Ingredient from a database row (contents loaded separately)
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            contents: ChemicalContents::default(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn with_contents(conn: &Connection, mut item: Self) -> DbResult<Self> {
        item.contents = Self::load_contents(conn, item.id)?;
        Ok(item)
    }

    /// Load the declared ranges of an ingredient
    pub fn load_contents(conn: &Connection, id: i64) -> DbResult<ChemicalContents> {
        let mut stmt = conn.prepare(
            "SELECT property, amount FROM ingredient_ranges WHERE ingredient_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map([id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut contents = ChemicalContents::default();
        for (name, amount) in rows {
            let property = ChemicalProperty::from_name(&name)
                .ok_or_else(|| DbError::InvalidData(format!("unknown range '{}'", name)))?;
            let amount = NonNegative::new(amount)
                .ok_or_else(|| DbError::InvalidData(format!("negative {} range", name)))?;
            contents.declare(property, amount);
        }
        Ok(contents)
    }

    /// Insert or replace one declared range
    pub fn set_range(
        conn: &Connection,
        id: i64,
        property: ChemicalProperty,
        amount: NonNegative,
    ) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO ingredient_ranges (ingredient_id, property, amount)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(ingredient_id, property) DO UPDATE SET amount = excluded.amount
            "#,
            params![id, property.name(), amount.get()],
        )?;
        Ok(())
    }

    /// Insert a new ingredient into the database
    pub fn create(conn: &Connection, data: &IngredientCreate) -> DbResult<Self> {
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO ingredients (name) VALUES (?1)",
            params![data.name.trim()],
        )?;

        let id = tx.last_insert_rowid();
        for (property, amount) in data.contents.declared() {
            Self::set_range(&tx, id, property, amount)?;
        }
        tx.commit()?;

        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "Ingredient", id })
    }

    /// Get an ingredient by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(Self::with_contents(conn, item)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search ingredients by name
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        Self::list(conn, Some(query), limit, 0)
    }

    /// List ingredients, optionally filtered by name
    pub fn list(
        conn: &Connection,
        query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query.unwrap_or("").trim());
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM ingredients
            WHERE name LIKE ?1
            ORDER BY name ASC, id ASC
            LIMIT ?2 OFFSET ?3
            "#,
        )?;

        let items = stmt
            .query_map(params![pattern, limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        items
            .into_iter()
            .map(|item| Self::with_contents(conn, item))
            .collect()
    }

    /// Count ingredients matching an optional name filter
    pub fn count(conn: &Connection, query: Option<&str>) -> DbResult<i64> {
        let pattern = format!("%{}%", query.unwrap_or("").trim());
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM ingredients WHERE name LIKE ?1",
            [pattern],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Update an ingredient
    pub fn update(conn: &Connection, id: i64, data: &IngredientUpdate) -> DbResult<Option<Self>> {
        if Self::get_by_id(conn, id)?.is_none() {
            return Ok(None);
        }

        let tx = conn.unchecked_transaction()?;
        if let Some(ref name) = data.name {
            tx.execute(
                "UPDATE ingredients SET name = ?1 WHERE id = ?2",
                params![name.trim(), id],
            )?;
        }
        for (property, amount) in data.contents.declared() {
            Self::set_range(&tx, id, property, amount)?;
        }

        tx.execute(
            "UPDATE ingredients SET updated_at = datetime('now') WHERE id = ?1",
            [id],
        )?;
        tx.commit()?;

        Self::get_by_id(conn, id)
    }

    /// Get the number of cocktails using this ingredient
    pub fn get_usage_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cocktail_ingredients WHERE ingredient_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Get cocktail names that use this ingredient
    pub fn get_used_in_cocktails(conn: &Connection, id: i64) -> DbResult<Vec<String>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT c.name FROM cocktails c
            INNER JOIN cocktail_ingredients ci ON c.id = ci.cocktail_id
            WHERE ci.ingredient_id = ?1
            ORDER BY c.name
            "#,
        )?;

        let names = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }

    /// Delete an ingredient
    /// Returns Ok(true) if deleted, Ok(false) if not found
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        // Fails with a foreign key error while a cocktail still doses it
        let rows = conn.execute("DELETE FROM ingredients WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::seeded_conn;

    fn nn(value: f64) -> NonNegative {
        NonNegative::new(value).unwrap()
    }

    fn gin() -> IngredientCreate {
        IngredientCreate {
            name: "  London Dry Gin ".to_string(),
            contents: ChemicalContents { abv: Some(nn(47.0)), ..Default::default() },
        }
    }

    #[test]
    fn test_create_and_get() {
        let conn = seeded_conn();
        let created = Ingredient::create(&conn, &gin()).unwrap();
        assert_eq!(created.name, "London Dry Gin");
        assert_eq!(created.contents.abv, Some(nn(47.0)));
        assert_eq!(created.contents.sugar, None);

        let fetched = Ingredient::get_by_id(&conn, created.id).unwrap().unwrap();
        assert_eq!(fetched.contents, created.contents);
        assert!(Ingredient::get_by_id(&conn, created.id + 100).unwrap().is_none());
    }

    #[test]
    fn test_failed_range_insert_leaves_no_ingredient() {
        let conn = seeded_conn();
        conn.execute_batch(
            "CREATE TRIGGER refuse_ranges BEFORE INSERT ON ingredient_ranges
             BEGIN SELECT RAISE(ABORT, 'refused'); END;",
        )
        .unwrap();

        assert!(Ingredient::create(&conn, &gin()).is_err());
        assert_eq!(Ingredient::count(&conn, None).unwrap(), 0);
    }

    #[test]
    fn test_update_upserts_ranges() {
        let conn = seeded_conn();
        let created = Ingredient::create(&conn, &gin()).unwrap();

        let update = IngredientUpdate {
            name: Some("Old Tom Gin".to_string()),
            contents: ChemicalContents {
                abv: Some(nn(40.0)),
                sugar: Some(nn(3.0)),
                acid: None,
            },
        };
        let updated = Ingredient::update(&conn, created.id, &update).unwrap().unwrap();
        assert_eq!(updated.name, "Old Tom Gin");
        assert_eq!(updated.contents.abv, Some(nn(40.0)));
        assert_eq!(updated.contents.sugar, Some(nn(3.0)));

        assert!(Ingredient::update(&conn, 4242, &update).unwrap().is_none());
    }

    #[test]
    fn test_list_search_and_count() {
        let conn = seeded_conn();
        for name in ["Lime Juice", "Lemon Juice", "Simple Syrup"] {
            let data = IngredientCreate { name: name.to_string(), ..Default::default() };
            Ingredient::create(&conn, &data).unwrap();
        }

        let juices = Ingredient::search(&conn, "juice", 10).unwrap();
        let names: Vec<_> = juices.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Lemon Juice", "Lime Juice"]);

        assert_eq!(Ingredient::count(&conn, None).unwrap(), 3);
        assert_eq!(Ingredient::count(&conn, Some("syrup")).unwrap(), 1);

        let page = Ingredient::list(&conn, None, 2, 2).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Simple Syrup");
    }

    #[test]
    fn test_delete() {
        let conn = seeded_conn();
        let created = Ingredient::create(&conn, &gin()).unwrap();
        assert!(Ingredient::delete(&conn, created.id).unwrap());
        assert!(!Ingredient::delete(&conn, created.id).unwrap());

        let ranges: i64 = conn
            .query_row("SELECT COUNT(*) FROM ingredient_ranges", [], |r| r.get(0))
            .unwrap();
        assert_eq!(ranges, 0);
    }
}
