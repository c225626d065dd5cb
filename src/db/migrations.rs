//! Database migrations
//!
//! Schema creation, migration logic and catalog seed data.

use rusqlite::{params, Connection};

use super::connection::DbResult;
use crate::mixology::{ml_per_unit, BalanceProperty, TechniqueCode, UnitKind};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Seeded units: (name, symbol, kind); volume factors come from `ml_per_unit`
const SEED_UNITS: &[(&str, &str, UnitKind)] = &[
    ("Ounce", "oz", UnitKind::Volume),
    ("Milliliter", "ml", UnitKind::Volume),
    ("Centiliter", "cl", UnitKind::Volume),
    ("Dash", "dash", UnitKind::Volume),
    ("Drop", "drop", UnitKind::Volume),
    ("Teaspoon", "tsp", UnitKind::Volume),
    ("ABV", "%", UnitKind::Percentage),
    ("Sugar", "%", UnitKind::Percentage),
    ("Acid", "%", UnitKind::Percentage),
];

/// Default balance windows per technique: volume (oz), ABV, sugar, acid, dilution
const SEED_TECHNIQUE_RANGES: &[(TechniqueCode, [(f64, f64); 5])] = &[
    (TechniqueCode::Built, [(2.5, 3.25), (24.0, 32.0), (6.0, 9.0), (0.0, 0.2), (24.0, 24.0)]),
    (TechniqueCode::Stirred, [(3.0, 4.0), (21.0, 29.0), (3.0, 7.0), (0.0, 0.2), (40.0, 50.0)]),
    (TechniqueCode::Shaken, [(4.5, 5.5), (15.0, 20.0), (6.5, 9.0), (1.0, 1.5), (50.0, 60.0)]),
    (TechniqueCode::ShakenWithEgg, [(5.0, 6.5), (12.0, 16.0), (6.0, 8.5), (0.8, 1.2), (45.0, 55.0)]),
    (TechniqueCode::Blended, [(6.0, 8.0), (8.0, 12.0), (8.0, 11.0), (0.8, 1.3), (85.0, 95.0)]),
    (TechniqueCode::Carbonated, [(4.5, 6.0), (12.0, 16.0), (5.0, 7.5), (0.3, 0.6), (45.0, 60.0)]),
];

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        tracing::info!("Applying schema migration v1");
        let tx = conn.unchecked_transaction()?;
        migrate_v1(&tx)?;
        seed_catalog(&tx)?;
        tx.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- UNITS
        -- Volume units dose ingredients; percentage units label ranges
        -- ============================================
        CREATE TABLE units (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            symbol TEXT NOT NULL,
            kind TEXT NOT NULL CHECK(kind IN ('VOLUME', 'PERCENTAGE')),
            ml REAL,                             -- null for percentage units

            CHECK ((kind = 'VOLUME' AND ml IS NOT NULL AND ml >= 0) OR
                   (kind = 'PERCENTAGE' AND ml IS NULL))
        );

        -- ============================================
        -- INGREDIENTS
        -- ============================================
        CREATE TABLE ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_ingredients_name ON ingredients(name);

        -- Declared percentage-by-volume contents, one per property
        CREATE TABLE ingredient_ranges (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE CASCADE,
            property TEXT NOT NULL CHECK(property IN ('ABV', 'Sugar', 'Acid')),
            amount REAL NOT NULL CHECK(amount >= 0),

            UNIQUE(ingredient_id, property)
        );

        CREATE INDEX idx_ingredient_ranges_ingredient ON ingredient_ranges(ingredient_id);

        -- ============================================
        -- TECHNIQUES
        -- ============================================
        CREATE TABLE techniques (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE CHECK(code IN
                ('BUILT', 'STIRRED', 'SHAKEN', 'SHAKEN_WITH_EGG', 'BLENDED', 'CARBONATED'))
        );

        -- Balance windows, compared against computed profiles
        CREATE TABLE technique_ranges (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            technique_id INTEGER NOT NULL REFERENCES techniques(id) ON DELETE CASCADE,
            property TEXT NOT NULL CHECK(property IN ('Ounce', 'ABV', 'Sugar', 'Acid', 'Dilution')),
            min REAL NOT NULL CHECK(min >= 0),
            max REAL NOT NULL,

            CHECK (min <= max),
            UNIQUE(technique_id, property)
        );

        -- ============================================
        -- COCKTAILS
        -- ============================================
        CREATE TABLE cocktails (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            technique_id INTEGER NOT NULL REFERENCES techniques(id) ON DELETE RESTRICT,
            garnish TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_cocktails_name ON cocktails(name);

        -- Dosed ingredients, ordered by position
        CREATE TABLE cocktail_ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cocktail_id INTEGER NOT NULL REFERENCES cocktails(id) ON DELETE CASCADE,
            ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE RESTRICT,
            unit_id INTEGER NOT NULL REFERENCES units(id) ON DELETE RESTRICT,
            amount REAL NOT NULL CHECK(amount >= 0),
            after_technique INTEGER NOT NULL DEFAULT 0,   -- boolean
            position INTEGER NOT NULL,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(cocktail_id, ingredient_id)
        );

        CREATE INDEX idx_cocktail_ingredients_cocktail ON cocktail_ingredients(cocktail_id);
        CREATE INDEX idx_cocktail_ingredients_ingredient ON cocktail_ingredients(ingredient_id);

        -- Recipe steps, ordered by position
        CREATE TABLE cocktail_steps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            cocktail_id INTEGER NOT NULL REFERENCES cocktails(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_cocktail_steps_cocktail ON cocktail_steps(cocktail_id);
        "#,
    )?;

    Ok(())
}

/// Insert the unit catalog and the six techniques with default balance windows
fn seed_catalog(conn: &Connection) -> DbResult<()> {
    for (name, symbol, kind) in SEED_UNITS {
        let ml = match kind {
            UnitKind::Volume => ml_per_unit(symbol),
            UnitKind::Percentage => None,
        };
        conn.execute(
            "INSERT INTO units (name, symbol, kind, ml) VALUES (?1, ?2, ?3, ?4)",
            params![name, symbol, kind.to_db_str(), ml],
        )?;
    }

    for (code, windows) in SEED_TECHNIQUE_RANGES {
        conn.execute(
            "INSERT INTO techniques (name, code) VALUES (?1, ?2)",
            params![code.display_name(), code.as_str()],
        )?;
        let technique_id = conn.last_insert_rowid();

        for (property, (min, max)) in BalanceProperty::ALL.iter().zip(windows.iter()) {
            conn.execute(
                "INSERT INTO technique_ranges (technique_id, property, min, max)
                 VALUES (?1, ?2, ?3, ?4)",
                params![technique_id, property.as_str(), min, max],
            )?;
        }
    }

    tracing::info!(
        units = SEED_UNITS.len(),
        techniques = SEED_TECHNIQUE_RANGES.len(),
        "Seeded cocktail catalog"
    );
    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_seed_catalog_once() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_migration(&conn).unwrap_or(true));

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());

        let units: i64 = conn.query_row("SELECT COUNT(*) FROM units", [], |r| r.get(0)).unwrap();
        let unpriced: i64 = conn
            .query_row("SELECT COUNT(*) FROM units WHERE kind = 'VOLUME' AND ml IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(unpriced, 0);
        let techniques: i64 =
            conn.query_row("SELECT COUNT(*) FROM techniques", [], |r| r.get(0)).unwrap();
        let ranges: i64 =
            conn.query_row("SELECT COUNT(*) FROM technique_ranges", [], |r| r.get(0)).unwrap();
        assert_eq!(units, 9);
        assert_eq!(techniques, 6);
        assert_eq!(ranges, 30);
    }

    #[test]
    fn test_failed_migration_can_be_retried() {
        let conn = Connection::open_in_memory().unwrap();
        // Collides with the last table v1 creates
        conn.execute_batch("CREATE TABLE cocktail_steps (id INTEGER PRIMARY KEY);").unwrap();

        assert!(run_migrations(&conn).is_err());
        assert_eq!(get_schema_version(&conn).unwrap(), 0);
        let leftover: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE name = 'units'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(leftover, 0);

        conn.execute_batch("DROP TABLE cocktail_steps;").unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_percentage_units_reject_ml() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO units (name, symbol, kind, ml) VALUES ('Salt', '%', 'PERCENTAGE', 1.0)",
            [],
        );
        assert!(result.is_err());
    }
}
