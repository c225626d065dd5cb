//! Data models
//!
//! Rust structs representing database entities.

mod cocktail;
mod cocktail_ingredient;
mod cocktail_step;
mod ingredient;
mod technique;
mod unit;

pub use cocktail::{cocktail_profile, profile_of_details, Cocktail, CocktailCreate, CocktailUpdate};
pub use cocktail_ingredient::{
    CocktailIngredient, CocktailIngredientCreate, CocktailIngredientDetail,
    CocktailIngredientUpdate,
};
pub use cocktail_step::CocktailStep;
pub use ingredient::{Ingredient, IngredientCreate, IngredientUpdate};
pub use technique::Technique;
pub use unit::Unit;

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;

    /// Fresh in-memory database with the seeded catalog
    pub fn seeded_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        crate::db::migrations::run_migrations(&conn).unwrap();
        conn
    }
}
