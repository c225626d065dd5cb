//! Print the computed profile and balance of stored cocktails
//! Usage: cargo run --bin show_profile -- [cocktail_id]

use std::path::PathBuf;

use barkeep::tools::cocktails::{self, CocktailDetail};

fn get_database_path() -> PathBuf {
    std::env::var("BARKEEP_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("barkeep.db");
            path
        })
}

fn print_cocktail(cocktail: &CocktailDetail) {
    println!("\n{} (#{}) - {}", cocktail.name, cocktail.id, cocktail.technique.name);
    for item in &cocktail.ingredients {
        let timing = if item.after_technique { " [after technique]" } else { "" };
        println!("  {} {} {}{}", item.amount, item.unit, item.ingredient_name, timing);
    }
    println!("  {}", cocktail.profile);
    for check in &cocktail.balance {
        println!(
            "    {:<10} {:>8.2} in {:.2}..{:.2}  {:?}",
            check.property.title(),
            check.value.get(),
            check.min.get(),
            check.max.get(),
            check.verdict,
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cocktail_id: Option<i64> = match std::env::args().nth(1) {
        Some(arg) => Some(arg.parse()?),
        None => None,
    };

    let db_path = get_database_path();
    println!("Database: {}", db_path.display());

    let database = barkeep::db::Database::new(&db_path)?;
    database.with_conn(barkeep::db::migrations::run_migrations)?;

    let ids: Vec<i64> = match cocktail_id {
        Some(id) => vec![id],
        None => cocktails::list_cocktails(&database, None, 200, 0)?
            .cocktails
            .iter()
            .map(|c| c.id)
            .collect(),
    };

    if ids.is_empty() {
        println!("No cocktails stored");
    }

    for id in ids {
        match cocktails::get_cocktail(&database, id)? {
            Some(cocktail) => print_cocktail(&cocktail),
            None => println!("\nCocktail not found: {}", id),
        }
    }

    Ok(())
}
