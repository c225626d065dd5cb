//! Barkeep
//!
//! An MCP server for building cocktails and computing their profiles.

use std::path::PathBuf;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use barkeep::mcp::BarkeepService;
use barkeep::{build_info, db};

/// Get the database path from environment or use default
fn get_database_path() -> PathBuf {
    std::env::var("BARKEEP_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging goes to stderr; stdout carries the MCP stream
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("barkeep=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let db_path = get_database_path();
    eprintln!("Database path: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = db::Database::new(&db_path)?;

    database.with_conn(|conn| {
        if db::migrations::needs_migration(conn)? {
            eprintln!("Applying database migrations...");
        }
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        tracing::info!(version, "Database schema ready");
        Ok(())
    })?;

    let service = BarkeepService::new(db_path, database);

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;

    server.waiting().await?;

    Ok(())
}
