//! Barkeep Library
//!
//! Cocktail catalog with profile, dilution and balance calculations.

pub mod build_info;
pub mod db;
pub mod mcp;
pub mod mixology;
pub mod models;
pub mod tools;
