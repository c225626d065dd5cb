//! Barkeep Tools module
//!
//! MCP tool implementations for the cocktail catalog.

pub mod charts;
pub mod cocktails;
pub mod ingredients;
pub mod status;
pub mod techniques;
