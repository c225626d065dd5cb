//! Build script for Barkeep
//!
//! Bumps the build counter and embeds build metadata for build_info.rs.

use std::fs;
use std::path::Path;

const BUILD_NUMBER_FILE: &str = "build_number.txt";

/// Last recorded build number; a missing or garbled file counts as 0
fn read_build_number(path: &Path) -> u64 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn main() {
    // Rerun only when sources change
    println!("cargo:rerun-if-changed=src");

    let path = Path::new(BUILD_NUMBER_FILE);
    let build_number = read_build_number(path) + 1;
    fs::write(path, build_number.to_string()).expect("Failed to write build number file");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=BARKEEP_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=BARKEEP_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:warning=Barkeep build #{} at {}", build_number, timestamp);
}
