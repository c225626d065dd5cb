//! Barkeep Status Tool
//!
//! Provides runtime status information about the Barkeep service, and the
//! usage guide served to assistants.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Cocktail building instructions for AI assistants
pub const INSTRUCTIONS: &str = r#"
# Barkeep Instructions

Barkeep stores ingredients, techniques and cocktails, and computes the
physical profile of every cocktail: final volume, ABV, sugar, acid and
the dilution its technique adds.

## Overview

To build a cocktail, you need:
1. **Ingredients** - declared ABV, sugar and acid as percentages (0-100)
2. **A technique** - BUILT, STIRRED, SHAKEN, SHAKEN_WITH_EGG, BLENDED or CARBONATED
3. **Doses** - an amount and a volume unit per ingredient

---

## Units

Doses use volume units only:

| Symbol | Milliliters |
|--------|-------------|
| oz     | 30          |
| ml     | 1           |
| cl     | 10          |
| dash   | 0.9         |
| drop   | 0.05        |
| tsp    | 5           |

ABV, Sugar and Acid are percentage units. They describe ingredients and
cannot dose one. Call `list_units` for the full catalog.

---

## How the Profile Is Computed

1. Initial volume is the sum of every dose in ml.
2. ABV before the technique counts alcohol from doses that are NOT marked
   `after_technique`, over the full initial volume.
3. Dilution follows from that ABV and the technique:
   - BUILT: 24%
   - STIRRED: (-1.21a² + 1.246a + 0.145) × 100
   - SHAKEN, SHAKEN_WITH_EGG, CARBONATED: (1.567a² + 1.742a + 0.203) × 100
   - BLENDED: 90%
   where `a` is the ABV as a fraction.
4. Final volume is the initial volume × (1 + dilution / 100).
5. Final ABV, sugar and acid are every dose's content over the final volume.

Ingredients with no declared value for a property contribute nothing to it.

---

## Balance

Each technique declares min/max windows for volume (oz), ABV, sugar, acid
and dilution. `get_cocktail` reports each declared window with a verdict:
`low`, `balanced` or `high`. Use `set_technique_range` to tune a window,
and `export_balance_chart` to draw the windows against the cocktail.

---

## Workflow

1. `search_ingredients` before `add_ingredient` to avoid duplicates.
2. `preview_cocktail_profile` to try doses without saving anything.
3. `create_cocktail` with the technique, doses, steps and garnish.
4. Adjust with `update_cocktail_ingredient`, then read the new verdicts.

Mark top-ups and floats (soda, sparkling wine) with `after_technique: true`.
An ingredient used by any cocktail cannot be deleted.
"#;

/// Runtime status of the Barkeep service
#[derive(Debug, Clone, Serialize)]
pub struct BarkeepStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub started_at: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> BarkeepStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        BarkeepStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            started_at: self.started_at.to_rfc3339(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_missing_database() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/barkeep.db"));
        let status = tracker.get_status();
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.database_path, "/nonexistent/barkeep.db");
    }

    #[test]
    fn test_instructions_cover_every_technique() {
        for code in crate::mixology::TechniqueCode::ALL {
            assert!(INSTRUCTIONS.contains(code.as_str()), "missing {}", code);
        }
    }
}
