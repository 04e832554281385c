use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// League shape for one season: how many clubs, how many go down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonFormat {
    pub roster_size: usize,
    pub relegation_slots: usize,
}

impl SeasonFormat {
    pub const fn new(roster_size: usize, relegation_slots: usize) -> Self {
        Self { roster_size, relegation_slots }
    }

    /// Last non-relegated position, e.g. 17th of 20 under a 3-down format.
    pub fn safety_position(&self) -> usize {
        self.roster_size - self.relegation_slots
    }

    /// Matches each club plays over a full home-and-away season.
    pub fn full_schedule_games(&self) -> u32 {
        (2 * (self.roster_size - 1)) as u32
    }
}

impl Default for SeasonFormat {
    fn default() -> Self {
        Self::new(20, 3)
    }
}

// English top flight since 1992-93. The league ran 22 clubs until it was cut
// to 20 by sending four sides down in 1994-95; every season since is 20/3.
static HISTORICAL_FORMATS: Lazy<HashMap<&'static str, SeasonFormat>> = Lazy::new(|| {
    HashMap::from([
        ("1992-93", SeasonFormat::new(22, 3)),
        ("1993-94", SeasonFormat::new(22, 3)),
        ("1994-95", SeasonFormat::new(22, 4)),
    ])
});

/// Format for a season, with explicit overrides taking precedence over the
/// built-in historical table.
pub fn format_for_season(season: &str, overrides: &HashMap<String, SeasonFormat>) -> SeasonFormat {
    if let Some(format) = overrides.get(season) {
        return *format;
    }
    HISTORICAL_FORMATS.get(season).copied().unwrap_or_default()
}

/// Load per-season format overrides from a JSON file keyed by season id,
/// e.g. `{"1987-88": {"roster_size": 21, "relegation_slots": 3}}`.
pub fn load_format_overrides(path: &Path) -> Result<HashMap<String, SeasonFormat>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read season formats {}", path.display()))?;
    serde_json::from_str(&raw).context("parse season formats json")
}
