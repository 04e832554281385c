use std::collections::HashMap;

use once_cell::sync::Lazy;

// Spellings drift across eras of the source files; each alias maps to the
// canonical name used everywhere downstream. No canonical name appears as a
// key, so the lookup is idempotent.
static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Man United", "Manchester Utd"),
        ("Manchester United", "Manchester Utd"),
        ("Man City", "Manchester City"),
        ("Leicester", "Leicester City"),
        ("Wolves", "Wolverhampton"),
        ("Wolverhampton Wanderers", "Wolverhampton"),
        ("Tottenham", "Tottenham Hotspur"),
        ("Spurs", "Tottenham Hotspur"),
        ("Newcastle", "Newcastle Utd"),
        ("Newcastle United", "Newcastle Utd"),
        ("West Ham", "West Ham United"),
    ])
});

/// Canonical spelling for a raw team name. Unknown names pass through
/// unchanged; they only risk under-matching across seasons, which is not an
/// error here.
pub fn canonical_team_name(raw: &str) -> String {
    let trimmed = raw.trim();
    match ALIASES.get(trimmed) {
        Some(name) => (*name).to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::canonical_team_name;

    #[test]
    fn maps_known_aliases() {
        assert_eq!(canonical_team_name("Man United"), "Manchester Utd");
        assert_eq!(canonical_team_name("Spurs"), "Tottenham Hotspur");
        assert_eq!(canonical_team_name("  West Ham "), "West Ham United");
    }

    #[test]
    fn unknown_names_pass_through() {
        assert_eq!(canonical_team_name("Accrington Stanley"), "Accrington Stanley");
    }

    #[test]
    fn idempotent_on_canonical_names() {
        for alias in ["Man City", "Newcastle", "Wolves"] {
            let once = canonical_team_name(alias);
            assert_eq!(canonical_team_name(&once), once);
        }
    }
}
