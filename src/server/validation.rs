//! Request input validation.
//!
//! Every path and query parameter is validated and sanitized here before
//! it can reach cache-key derivation or the upstream client. Sanitized
//! outputs are safe to embed in cache keys and URL-encoded upstream
//! query parameters.

use crate::error::LoungeError;

/// Longest player name accepted, in characters.
pub const MAX_PLAYER_NAME_LENGTH: usize = 50;

/// Longest search term forwarded upstream, in characters.
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Table IDs are numeric with a bounded digit count.
const MAX_TABLE_ID_DIGITS: usize = 10;

/// Games the upstream ranking service supports.
pub const SUPPORTED_GAMES: &[&str] = &["mkworld"];

/// Season used when a request omits one.
pub const DEFAULT_SEASON: u32 = 1;

/// Highest season number the upstream accepts. 0 is the pre-season and
/// is a valid value, not a missing one.
const MAX_SEASON: u32 = 100;

/// Strip ASCII control characters (0x00–0x1F, 0x7F) that could corrupt
/// cache keys or log lines.
fn strip_control_chars(value: &str) -> String {
    value.chars().filter(|c| !c.is_ascii_control()).collect()
}

/// Validate and sanitize a player name.
pub fn player_name(raw: &str) -> Result<String, LoungeError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(LoungeError::InvalidInput(
            "Player name cannot be empty".to_string(),
        ));
    }

    if trimmed.chars().count() > MAX_PLAYER_NAME_LENGTH {
        return Err(LoungeError::InvalidInput(format!(
            "Player name cannot exceed {MAX_PLAYER_NAME_LENGTH} characters"
        )));
    }

    Ok(strip_control_chars(trimmed))
}

/// Validate a season number.
pub fn season(raw: &str) -> Result<u32, LoungeError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(LoungeError::InvalidInput("Season is required".to_string()));
    }

    match trimmed.parse::<u32>() {
        Ok(value) if value <= MAX_SEASON => Ok(value),
        _ => Err(LoungeError::InvalidInput(format!(
            "Season must be a whole number between 0 and {MAX_SEASON}"
        ))),
    }
}

/// Validate an optional season query parameter, falling back to
/// [`DEFAULT_SEASON`] when absent.
pub fn season_or_default(raw: Option<&str>) -> Result<u32, LoungeError> {
    match raw {
        Some(value) => season(value),
        None => Ok(DEFAULT_SEASON),
    }
}

/// Validate a game identifier against the allow-set. Unsupported games
/// are rejected instead of being forwarded upstream blindly.
pub fn game(raw: &str) -> Result<String, LoungeError> {
    let normalized = raw.trim().to_ascii_lowercase();

    if SUPPORTED_GAMES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(LoungeError::InvalidInput("Unsupported game".to_string()))
    }
}

/// Validate a table ID: 1–10 ASCII digits, nothing else. Keeps arbitrary
/// input out of the upstream table-lookup URL.
pub fn table_id(raw: &str) -> Result<String, LoungeError> {
    let trimmed = raw.trim();

    let numeric = !trimmed.is_empty()
        && trimmed.len() <= MAX_TABLE_ID_DIGITS
        && trimmed.bytes().all(|b| b.is_ascii_digit());

    if numeric {
        Ok(trimmed.to_string())
    } else {
        Err(LoungeError::InvalidInput(
            "Table ID must be a number".to_string(),
        ))
    }
}

/// Sanitize a leaderboard search term: trim, cap the length, strip
/// control characters. Empty after sanitizing means "no search filter",
/// not an error.
pub fn search_term(raw: &str) -> Option<String> {
    let sanitized: String = raw
        .trim()
        .chars()
        .take(MAX_SEARCH_LENGTH)
        .filter(|c| !c.is_ascii_control())
        .collect();

    (!sanitized.is_empty()).then_some(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Player name ---

    #[test]
    fn player_name_trims_and_strips_control_chars() {
        assert_eq!(player_name("  Bob\x01\x02  ").unwrap(), "Bob");
    }

    #[test]
    fn player_name_rejects_empty() {
        assert!(player_name("").is_err());
        assert!(player_name("   ").is_err());
    }

    #[test]
    fn player_name_rejects_over_length() {
        assert!(player_name(&"x".repeat(51)).is_err());
        assert!(player_name(&"x".repeat(50)).is_ok());
    }

    #[test]
    fn player_name_length_checked_after_trim() {
        let padded = format!("  {}  ", "x".repeat(50));
        assert!(player_name(&padded).is_ok());
    }

    #[test]
    fn player_name_keeps_unicode() {
        assert_eq!(player_name("Måns").unwrap(), "Måns");
    }

    // --- Season ---

    #[test]
    fn season_zero_is_valid() {
        assert_eq!(season("0").unwrap(), 0);
    }

    #[test]
    fn season_parses_in_range() {
        assert_eq!(season("1").unwrap(), 1);
        assert_eq!(season("100").unwrap(), 100);
        assert_eq!(season(" 7 ").unwrap(), 7);
    }

    #[test]
    fn season_rejects_out_of_range_and_garbage() {
        assert!(season("101").is_err());
        assert!(season("-1").is_err());
        assert!(season("abc").is_err());
        assert!(season("1.5").is_err());
        assert!(season("").is_err());
    }

    #[test]
    fn season_or_default_falls_back() {
        assert_eq!(season_or_default(None).unwrap(), DEFAULT_SEASON);
        assert_eq!(season_or_default(Some("0")).unwrap(), 0);
        assert!(season_or_default(Some("nope")).is_err());
    }

    // --- Game ---

    #[test]
    fn game_normalizes_case_and_whitespace() {
        assert_eq!(game(" MKWorld ").unwrap(), "mkworld");
    }

    #[test]
    fn game_rejects_unsupported() {
        assert!(game("mk8dx").is_err());
        assert!(game("").is_err());
    }

    // --- Table ID ---

    #[test]
    fn table_id_accepts_bounded_digits() {
        assert_eq!(table_id("42").unwrap(), "42");
        assert_eq!(table_id("1234567890").unwrap(), "1234567890");
    }

    #[test]
    fn table_id_rejects_non_numeric() {
        assert!(table_id("").is_err());
        assert!(table_id("12a").is_err());
        assert!(table_id("-5").is_err());
        assert!(table_id("12345678901").is_err());
        assert!(table_id("1;DROP").is_err());
    }

    // --- Search term ---

    #[test]
    fn search_term_sanitizes() {
        assert_eq!(search_term("  bob\x1f  "), Some("bob".to_string()));
    }

    #[test]
    fn search_term_truncates_to_limit() {
        let long = "y".repeat(150);
        assert_eq!(search_term(&long).unwrap().chars().count(), 100);
    }

    #[test]
    fn empty_search_means_no_filter() {
        assert_eq!(search_term(""), None);
        assert_eq!(search_term("   "), None);
        assert_eq!(search_term("\x01\x02"), None);
    }
}
