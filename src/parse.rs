use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static MONEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$?(\d[\d,]*(?:\.\d+)?)").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{4})").unwrap());

/// Raw field could not be normalized to a number. Recoverable: callers
/// substitute a default and log.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no dollar amount found in '{0}'")]
pub struct FormatError(pub String);

/// Extracts the first `$1,234.56`-style amount from a loosely formatted field.
/// Whether the figure is annual or monthly is the caller's business.
pub fn parse_money(raw: &str) -> Result<f64, FormatError> {
    let caps = MONEY_RE
        .captures(raw)
        .ok_or_else(|| FormatError(raw.to_string()))?;
    caps[1]
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| FormatError(raw.to_string()))
}

/// Pulls a plausible build year out of strings like "Built in 1998" and turns
/// it into an age. Years outside 1800..=current_year are treated as noise.
pub fn property_age_from_year_built(raw: &str, current_year: i32) -> Option<u32> {
    let caps = YEAR_RE.captures(raw)?;
    let year: i32 = caps[1].parse().ok()?;
    if (1800..=current_year).contains(&year) {
        Some((current_year - year) as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_decorated_amounts() {
        assert_eq!(parse_money("$2,999").unwrap(), 2999.0);
        assert_eq!(parse_money("2999").unwrap(), 2999.0);
        assert_eq!(parse_money("$1,234.56 / year").unwrap(), 1234.56);
        assert_eq!(parse_money("Tax Information: $9,600 annually").unwrap(), 9600.0);
        assert_eq!(parse_money("3542.5").unwrap(), 3542.5);
    }

    #[test]
    fn rejects_text_without_an_amount() {
        assert!(parse_money("call for details").is_err());
        assert!(parse_money("").is_err());
        assert!(parse_money("$").is_err());
    }

    #[test]
    fn year_built_extraction() {
        assert_eq!(property_age_from_year_built("Built in 1998", 2026), Some(28));
        assert_eq!(property_age_from_year_built("1998", 2026), Some(28));
        assert_eq!(property_age_from_year_built("2026", 2026), Some(0));
        // Future years and pre-1800 noise are ignored.
        assert_eq!(property_age_from_year_built("2099", 2026), None);
        assert_eq!(property_age_from_year_built("1555", 2026), None);
        assert_eq!(property_age_from_year_built("unknown", 2026), None);
    }
}
