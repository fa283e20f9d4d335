//! Code for selecting years from a year string.
use crate::input::is_sorted_and_unique;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;

/// Parse a single year and check that data is available for it
fn parse_available_year(s: &str, available_years: &[u32]) -> Option<u32> {
    let year = s.trim().parse::<u32>().ok()?;
    available_years.binary_search(&year).ok().map(|_| year)
}

/// Parse a year string into a list of years.
///
/// The string can be "all" (case-insensitive), a single year, a semicolon-separated list of years
/// (e.g. "2030;2050") or a range (e.g. "2030..2050", "2040.." or "..2040"). Ranges select the
/// available years which fall within them.
///
/// # Arguments
///
/// - `s` - Input string to parse
/// - `available_years` - The years for which there is data (must be sorted and unique)
///
/// # Returns
///
/// A [`Vec`] of years in ascending order or an error.
///
/// # Panics
///
/// If `available_years` is unsorted or non-unique.
pub fn parse_year_str(s: &str, available_years: &[u32]) -> Result<Vec<u32>> {
    // We depend on this for the binary search
    assert!(
        is_sorted_and_unique(available_years),
        "`available_years` must be sorted and unique"
    );

    let s = s.trim();
    ensure!(!s.is_empty(), "No years provided");

    if s.eq_ignore_ascii_case("all") {
        return Ok(available_years.to_vec());
    }

    if let Some((start, end)) = s.split_once("..") {
        ensure!(
            !s.contains(';'),
            "Year string {s} mixes a range with a list of years"
        );
        return parse_year_range(start, end, available_years)
            .with_context(|| format!("Invalid year range: {s}"));
    }

    let years: Vec<_> = s
        .split(';')
        .map(|y| {
            parse_available_year(y, available_years)
                .with_context(|| format!("Invalid year: {}", y.trim()))
        })
        .try_collect()?;
    ensure!(
        is_sorted_and_unique(&years),
        "Years must be in order and unique"
    );

    Ok(years)
}

/// Select the available years between `start` and `end` (inclusive).
///
/// Either limit may be empty, in which case the first or last available year is used.
fn parse_year_range(start: &str, end: &str, available_years: &[u32]) -> Result<Vec<u32>> {
    let parse_limit = |limit: &str, default: Option<&u32>| -> Result<u32> {
        let limit = limit.trim();
        if limit.is_empty() {
            default.copied().context("No years available")
        } else {
            limit
                .parse()
                .with_context(|| format!("Invalid year: {limit}"))
        }
    };
    let start = parse_limit(start, available_years.first())?;
    let end = parse_limit(end, available_years.last())?;
    ensure!(end >= start, "End year must not be before start year");

    let years = available_years
        .iter()
        .copied()
        .filter(|year| (start..=end).contains(year))
        .collect_vec();
    ensure!(!years.is_empty(), "No available years in range");

    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;

    #[rstest]
    #[case("2050", &[2030, 2050], &[2050])]
    #[case("all", &[2030, 2050], &[2030, 2050])]
    #[case(" All ", &[2030, 2050], &[2030, 2050])]
    #[case("2030; 2050", &[2030, 2040, 2050], &[2030, 2050])]
    #[case("2030..2040", &[2030, 2040, 2050], &[2030, 2040])]
    #[case("2031..", &[2030, 2040, 2050], &[2040, 2050])]
    #[case("..2049", &[2030, 2040, 2050], &[2030, 2040])]
    #[case("..", &[2030, 2050], &[2030, 2050])]
    #[case("2050..2050", &[2030, 2050], &[2050])]
    fn parse_year_str_valid(
        #[case] input: &str,
        #[case] available_years: &[u32],
        #[case] expected: &[u32],
    ) {
        assert_eq!(parse_year_str(input, available_years).unwrap(), expected);
    }

    #[rstest]
    #[case("", &[2030], "No years provided")]
    #[case("2040", &[2030, 2050], "Invalid year: 2040")]
    #[case("2050;x", &[2030, 2050], "Invalid year: x")]
    #[case("2050;2030", &[2030, 2050], "Years must be in order and unique")]
    #[case("2030;2030", &[2030, 2050], "Years must be in order and unique")]
    #[case("2030;2040..2050", &[2030, 2050], "Year string 2030;2040..2050 mixes a range with a list of years")]
    #[case("2050..2030", &[2030, 2050], "Invalid year range: 2050..2030")]
    #[case("2031..2049", &[2030, 2050], "Invalid year range: 2031..2049")]
    fn parse_year_str_invalid(
        #[case] input: &str,
        #[case] available_years: &[u32],
        #[case] msg: &str,
    ) {
        assert_error!(parse_year_str(input, available_years), msg);
    }
}
