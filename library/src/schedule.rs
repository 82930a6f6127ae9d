//! Parsing of the hours-of-day at which sync passes start.

use std::collections::BTreeSet;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("no time entered")]
    Empty,
    #[error("`{0}` is not an hour")]
    NotAnHour(String),
}

pub fn default_hours() -> Vec<u32> {
    vec![0]
}

/// Clamps out-of-range hours to `0`, removes duplicates and sorts ascending.
pub fn normalize(hours: impl IntoIterator<Item = i64>) -> Vec<u32> {
    let hours: BTreeSet<u32> = hours
        .into_iter()
        .map(|hour| u32::try_from(hour).ok().filter(|h| *h <= 23).unwrap_or(0))
        .collect();
    if hours.is_empty() {
        return default_hours();
    }
    hours.into_iter().collect()
}

fn parse_hour(item: &str) -> Result<i64, ScheduleError> {
    let item = item.trim();
    let negative = item.starts_with('-');
    let digits: String = item.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ScheduleError::NotAnHour(item.to_string()));
    }
    // anything too long to be an hour is out of range anyway
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Ok(if negative { -value } else { value })
}

/// Parses a comma separated list such as `"2, 14,23"`.
pub fn parse(input: &str) -> Result<Vec<u32>, ScheduleError> {
    if input.trim().is_empty() {
        return Err(ScheduleError::Empty);
    }
    let hours = input
        .split(',')
        .map(parse_hour)
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(normalize(hours))
}

pub fn parse_or_default(input: &str) -> Vec<u32> {
    parse(input).unwrap_or_else(|err| {
        tracing::error!("invalid sync times `{}`: {}, defaulting to 00:00", input, err);
        default_hours()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_clamps_and_duplicates_collapse() {
        assert_eq!(parse("25, -1, 9, 9"), Ok(vec![0, 9]));
    }

    #[test]
    fn strips_non_digits() {
        // "18:00" reads as 1800, which is out of range
        assert_eq!(parse("6h, 18:00, 12"), Ok(vec![0, 6, 12]));
        assert_eq!(parse(" 7 ,3"), Ok(vec![3, 7]));
    }

    #[test]
    fn malformed_input_defaults_to_midnight() {
        assert_eq!(parse(""), Err(ScheduleError::Empty));
        assert_eq!(parse_or_default(""), vec![0]);
        assert_eq!(parse_or_default("4, soon"), vec![0]);
    }

    #[test]
    fn normalize_never_returns_empty() {
        assert_eq!(normalize(Vec::new()), vec![0]);
        assert_eq!(normalize(vec![23, 23, 5]), vec![5, 23]);
    }
}
