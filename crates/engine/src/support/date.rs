use time::Date;
use time::format_description::{self, BorrowedFormatItem};

const ISO_DATE: &str = "[year]-[month]-[day]";
const FORM_DATE: &str = "[day]/[month]/[year]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateError {
    InvalidFormat,
}

impl std::fmt::Display for DateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "date must look like DD/MM/YYYY or YYYY-MM-DD"),
        }
    }
}

impl std::error::Error for DateError {}

fn items(pattern: &str) -> Result<Vec<BorrowedFormatItem<'_>>, DateError> {
    format_description::parse(pattern).map_err(|_| DateError::InvalidFormat)
}

/// Form input: empty means "no date", which is valid and distinct from a
/// malformed one. Accepts the `DD/MM/YYYY` form convention and ISO-8601;
/// returns the ISO-8601 rendering used by the store.
pub fn normalize_date_input(value: &str) -> Result<Option<String>, DateError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let iso_items = items(ISO_DATE)?;
    let form_items = items(FORM_DATE)?;
    let date = Date::parse(trimmed, &iso_items)
        .or_else(|_| Date::parse(trimmed, &form_items))
        .map_err(|_| DateError::InvalidFormat)?;

    let rendered = date
        .format(&items(ISO_DATE)?)
        .map_err(|_| DateError::InvalidFormat)?;
    Ok(Some(rendered))
}

/// Stored dates were normalized on the way in; anything unparsable is ignored
/// rather than failing a read path.
pub fn parse_stored_date(value: &str) -> Option<Date> {
    let format = items(ISO_DATE).ok()?;
    Date::parse(value.trim(), &format).ok()
}

#[cfg(test)]
mod tests {
    use super::{DateError, normalize_date_input, parse_stored_date};

    #[test]
    fn empty_input_is_no_date() {
        assert_eq!(normalize_date_input(""), Ok(None));
        assert_eq!(normalize_date_input("   "), Ok(None));
    }

    #[test]
    fn form_and_iso_inputs_normalize() {
        assert_eq!(
            normalize_date_input("31/12/2026"),
            Ok(Some("2026-12-31".to_string()))
        );
        assert_eq!(
            normalize_date_input("2026-12-31"),
            Ok(Some("2026-12-31".to_string()))
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert_eq!(normalize_date_input("soon"), Err(DateError::InvalidFormat));
        assert_eq!(
            normalize_date_input("31/13/2026"),
            Err(DateError::InvalidFormat)
        );
    }

    #[test]
    fn stored_dates_round_trip() {
        let date = parse_stored_date("2026-12-31").expect("stored date parses");
        assert_eq!(date.to_string(), "2026-12-31");
        assert_eq!(parse_stored_date("junk"), None);
    }
}
