use anyhow::{anyhow, Result};

use crate::booking::availability::parse_cell_record;

/// Validates and normalizes a display name. The name goes straight into
/// spreadsheet cells as `"<Name> dd.mm"`, so it must not itself end in a
/// date-like token or the record becomes unparseable.
pub fn validate_display_name(input: &str) -> Result<String> {
    let name = input.split_whitespace().collect::<Vec<_>>().join(" ");

    if name.chars().count() < 2 {
        return Err(anyhow!("Name must be at least 2 characters long"));
    }

    if name.chars().count() > 30 {
        return Err(anyhow!("Name cannot be longer than 30 characters"));
    }

    if parse_cell_record(&name).is_some() {
        return Err(anyhow!("Name cannot end with a date-like token"));
    }

    Ok(name)
}

/// Validates a `dd.mm` date string from user input and returns it
/// zero-padded. This is the one place calendar validity is enforced;
/// the cell parser downstream only checks syntax.
pub fn validate_booking_date(input: &str) -> Result<String> {
    let input = input.trim();

    let (day_str, month_str) = input
        .split_once('.')
        .ok_or_else(|| anyhow!("Invalid date format, use dd.mm (for example 25.12)"))?;

    if day_str.is_empty()
        || month_str.is_empty()
        || day_str.len() > 2
        || month_str.len() > 2
        || !day_str.chars().all(|c| c.is_ascii_digit())
        || !month_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(anyhow!("Invalid date format, use dd.mm (for example 25.12)"));
    }

    let day: u32 = day_str
        .parse()
        .map_err(|_| anyhow!("Invalid date format, use dd.mm"))?;
    let month: u32 = month_str
        .parse()
        .map_err(|_| anyhow!("Invalid date format, use dd.mm"))?;

    if !(1..=12).contains(&month) {
        return Err(anyhow!("Month must be between 1 and 12"));
    }

    if !(1..=31).contains(&day) {
        return Err(anyhow!("Day must be between 1 and 31"));
    }

    if month == 2 && day > 29 {
        return Err(anyhow!("February has at most 29 days"));
    }

    if matches!(month, 4 | 6 | 9 | 11) && day > 30 {
        return Err(anyhow!("Month {month} has at most 30 days"));
    }

    Ok(format!("{day:02}.{month:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_display_name_valid() {
        assert_eq!(validate_display_name("Ivan").unwrap(), "Ivan");
        assert_eq!(validate_display_name("Anna Maria").unwrap(), "Anna Maria");
        assert_eq!(validate_display_name("  Ivan  ").unwrap(), "Ivan");
        assert_eq!(
            validate_display_name("Anna   Maria").unwrap(),
            "Anna Maria"
        );
    }

    #[test]
    fn test_validate_display_name_too_short() {
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("  ").is_err());
        assert!(validate_display_name("A").is_err());
    }

    #[test]
    fn test_validate_display_name_too_long() {
        let long = "a".repeat(31);
        assert!(validate_display_name(&long).is_err());

        let max = "a".repeat(30);
        assert!(validate_display_name(&max).is_ok());
    }

    #[test]
    fn test_validate_display_name_rejects_date_suffix() {
        // "Ivan 20.05" as a *name* would merge with the real date in the
        // cell and corrupt the record
        assert!(validate_display_name("Ivan 20.05").is_err());
    }

    #[test]
    fn test_validate_booking_date_valid() {
        assert_eq!(validate_booking_date("25.12").unwrap(), "25.12");
        assert_eq!(validate_booking_date("5.1").unwrap(), "05.01");
        assert_eq!(validate_booking_date(" 29.02 ").unwrap(), "29.02");
    }

    #[test]
    fn test_validate_booking_date_bad_format() {
        assert!(validate_booking_date("").is_err());
        assert!(validate_booking_date("2512").is_err());
        assert!(validate_booking_date("25-12").is_err());
        assert!(validate_booking_date("25.12.2024").is_err());
        assert!(validate_booking_date("xx.yy").is_err());
        assert!(validate_booking_date("125.12").is_err());
    }

    #[test]
    fn test_validate_booking_date_calendar_rules() {
        assert!(validate_booking_date("32.01").is_err());
        assert!(validate_booking_date("0.10").is_err());
        assert!(validate_booking_date("15.13").is_err());
        assert!(validate_booking_date("15.0").is_err());
        assert!(validate_booking_date("30.02").is_err());
        assert!(validate_booking_date("31.04").is_err());
        assert!(validate_booking_date("31.06").is_err());
        assert!(validate_booking_date("30.06").is_ok());
        assert!(validate_booking_date("31.07").is_ok());
    }
}
