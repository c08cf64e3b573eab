//! Field checks for incoming request data.
//!
//! Each check is a plain function returning the cleaned value or a
//! [`ValidationError`]; callers compose them before touching a store.

use chrono::NaiveDate;

use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Parse a `MM/DD/YYYY` due date.
///
/// Month and day take one or two digits, the year exactly four. Dates that
/// do not exist on the calendar (`02/30/2024`) are rejected rather than
/// rolled over into the next month.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let parts: Vec<&str> = raw.split('/').collect();
    let [month, day, year] = parts.as_slice() else {
        return Err(ValidationError::MalformedDate);
    };

    let month = numeric_component(month, 1..=2)?;
    let day = numeric_component(day, 1..=2)?;
    let year = numeric_component(year, 4..=4)?;

    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or(ValidationError::DateOutOfRange)
}

fn numeric_component(
    raw: &str,
    width: std::ops::RangeInclusive<usize>,
) -> Result<u32, ValidationError> {
    if !width.contains(&raw.len()) || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::MalformedDate);
    }
    raw.parse().map_err(|_| ValidationError::MalformedDate)
}

pub fn validate_title(raw: &str) -> Result<String, ValidationError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(title.to_string())
}

pub fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Shape check only: one `@`, non-empty local part, a dotted domain, and no
/// whitespace. Deliverability is not our problem.
pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim();
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    let domain_ok = !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());
    if local.is_empty() || !domain_ok {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email.to_string())
}

pub fn validate_password(raw: &str) -> Result<(), ValidationError> {
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_due_date() {
        let date = parse_due_date("08/20/2024").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 8, 20).unwrap());

        let short = parse_due_date("8/2/2024").unwrap();
        assert_eq!(short, NaiveDate::from_ymd_opt(2024, 8, 2).unwrap());
    }

    #[test]
    fn rejects_malformed_due_dates() {
        for raw in [
            "",
            "2024-08-20",
            "08/20",
            "08/20/2024/1",
            "aa/20/2024",
            "08/2x/2024",
            "08/20/24",
            "+8/20/2024",
            "008/20/2024",
            " 08/20/2024",
        ] {
            assert_eq!(
                parse_due_date(raw),
                Err(ValidationError::MalformedDate),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn rejects_days_outside_the_month() {
        assert_eq!(parse_due_date("02/30/2024"), Err(ValidationError::DateOutOfRange));
        assert_eq!(parse_due_date("13/01/2024"), Err(ValidationError::DateOutOfRange));
        assert_eq!(parse_due_date("00/10/2024"), Err(ValidationError::DateOutOfRange));
        assert_eq!(parse_due_date("02/29/2023"), Err(ValidationError::DateOutOfRange));
        // leap year
        assert!(parse_due_date("02/29/2024").is_ok());
    }

    #[test]
    fn title_must_have_content() {
        assert_eq!(validate_title("  T1 ").unwrap(), "T1");
        assert_eq!(validate_title("   "), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn email_shape() {
        assert_eq!(validate_email("alice@x.com").unwrap(), "alice@x.com");
        for bad in ["alice", "@x.com", "alice@", "alice@x", "a b@x.com", "a@b@x.com"] {
            assert_eq!(validate_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn password_length() {
        assert!(validate_password("secret").is_ok());
        assert_eq!(
            validate_password("short"),
            Err(ValidationError::PasswordTooShort(MIN_PASSWORD_LEN))
        );
    }

    #[test]
    fn name_must_have_content() {
        assert_eq!(validate_name(" Alice ").unwrap(), "Alice");
        assert_eq!(validate_name(""), Err(ValidationError::EmptyName));
    }
}
