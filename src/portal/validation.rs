//! Input rules for names, lengths and rider details.

use crate::error::{PortalError, Result};

pub const MAX_NAME_LENGTH: usize = 30;
pub const MIN_STAGE_LENGTH_KM: f64 = 5.0;
pub const MIN_YEAR_OF_BIRTH: u16 = 1900;

/// Race, stage and team names: non-empty, at most [`MAX_NAME_LENGTH`]
/// characters, no whitespace.
pub fn validate_name(name: &str) -> Result<()> {
    match name {
        n if n.is_empty() => Err(PortalError::InvalidName("name cannot be empty".into())),
        n if n.chars().count() > MAX_NAME_LENGTH => Err(PortalError::InvalidName(format!(
            "name cannot exceed {MAX_NAME_LENGTH} characters"
        ))),
        n if n.chars().any(char::is_whitespace) => Err(PortalError::InvalidName(
            "name cannot contain whitespace".into(),
        )),
        _ => Ok(()),
    }
}

pub fn validate_stage_length(length: f64) -> Result<()> {
    if length >= MIN_STAGE_LENGTH_KM {
        Ok(())
    } else {
        Err(PortalError::InvalidLength(length))
    }
}

pub fn validate_rider(name: &str, year_of_birth: u16) -> Result<()> {
    if name.is_empty() {
        return Err(PortalError::InvalidArgument(
            "rider name cannot be empty".into(),
        ));
    }
    if year_of_birth < MIN_YEAR_OF_BIRTH {
        return Err(PortalError::InvalidArgument(format!(
            "year of birth {year_of_birth} is before {MIN_YEAR_OF_BIRTH}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_rules() {
        assert!(validate_name("TourDeFrance").is_ok());
        assert!(validate_name(&"x".repeat(30)).is_ok());
        assert!(matches!(validate_name(""), Err(PortalError::InvalidName(_))));
        assert!(matches!(
            validate_name(&"x".repeat(31)),
            Err(PortalError::InvalidName(_))
        ));
        assert!(matches!(
            validate_name("white space"),
            Err(PortalError::InvalidName(_))
        ));
        assert!(matches!(
            validate_name("tab\there"),
            Err(PortalError::InvalidName(_))
        ));
    }

    #[test]
    fn test_stage_length_minimum() {
        assert!(validate_stage_length(5.0).is_ok());
        assert!(matches!(
            validate_stage_length(4.9),
            Err(PortalError::InvalidLength(_))
        ));
        assert!(validate_stage_length(f64::NAN).is_err());
    }

    #[test]
    fn test_rider_rules() {
        assert!(validate_rider("Tadej", 1998).is_ok());
        assert!(validate_rider("Old", 1900).is_ok());
        assert!(matches!(
            validate_rider("", 1990),
            Err(PortalError::InvalidArgument(_))
        ));
        assert!(matches!(
            validate_rider("Tadej", 1899),
            Err(PortalError::InvalidArgument(_))
        ));
    }
}
