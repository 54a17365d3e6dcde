//! Input validation for new accounts
//!
//! Names and emails are trimmed and length-checked before they reach the
//! store; the table carries matching `CHECK` constraints.

use crate::money::Amount;

/// Column limits, mirrored in `db::schema`
pub const NAME_MAX_LEN: usize = 128;
pub const EMAIL_MAX_LEN: usize = 256;

/// Validation errors for account input
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("Invalid length for {field}: max {max}, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    #[error("Initial balance must not be negative: {0}")]
    NegativeBalance(Amount),
}

/// Validate and normalize an account holder name
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    check_len("name", name, NAME_MAX_LEN)?;
    Ok(name.to_string())
}

/// Validate and normalize an email address
///
/// Only the shape `local@domain` is enforced. Uniqueness is not.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    check_len("email", email, EMAIL_MAX_LEN)?;

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
        {
            Ok(email.to_string())
        }
        _ => Err(ValidationError::InvalidEmail(email.to_string())),
    }
}

pub fn validate_balance(balance: Amount) -> Result<Amount, ValidationError> {
    if balance.is_negative() {
        return Err(ValidationError::NegativeBalance(balance));
    }
    Ok(balance)
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_trimmed() {
        assert_eq!(validate_name("  Gaukhar ").unwrap(), "Gaukhar");
    }

    #[test]
    fn test_name_empty() {
        assert_eq!(
            validate_name("   "),
            Err(ValidationError::Empty { field: "name" })
        );
    }

    #[test]
    fn test_name_too_long() {
        let long = "x".repeat(NAME_MAX_LEN + 1);
        assert_eq!(
            validate_name(&long),
            Err(ValidationError::TooLong {
                field: "name",
                max: NAME_MAX_LEN,
                actual: NAME_MAX_LEN + 1,
            })
        );
    }

    #[test]
    fn test_email_shapes() {
        assert_eq!(validate_email("nuray@kbtu.kz").unwrap(), "nuray@kbtu.kz");
        assert!(matches!(
            validate_email("nuray.kbtu.kz"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("@kbtu.kz"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("a@b@c"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert_eq!(
            validate_email(""),
            Err(ValidationError::Empty { field: "email" })
        );
    }

    #[test]
    fn test_balance() {
        assert!(validate_balance(Amount::ZERO).is_ok());
        assert!(validate_balance(Amount::from_major(1000)).is_ok());
        assert_eq!(
            validate_balance(Amount::from_minor(-1)),
            Err(ValidationError::NegativeBalance(Amount::from_minor(-1)))
        );
    }
}
