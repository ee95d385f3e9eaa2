use regex::Regex;
use std::sync::LazyLock;

use super::types::CreateUserInput;
use crate::shared::AppError;

static USERNAME_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z-]+$").expect("valid username charset regex"));
static USERNAME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z-]+[a-z]$").expect("valid username shape regex"));

fn invalid(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let length = username.chars().count();
    if length == 0 {
        return Err(invalid("Username is required"));
    }
    if length < 3 {
        return Err(invalid("Username must be at least 3 characters long"));
    }
    if length > 20 {
        return Err(invalid("Username must be less than 20 characters long"));
    }
    if !USERNAME_CHARSET.is_match(username) {
        return Err(invalid(
            "Username must only contain lowercase letters and dashes",
        ));
    }
    if !USERNAME_SHAPE.is_match(username) {
        return Err(invalid("Username must start and end with a lowercase letter"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() {
        return Err(invalid("Email is required"));
    }
    if !email.contains('@') {
        return Err(invalid("Email is invalid"));
    }
    if email.chars().count() > 100 {
        return Err(invalid("Email must be less than 100 characters long"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    let length = password.chars().count();
    if length == 0 {
        return Err(invalid("Password is required"));
    }
    if length < 8 {
        return Err(invalid("Password must be at least 8 characters long"));
    }
    if length > 100 {
        return Err(invalid("Password must be less than 100 characters long"));
    }
    Ok(())
}

/// Checks a registration in field order and reports the first problem
pub fn validate_new_user(input: &CreateUserInput) -> Result<(), AppError> {
    validate_username(&input.username)?;
    validate_email(&input.email)?;
    validate_password(&input.password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("dee", None)]
    #[case("x-john-x", None)]
    #[case("", Some("Username is required"))]
    #[case("ab", Some("Username must be at least 3 characters long"))]
    #[case(
        "abcdefghijklmnopqrstu",
        Some("Username must be less than 20 characters long")
    )]
    #[case("Dee", Some("Username must only contain lowercase letters and dashes"))]
    #[case("de3", Some("Username must only contain lowercase letters and dashes"))]
    #[case("-dee", Some("Username must start and end with a lowercase letter"))]
    #[case("dee-", Some("Username must start and end with a lowercase letter"))]
    fn test_validate_username(#[case] username: &str, #[case] expected: Option<&str>) {
        match (validate_username(username), expected) {
            (Ok(()), None) => {}
            (Err(AppError::Validation(msg)), Some(expected)) => assert_eq!(msg, expected),
            (result, expected) => panic!("unexpected {:?} for {:?}", result, expected),
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.c").is_ok());
        assert!(matches!(
            validate_email("nope"),
            Err(AppError::Validation(msg)) if msg == "Email is invalid"
        ));
        let long = format!("{}@example.com", "a".repeat(100));
        assert!(matches!(
            validate_email(&long),
            Err(AppError::Validation(msg)) if msg == "Email must be less than 100 characters long"
        ));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_new_user_reports_first_problem() {
        let input = CreateUserInput {
            name: None,
            email: "invalid".to_string(),
            password: "x".to_string(),
            username: "ok-name".to_string(),
        };
        assert!(matches!(
            validate_new_user(&input),
            Err(AppError::Validation(msg)) if msg == "Email is invalid"
        ));
    }
}
