//! Request field validation
//!
//! Numeric fields arrive as JSON numbers or numeric strings from the web
//! form. Free-text fields are never rejected; they resolve through the
//! predictor's fallbacks.

use fairwage_common::db::parse_amount;
use serde_json::Value;

/// Years of experience: non-negative, fractional part truncated
pub fn parse_experience(value: &Value) -> Result<u32, String> {
    if value.is_null() {
        return Err("experience is required".to_string());
    }
    let years = parse_amount(value).ok_or_else(|| format!("experience must be a number, got {}", value))?;
    if years < 0.0 {
        return Err(format!("experience must not be negative, got {}", years));
    }
    // Saturating cast; the experience curve is capped long before u32::MAX
    Ok(years.trunc() as u32)
}

/// A wage amount: finite and strictly positive
pub fn parse_wage(value: &Value, field: &str) -> Result<f64, String> {
    if value.is_null() {
        return Err(format!("{} is required", field));
    }
    let wage = parse_amount(value).ok_or_else(|| format!("{} must be a number, got {}", field, value))?;
    if wage <= 0.0 {
        return Err(format!("{} must be greater than zero, got {}", field, wage));
    }
    Ok(wage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_experience_accepts_numbers_and_strings() {
        assert_eq!(parse_experience(&json!(5)), Ok(5));
        assert_eq!(parse_experience(&json!("7")), Ok(7));
        assert_eq!(parse_experience(&json!(3.9)), Ok(3));
        assert_eq!(parse_experience(&json!(0)), Ok(0));
    }

    #[test]
    fn test_experience_rejects_bad_values() {
        assert!(parse_experience(&json!(-1)).is_err());
        assert!(parse_experience(&json!("five")).is_err());
        assert!(parse_experience(&json!(null)).is_err());
        assert!(parse_experience(&json!([1])).is_err());
        assert!(parse_experience(&json!("inf")).is_err());
    }

    #[test]
    fn test_wage_must_be_positive() {
        assert_eq!(parse_wage(&json!("52000"), "wage"), Ok(52000.0));
        assert!(parse_wage(&json!(0), "wage").is_err());
        assert!(parse_wage(&json!(-100), "wage").is_err());
        let err = parse_wage(&json!(null), "currentWage").unwrap_err();
        assert!(err.contains("currentWage"));
    }
}
