//! Request-body helpers shared by the CRUD handlers.

use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// Accepts `12.5` as well as `"12.5"`, the way browser forms tend to send it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// `Ok(None)` for a blank string.
    pub fn value(&self, field: &str) -> Result<Option<f64>, ApiError> {
        match self {
            Numeric::Number(n) if n.is_finite() => Ok(Some(*n)),
            Numeric::Number(_) => Err(ApiError::validation(format!("{field} must be numeric"))),
            Numeric::Text(s) if s.trim().is_empty() => Ok(None),
            Numeric::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| ApiError::validation(format!("{field} must be numeric"))),
        }
    }

    pub fn non_negative(&self, field: &str) -> Result<Option<f64>, ApiError> {
        match self.value(field)? {
            Some(v) if v < 0.0 => Err(ApiError::validation(format!("{field} must be >= 0"))),
            other => Ok(other),
        }
    }

    pub fn positive(&self, field: &str) -> Result<Option<f64>, ApiError> {
        match self.value(field)? {
            Some(v) if v <= 0.0 => Err(ApiError::validation(format!("{field} must be > 0"))),
            other => Ok(other),
        }
    }

    /// Whole numbers of at least 1, as sets and reps are.
    pub fn count(&self, field: &str) -> Result<Option<i32>, ApiError> {
        match self.value(field)? {
            None => Ok(None),
            Some(v) if v.fract() == 0.0 && v >= 1.0 && v <= f64::from(i32::MAX) => {
                Ok(Some(v as i32))
            }
            Some(_) => Err(ApiError::validation(format!(
                "{field} must be an integer >= 1"
            ))),
        }
    }
}

/// `{"success": true}` after a delete.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

pub fn non_blank(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

/// Collects the required fields missing from a typed body so a single error
/// can name all of them, in the order the request type declares them.
#[derive(Debug)]
pub struct RequiredFields {
    declared: &'static [&'static str],
    missing: Vec<&'static str>,
}

impl RequiredFields {
    pub fn new(declared: &'static [&'static str]) -> Self {
        Self {
            declared,
            missing: Vec::new(),
        }
    }

    /// The present value, or a placeholder that `finish` never lets through.
    pub fn take<T: Default>(&mut self, name: &'static str, value: Option<T>) -> T {
        debug_assert!(self.declared.contains(&name), "{name} is not a declared field");
        match value {
            Some(v) => v,
            None => {
                self.missing.push(name);
                T::default()
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.missing.is_empty() {
            return Ok(());
        }
        let missing: Vec<&str> = self
            .declared
            .iter()
            .copied()
            .filter(|name| self.missing.contains(name))
            .collect();
        Err(ApiError::validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_accepts_numbers_and_numeric_strings() {
        assert_eq!(Numeric::Number(3.5).value("x").unwrap(), Some(3.5));
        assert_eq!(Numeric::Text(" 42 ".into()).value("x").unwrap(), Some(42.0));
        assert_eq!(Numeric::Text("".into()).value("x").unwrap(), None);
        assert!(Numeric::Text("lots".into()).value("x").is_err());
        assert!(Numeric::Text("NaN".into()).value("x").is_err());
    }

    #[test]
    fn numeric_deserializes_both_forms() {
        let n: Numeric = serde_json::from_str("12").unwrap();
        assert_eq!(n, Numeric::Number(12.0));
        let t: Numeric = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(t, Numeric::Text("12".into()));
    }

    #[test]
    fn counts_must_be_whole_and_positive() {
        assert_eq!(Numeric::Number(3.0).count("sets").unwrap(), Some(3));
        assert!(Numeric::Number(0.0).count("sets").is_err());
        assert!(Numeric::Number(2.5).count("sets").is_err());
        let err = Numeric::Text("-1".into()).count("reps").unwrap_err();
        assert_eq!(err.to_string(), "reps must be an integer >= 1");
    }

    #[test]
    fn sign_checks() {
        assert!(Numeric::Number(-1.0).non_negative("fats").is_err());
        assert_eq!(Numeric::Number(0.0).non_negative("fats").unwrap(), Some(0.0));
        assert!(Numeric::Number(0.0).positive("weight").is_err());
    }

    #[test]
    fn required_fields_lists_every_missing_name_in_declared_order() {
        const FIELDS: [&str; 3] = ["a", "b", "c"];

        let mut req = RequiredFields::new(&FIELDS);
        let a: String = req.take("a", Some("x".to_string()));
        let b: i32 = req.take("b", Some(2));
        assert_eq!((a.as_str(), b), ("x", 2));
        assert!(req.finish().is_ok());

        let mut req = RequiredFields::new(&FIELDS);
        let _: f64 = req.take("c", None);
        let _: String = req.take("a", Some("x".to_string()));
        let _: i32 = req.take("b", None);
        let err = req.finish().unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: b, c");
    }
}
