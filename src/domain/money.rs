use {
    super::error::WebhookError,
    derive_more::Display,
    serde::{Deserialize, Serialize},
};

/// Amount in the smallest unit of its currency (cents for USD).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorAmount(i64);

impl MinorAmount {
    pub fn new(minor: i64) -> Result<Self, WebhookError> {
        if minor < 0 {
            return Err(WebhookError::Validation(format!(
                "amount cannot be negative, got: {minor}"
            )));
        }
        Ok(Self(minor))
    }

    /// Converts a major-unit amount (e.g. Airwallex dollars) to minor
    /// units, rounding to the nearest integer.
    pub fn from_major(major: f64) -> Result<Self, WebhookError> {
        if !major.is_finite() || major < 0.0 {
            return Err(WebhookError::Validation(format!(
                "amount must be a non-negative number, got: {major}"
            )));
        }
        Ok(Self((major * 100.0).round() as i64))
    }

    pub fn minor_units(&self) -> i64 {
        self.0
    }
}

/// ISO 4217-style code, exactly 3 uppercase ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl AsRef<str>) -> Result<Self, WebhookError> {
        let code = code.as_ref().trim().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(WebhookError::Validation(format!(
                "currency must be a 3-letter code, got: {code:?}"
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
