use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ISO 3166-1 alpha-2 country code.
///
/// Parsing is case-insensitive; the stored and displayed form is uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode([u8; 2]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid country code {0:?}: expected two ASCII letters")]
pub struct InvalidCountryCode(pub String);

impl CountryCode {
    pub fn parse(raw: &str) -> Result<Self, InvalidCountryCode> {
        let trimmed = raw.trim();
        match trimmed.as_bytes() {
            [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => {
                Ok(Self([a.to_ascii_uppercase(), b.to_ascii_uppercase()]))
            }
            _ => Err(InvalidCountryCode(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountryCode {
    type Err = InvalidCountryCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = InvalidCountryCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::CountryCode;

    #[test]
    fn parse_is_case_insensitive() {
        let a = CountryCode::parse("jp").unwrap();
        let b = CountryCode::parse("JP").unwrap();
        let c: CountryCode = " Jp ".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.to_string(), "JP");
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(CountryCode::parse("").is_err());
        assert!(CountryCode::parse("USA").is_err());
        assert!(CountryCode::parse("1A").is_err());
        assert!(CountryCode::parse("é").is_err());
    }

    #[test]
    fn serde_uses_uppercase_string() {
        let code: CountryCode = serde_json::from_str("\"de\"").unwrap();
        assert_eq!(code.as_str(), "DE");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"DE\"");
        assert!(serde_json::from_str::<CountryCode>("\"Deu\"").is_err());
    }
}
