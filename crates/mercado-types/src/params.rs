use std::fmt;

use serde::{Deserialize, Serialize};

/// A single positional argument forwarded to a statement.
///
/// Query-string and form values always arrive as `Text`; JSON bodies may
/// carry numbers or booleans. MySQL performs any conversion the procedure
/// signature asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlParam {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<Option<SqlParam>> for SqlParam {
    fn from(value: Option<SqlParam>) -> Self {
        value.unwrap_or(Self::Null)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        value: Option<SqlParam>,
    }

    #[test]
    fn json_scalars_keep_their_kind() {
        let p: Probe = serde_json::from_str(r#"{"value": 42}"#).unwrap();
        assert_eq!(p.value, Some(SqlParam::Int(42)));

        let p: Probe = serde_json::from_str(r#"{"value": 12.5}"#).unwrap();
        assert_eq!(p.value, Some(SqlParam::Float(12.5)));

        let p: Probe = serde_json::from_str(r#"{"value": "kilo"}"#).unwrap();
        assert_eq!(p.value, Some(SqlParam::Text("kilo".into())));

        let p: Probe = serde_json::from_str(r#"{"value": true}"#).unwrap();
        assert_eq!(p.value, Some(SqlParam::Bool(true)));
    }

    #[test]
    fn absent_and_null_become_sql_null() {
        let p: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(SqlParam::from(p.value), SqlParam::Null);

        let p: Probe = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert!(SqlParam::from(p.value).is_null());
    }

    #[test]
    fn objects_are_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"value": {"a": 1}}"#).is_err());
    }

    #[test]
    fn display_matches_bound_text() {
        assert_eq!(SqlParam::Int(7).to_string(), "7");
        assert_eq!(SqlParam::from("pepe").to_string(), "pepe");
        assert_eq!(SqlParam::Null.to_string(), "NULL");
    }
}
