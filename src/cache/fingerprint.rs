use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::errors::{CacheError, CacheResult};
use crate::table::Table;

/// SHA-256 hex digest of canonicalized content, used as the cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == 64 && s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'));
        if valid {
            Ok(Fingerprint(s.to_string()))
        } else {
            Err(CacheError::InvalidFingerprint(s.to_string()))
        }
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(value: Fingerprint) -> Self {
        value.0
    }
}

pub fn fingerprint_tables(tables: &[Table]) -> CacheResult<Fingerprint> {
    let value = serde_json::to_value(tables)?;
    Ok(fingerprint_value(&value))
}

pub fn fingerprint_value(value: &Value) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(value).as_bytes());
    Fingerprint(format!("{:x}", hasher.finalize()))
}

/// Compact JSON with object keys sorted at every level. Array order is kept.
pub fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let fields: Vec<String> = keys
                .into_iter()
                .map(|k| {
                    format!(
                        "{}:{}",
                        Value::String(k.clone()),
                        canonical_json(&map[k.as_str()])
                    )
                })
                .collect();
            format!("{{{}}}", fields.join(","))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        scalar => scalar.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use serde_json::json;

    fn create_test_tables() -> Vec<Table> {
        vec![Table::from_values(
            "Sheet1",
            vec![
                vec![Some("Name".into()), Some("Amount".into())],
                vec![Some("x".into()), Some(5.0.into())],
            ],
        )]
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = json!({ "b": 1, "a": { "d": [3, 1], "c": null } });
        assert_eq!(canonical_json(&value), r#"{"a":{"c":null,"d":[3,1]},"b":1}"#);
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let a: Value =
            serde_json::from_str(r#"[{"name":"T","rows":[[{"address":"A1","value":1}]]}]"#)
                .unwrap();
        let b: Value =
            serde_json::from_str(r#"[{"rows":[[{"value":1,"address":"A1"}]],"name":"T"}]"#)
                .unwrap();
        assert_eq!(fingerprint_value(&a), fingerprint_value(&b));
    }

    #[test]
    fn test_array_order_matters() {
        let a = json!([[1, 2]]);
        let b = json!([[2, 1]]);
        assert_ne!(fingerprint_value(&a), fingerprint_value(&b));
    }

    #[test]
    fn test_cell_change_changes_fingerprint() {
        let tables = create_test_tables();
        let mut changed = tables.clone();
        changed[0].rows[1][1].value = Some(CellValue::Number(6.0));

        let original = fingerprint_tables(&tables).unwrap();
        assert_eq!(original, fingerprint_tables(&tables).unwrap());
        assert_ne!(original, fingerprint_tables(&changed).unwrap());
    }

    #[test]
    fn test_fingerprint_is_hex_digest() {
        let fp = fingerprint_tables(&create_test_tables()).unwrap();
        assert_eq!(fp.as_str().len(), 64);
        assert_eq!(fp.as_str().parse::<Fingerprint>().unwrap(), fp);
    }

    #[test]
    fn test_fingerprint_parse_rejects_garbage() {
        assert!("abc".parse::<Fingerprint>().is_err());
        assert!("../../etc/passwd".parse::<Fingerprint>().is_err());
        assert!("A".repeat(64).parse::<Fingerprint>().is_err());
    }
}
