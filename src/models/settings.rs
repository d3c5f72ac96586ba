//! Application settings: a flat key -> JSON value map (company name, logo, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub BTreeMap<String, Value>);

impl Settings {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Overlay `other` onto `self`; keys present in `other` win.
    pub fn merge_from(&mut self, other: Settings) {
        self.0.extend(other.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_remote_wins_per_key() {
        let mut local: Settings =
            serde_json::from_value(json!({ "companyName": "Local", "currency": "EUR" })).unwrap();
        let remote: Settings =
            serde_json::from_value(json!({ "companyName": "Remote", "logo": "data:image/png" }))
                .unwrap();

        local.merge_from(remote);

        assert_eq!(local.get("companyName"), Some(&json!("Remote")));
        assert_eq!(local.get("currency"), Some(&json!("EUR")));
        assert_eq!(local.get("logo"), Some(&json!("data:image/png")));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut settings = Settings::default();
        settings.insert("taxRate", json!(7.5));
        assert_eq!(serde_json::to_value(&settings).unwrap(), json!({ "taxRate": 7.5 }));
    }
}
