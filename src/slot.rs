use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const INCLUDE_SHORT_SONGS: &str = "include_short_songs";
pub const INCLUDE_VAULT_SONGS: &str = "include_vault_songs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Album,
    SongCategory,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOption {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSchema {
    #[serde(default, rename = "slot_data_keys")]
    pub options: HashMap<String, SlotOption>,
}

impl SlotSchema {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn option(&self, key: &str) -> Option<&SlotOption> {
        self.options.get(key)
    }

    pub fn enabled_names(&self, slot: &SlotData, kind: OptionKind) -> Vec<String> {
        let mut names: Vec<String> = slot
            .values
            .iter()
            .filter(|(_, value)| value.is_one())
            .filter_map(|(key, _)| self.option(key))
            .filter(|option| option.kind == kind)
            .map(|option| option.display_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Other,
}

impl SlotValue {
    pub fn is_one(&self) -> bool {
        matches!(self, Self::Number(n) if n.trunc() == 1.0)
    }

    // Feature toggles accept JSON booleans and the strings "true"/"false".
    pub fn as_toggle(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Text(text) => text.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

impl From<&Value> for SlotValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(*flag),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Other),
            Value::String(text) => Self::Text(text.clone()),
            Value::Array(_) | Value::Object(_) => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotData {
    pub values: HashMap<String, SlotValue>,
}

impl SlotData {
    // Non-object payloads decode to an empty snapshot.
    pub fn from_value(value: &Value) -> Self {
        let values = value
            .as_object()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), SlotValue::from(value)))
                    .collect()
            })
            .unwrap_or_default();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&SlotValue> {
        self.values.get(key)
    }

    pub fn toggle(&self, key: &str) -> bool {
        self.get(key).is_some_and(SlotValue::as_toggle)
    }
}
