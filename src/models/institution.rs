//! Institution model as returned by the FreiDok institutions endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;
use super::Item;

/// An institution (faculty, department, chair, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    #[serde(default, deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Name variants, usually one per language
    #[serde(default, deserialize_with = "de::null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<Name>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(skip)]
    pub raw: Option<Map<String, Value>>,
}

impl Item for Institution {
    const KIND: &'static str = "institution";

    fn id(&self) -> Option<u64> {
        self.id
    }

    fn raw(&self) -> Option<&Map<String, Value>> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: Map<String, Value>) {
        self.raw = Some(raw);
    }
}

/// A language-tagged institution name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Name {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
