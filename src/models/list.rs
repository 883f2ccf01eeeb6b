//! Response envelope shared by all FreiDok list endpoints.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::de;
use crate::error::{FreidokError, Result};

/// An entity that can appear in an [`ItemList`]
pub trait Item: Serialize + DeserializeOwned + Clone + std::fmt::Debug {
    /// Value of the envelope's `type` field for this entity
    const KIND: &'static str;

    /// Numeric FreiDok identifier
    fn id(&self) -> Option<u64>;

    /// The JSON object this item was parsed from, if any
    fn raw(&self) -> Option<&Map<String, Value>>;

    fn set_raw(&mut self, raw: Map<String, Value>);

    /// JSON written by the passthrough format: the object as received,
    /// or the typed fields for items built in code
    fn passthrough(&self) -> Result<Value> {
        match self.raw() {
            Some(raw) => Ok(Value::Object(raw.clone())),
            None => Ok(serde_json::to_value(self)?),
        }
    }
}

/// A list of items plus the paging metadata the API sends along.
///
/// This is also the JSON passthrough format: saving an `ItemList` and loading
/// it again with `--source FILE` yields the same items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct ItemList<T> {
    /// Number of matches on the server
    #[serde(rename = "numFound", default, skip_serializing_if = "Option::is_none")]
    pub num_found: Option<u64>,

    /// Offset of the first returned item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u64>,

    /// Page size used by the server
    #[serde(rename = "maxRows", default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u64>,

    /// Entity type tag (`publication` or `institution`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "de::null_as_empty")]
    pub docs: Vec<T>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T: Item> ItemList<T> {
    /// Wrap items in a fresh envelope
    pub fn new(docs: Vec<T>) -> Self {
        Self {
            num_found: Some(docs.len() as u64),
            start: None,
            max_rows: None,
            kind: Some(T::KIND.to_string()),
            docs,
            extra: Map::new(),
        }
    }

    /// Parse and validate an API response or passthrough file.
    ///
    /// Accepts the envelope object as well as a bare array of items.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let list = match value {
            Value::Array(docs) => Self::new(parse_docs(docs)?),
            Value::Object(mut envelope) => {
                let docs = match envelope.remove("docs") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(docs)) => docs,
                    Some(other) => {
                        return Err(FreidokError::Schema(format!(
                            "expected 'docs' to be an array, found {}",
                            json_type_name(&other)
                        )))
                    }
                };
                let mut list = serde_json::from_value::<Self>(Value::Object(envelope))?;
                list.docs = parse_docs(docs)?;
                list
            }
            other => {
                return Err(FreidokError::Schema(format!(
                    "expected an object or an array, found {}",
                    json_type_name(&other)
                )))
            }
        };
        list.validate()?;
        Ok(list)
    }

    /// Passthrough form: the envelope with every item as it was received
    pub fn to_json_value(&self) -> Result<Value> {
        let docs = self
            .docs
            .iter()
            .map(|doc| doc.passthrough())
            .collect::<Result<Vec<_>>>()?;
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(envelope) = &mut value {
            envelope.insert("docs".to_string(), Value::Array(docs));
        }
        Ok(value)
    }

    /// Check that the envelope holds the expected entity type
    pub fn validate(&self) -> Result<()> {
        match self.kind.as_deref() {
            Some(kind) if kind != T::KIND => Err(FreidokError::Schema(format!(
                "expected items of type '{}', found '{}'",
                T::KIND,
                kind
            ))),
            _ => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

fn parse_docs<T: Item>(docs: Vec<Value>) -> Result<Vec<T>> {
    docs.into_iter()
        .map(|doc| {
            let mut item: T = serde_json::from_value(doc.clone())?;
            if let Value::Object(raw) = doc {
                item.set_raw(raw);
            }
            Ok(item)
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
