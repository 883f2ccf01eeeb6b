//! Template values and variable scopes.

use std::collections::HashMap;

use serde_json::Value;

/// A value a template can interpolate, test or iterate over
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TemplateValue {
    String(String),
    Bool(bool),
    List(Vec<TemplateValue>),
    Map(HashMap<String, TemplateValue>),
    #[default]
    Null,
}

impl TemplateValue {
    /// Truthiness for `$if()$`.
    ///
    /// Non-empty strings (including `"false"`), `true`, non-empty maps and
    /// lists with at least one truthy element are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            TemplateValue::Bool(b) => *b,
            TemplateValue::String(s) => !s.is_empty(),
            TemplateValue::List(items) => items.iter().any(TemplateValue::is_truthy),
            TemplateValue::Map(map) => !map.is_empty(),
            TemplateValue::Null => false,
        }
    }

    /// Nested lookup, e.g. `["source", "title"]`
    pub fn get_path(&self, path: &[&str]) -> Option<&TemplateValue> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => match self {
                TemplateValue::Map(map) => map.get(*first).and_then(|v| v.get_path(rest)),
                _ => None,
            },
        }
    }

    /// Text output, with `escape` applied to every string fragment
    pub fn render(&self, escape: fn(&str) -> String) -> String {
        match self {
            TemplateValue::String(s) => escape(s),
            TemplateValue::Bool(true) | TemplateValue::Map(_) => "true".to_string(),
            TemplateValue::Bool(false) | TemplateValue::Null => String::new(),
            TemplateValue::List(items) => items.iter().map(|v| v.render(escape)).collect(),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        TemplateValue::String(s.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        TemplateValue::String(s)
    }
}

impl From<bool> for TemplateValue {
    fn from(b: bool) -> Self {
        TemplateValue::Bool(b)
    }
}

impl From<Value> for TemplateValue {
    /// Numbers become their decimal text
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TemplateValue::Null,
            Value::Bool(b) => TemplateValue::Bool(b),
            Value::Number(n) => TemplateValue::String(n.to_string()),
            Value::String(s) => TemplateValue::String(s),
            Value::Array(items) => TemplateValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                TemplateValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Variable bindings, optionally nested inside a parent scope
#[derive(Debug, Default)]
pub struct TemplateContext<'a> {
    variables: HashMap<String, TemplateValue>,
    parent: Option<&'a TemplateContext<'a>>,
}

impl<'a> TemplateContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a top-level context from the entries of a JSON object
    pub fn from_json(value: Value) -> Self {
        let mut context = Self::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                context.insert(key, value.into());
            }
        }
        context
    }

    pub fn insert(&mut self, key: impl Into<String>, value: TemplateValue) {
        self.variables.insert(key.into(), value);
    }

    /// Look up a variable in this scope, then in the enclosing ones
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.variables
            .get(key)
            .or_else(|| self.parent.and_then(|p| p.get(key)))
    }

    /// A nested scope (one `$for$` iteration) that sees all parent variables
    pub fn child(&self) -> TemplateContext<'_> {
        TemplateContext {
            variables: HashMap::new(),
            parent: Some(self),
        }
    }
}
