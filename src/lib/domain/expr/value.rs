use std::collections::BTreeMap;

/// A value flowing through the expression runtime.
///
/// This is the tagged sum the schema-typed dynamic map is built on: card projections, literals, and intermediate
/// evaluation results are all a `Value`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    StrArray(Vec<String>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn map(entries: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn str_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::StrArray(items.into_iter().map(Into::into).collect())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::StrArray(_) => "string array",
            Value::Map(_) => "map",
        }
    }
}
