mod macros;
mod object;
mod scalar;

use std::fmt;

use itertools::Itertools as _;

pub use self::{object::Object, scalar::ScalarValue};

/// Serializable value returned from query and field execution.
///
/// Used by the execution engine and resolvers to build up the response
/// structure. Similar to the `Json` type found in the serialize crate.
///
/// It is also similar to the [`InputValue`](crate::InputValue) type, but can
/// not contain enum values or variables. Enum values are serialized as
/// strings.
#[derive(Clone, Debug, Default, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Value {
    #[default]
    Null,
    Scalar(ScalarValue),
    List(Vec<Value>),
    Object(Object),
}

impl Value {
    /// Constructs a null value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Constructs a scalar value.
    pub fn scalar(s: impl Into<ScalarValue>) -> Self {
        Self::Scalar(s.into())
    }

    /// Constructs a list value.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l)
    }

    /// Constructs an object value.
    pub fn object(o: Object) -> Self {
        Self::Object(o)
    }

    /// Does this value represent `null`?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Views the underlying scalar value, if present.
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Views the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        self.as_scalar().and_then(ScalarValue::as_str)
    }

    /// Returns the underlying integer, if it fits in 32 bits.
    pub fn as_int_value(&self) -> Option<i32> {
        self.as_scalar().and_then(ScalarValue::as_int)
    }

    /// Returns the underlying integer, widened to 64 bits.
    pub fn as_long_value(&self) -> Option<i64> {
        self.as_scalar().and_then(ScalarValue::as_long)
    }

    /// Returns the underlying number as a float.
    pub fn as_float_value(&self) -> Option<f64> {
        self.as_scalar().and_then(ScalarValue::as_float)
    }

    /// Returns the underlying boolean, if present.
    pub fn as_boolean_value(&self) -> Option<bool> {
        self.as_scalar().and_then(ScalarValue::as_bool)
    }

    /// Views the underlying list value, if present.
    pub fn as_list_value(&self) -> Option<&Vec<Self>> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Views the underlying object value, if present.
    pub fn as_object_value(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Follows a `/`-separated path of field names into this value.
    ///
    /// A segment may end with `[n]` to step into the `n`th list element, so
    /// `getAll[5]/children[5]/id` is a valid path.
    pub fn lookup(&self, path: &str) -> Option<&Self> {
        path.split('/').try_fold(self, |current, segment| {
            let (name, indices) = segment.split_once('[').unwrap_or((segment, ""));
            let mut value = current.as_object_value()?.get_field_value(name)?;
            for index in indices.split('[').filter(|s| !s.is_empty()) {
                let index: usize = index.strip_suffix(']')?.parse().ok()?;
                value = value.as_list_value()?.get(index)?;
            }
            Some(value)
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Scalar(s) => s.fmt(f),
            Self::List(list) => write!(f, "[{}]", list.iter().format(", ")),
            Self::Object(obj) => write!(
                f,
                "{{{}}}",
                obj.iter()
                    .format_with(", ", |(key, value), f| f(&format_args!("\"{key}\": {value}"))),
            ),
        }
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::scalar(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::scalar(s)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::scalar(i)
    }
}

impl From<i64> for Value {
    fn from(l: i64) -> Self {
        Self::scalar(l)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::scalar(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::scalar(b)
    }
}

impl From<ScalarValue> for Value {
    fn from(s: ScalarValue) -> Self {
        Self::Scalar(s)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::graphql_value;

    #[test]
    fn display_null() {
        assert_eq!(Value::null().to_string(), "null");
    }

    #[test]
    fn display_nested() {
        let v = graphql_value!({"string": "foo", "list": [1, true, null], "obj": {"int": 1}});
        assert_eq!(
            v.to_string(),
            r#"{"string": "foo", "list": [1, true, null], "obj": {"int": 1}}"#,
        );
    }

    #[test]
    fn lookup_follows_fields_and_indices() {
        let v = graphql_value!({"all": [{"id": 1}, {"id": 2, "kids": [[7, 8]]}]});

        assert_eq!(v.lookup("all[1]/id"), Some(&Value::scalar(2)));
        assert_eq!(v.lookup("all[1]/kids[0][1]"), Some(&Value::scalar(8)));
        assert_eq!(v.lookup("all[2]/id"), None);
        assert_eq!(v.lookup("missing"), None);
    }
}
