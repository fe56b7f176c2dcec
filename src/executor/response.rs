use serde::ser::{self, Serialize, SerializeMap as _};

use crate::{
    GraphQLError,
    executor::{ExecutionError, FieldError},
    value::{Object, Value},
};

/// Pre-sized, index-addressed slots for sibling values that complete in any
/// order.
///
/// Each slot is filled exactly once by the future resolving it; finishing
/// yields the values in declaration order regardless of completion order.
#[derive(Debug)]
pub(crate) struct Slots {
    values: Vec<Option<Value>>,
}

impl Slots {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            values: vec![None; len],
        }
    }

    pub(crate) fn fill(&mut self, idx: usize, value: Value) {
        debug_assert!(self.values[idx].is_none(), "slot {idx} filled twice");
        self.values[idx] = Some(value);
    }

    pub(crate) fn into_list(self) -> Vec<Value> {
        self.values
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect()
    }

    /// Pairs the slots with the response keys they were created for.
    pub(crate) fn into_object<'k>(self, keys: impl IntoIterator<Item = &'k str>) -> Object {
        keys.into_iter().zip(self.into_list()).collect()
    }
}

/// Result of a single query execution, ready to be serialized.
///
/// Renders `{"data": .., "errors": [..]}`, or only `{"errors": [..]}` when
/// execution failed before any field was resolved. Use [`is_ok()`] to tell
/// the two apart, e.g. to pick an HTTP status code.
///
/// [`is_ok()`]: GraphQLResponse::is_ok
#[derive(Clone, Debug, PartialEq)]
pub struct GraphQLResponse(Result<(Value, Vec<ExecutionError>), GraphQLError>);

impl GraphQLResponse {
    /// Constructs a new [`GraphQLResponse`] from the result of an execution.
    pub fn from_result(r: Result<(Value, Vec<ExecutionError>), GraphQLError>) -> Self {
        Self(r)
    }

    /// Constructs an error response outside of the normal execution flow.
    pub fn error(error: FieldError) -> Self {
        Self(Ok((Value::null(), vec![ExecutionError::at_origin(error)])))
    }

    /// Indicates whether execution started at all.
    ///
    /// An OK response may still carry field errors.
    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }

    /// Returns the `data` part of the response, if execution started.
    pub fn data(&self) -> Option<&Value> {
        self.0.as_ref().ok().map(|(data, _)| data)
    }

    /// Unwraps the underlying result.
    pub fn into_result(self) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
        self.0
    }
}

impl Serialize for GraphQLResponse {
    fn serialize<S: ser::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            Ok((data, errors)) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("data", data)?;
                if !errors.is_empty() {
                    map.serialize_entry("errors", errors)?;
                }
                map.end()
            }
            Err(err) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("errors", err)?;
                map.end()
            }
        }
    }
}
