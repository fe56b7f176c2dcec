//! Resolution of queries against a [`Schema`](crate::Schema).

mod engine;
mod pool;
pub mod resolver;
mod response;

use std::{
    any::{Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display},
    sync::Arc,
};

use fnv::FnvHashMap;

use crate::{parser::SourcePosition, value::Value};

pub use crate::ast::Variables;

pub(crate) use self::{engine::execute_validated_query, pool::BlockingPool};
pub use self::response::GraphQLResponse;

/// Error type for errors that occur during query execution.
///
/// All execution errors contain the source position in the query of the field
/// that failed to resolve, and the path of field names and list indices
/// leading to it.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError,
    kind: ErrorKind,
}

impl ExecutionError {
    #[doc(hidden)]
    pub fn new(
        location: SourcePosition,
        path: Vec<PathSegment>,
        error: FieldError,
        kind: ErrorKind,
    ) -> Self {
        Self {
            location,
            path,
            error,
            kind,
        }
    }

    /// Constructs a new [`ExecutionError`] at the query root.
    pub fn at_origin(error: FieldError) -> Self {
        Self::new(SourcePosition::new_origin(), vec![], error, ErrorKind::Resolver)
    }

    /// Returns the underlying [`FieldError`].
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// Returns the source position of the failing field.
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// Returns the path from the root of the response to the failing field.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Returns the stage of resolution that failed.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn order(&self, other: &Self) -> Ordering {
        (&self.location, &self.path, &self.error.message).cmp(&(
            &other.location,
            &other.path,
            &other.error.message,
        ))
    }
}

/// Stage of field resolution an [`ExecutionError`] originates from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Resolver returned an error or panicked.
    Resolver,
    /// Query argument could not be bound to a resolver parameter.
    ArgumentBinding,
    /// Selected field, argument or fragment does not exist.
    UnknownField,
    /// `null` reached a non-null position.
    NullViolation,
    /// Resolved value does not fit the declared type.
    Coercion,
}

/// Segment of an [`ExecutionError`] path.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    /// Response key of a field.
    Field(String),
    /// Position in a list.
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// Path to the field currently being resolved, shared between siblings.
#[derive(Clone, Debug, Default)]
pub(crate) struct FieldPath(Option<Arc<(PathSegment, FieldPath)>>);

impl FieldPath {
    pub(crate) fn field(&self, name: &str) -> Self {
        Self(Some(Arc::new((PathSegment::Field(name.into()), self.clone()))))
    }

    pub(crate) fn index(&self, idx: usize) -> Self {
        Self(Some(Arc::new((PathSegment::Index(idx), self.clone()))))
    }

    pub(crate) fn to_vec(&self) -> Vec<PathSegment> {
        let mut segments = vec![];
        let mut current = self;
        while let Some(node) = &current.0 {
            segments.push(node.0.clone());
            current = &node.1;
        }
        segments.reverse();
        segments
    }
}

pub(crate) fn sort_errors(errors: &mut [ExecutionError]) {
    errors.sort_by(ExecutionError::order);
}

/// Error type for errors that occur during field resolution.
///
/// Field errors are represented by a human-readable error message and an
/// optional [`Value`] structure containing additional information.
///
/// They can be converted to from any type that implements [`Display`], which
/// makes error chaining with the `?` operator a breeze:
///
/// ```rust
/// # use juniper_dynamic::FieldError;
/// fn get_string(data: Vec<u8>) -> Result<String, FieldError> {
///     let s = String::from_utf8(data)?;
///     Ok(s)
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Value,
}

impl<T: Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::null(),
        }
    }
}

impl FieldError {
    /// Constructs a new [`FieldError`] with additional data.
    ///
    /// You can use the [`graphql_value!`] macro for construction:
    /// ```rust
    /// use juniper_dynamic::{graphql_value, FieldError};
    ///
    /// # let _: FieldError =
    /// FieldError::new(
    ///     "Could not open connection to the database",
    ///     graphql_value!({"internal_error": "Connection refused"}),
    /// );
    /// ```
    ///
    /// The `extensions` parameter will be added to the `"extensions"` field
    /// of the error object in the JSON response. If it is [`Value::Null`],
    /// no extra data is included.
    ///
    /// [`graphql_value!`]: crate::graphql_value
    #[must_use]
    pub fn new<T: Display>(e: T, extensions: Value) -> Self {
        Self {
            message: e.to_string(),
            extensions,
        }
    }

    /// Returns the message of this [`FieldError`].
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the additional data of this [`FieldError`].
    pub fn extensions(&self) -> &Value {
        &self.extensions
    }

    #[must_use]
    pub(crate) fn prefixed(mut self, prefix: &str) -> Self {
        self.message.insert_str(0, prefix);
        self
    }
}

/// The result of resolving the value of a field of type `T`.
pub type FieldResult<T> = Result<T, FieldError>;

/// Per-execution user data, injected into resolvers declaring a [`Context`]
/// parameter.
///
/// Values are keyed by their type, so a context holds at most one value of
/// each type.
#[derive(Clone, Default)]
pub struct Context {
    data: Arc<FnvHashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Context {
    /// Creates an empty [`Context`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value`, replacing any previous value of the same type.
    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        _ = Arc::make_mut(&mut self.data).insert(TypeId::of::<T>(), Arc::new(value));
        self
    }

    /// Returns the value of type `T`, if present.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data.get(&TypeId::of::<T>())?.downcast_ref()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("entries", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Context, FieldError, FieldPath, PathSegment};
    use crate::graphql_value;

    #[test]
    fn field_path_collects_segments_in_order() {
        let path = FieldPath::default().field("getAll").index(5).field("id");

        assert_eq!(
            path.to_vec(),
            vec![
                PathSegment::Field("getAll".into()),
                PathSegment::Index(5),
                PathSegment::Field("id".into()),
            ],
        );
    }

    #[test]
    fn context_is_keyed_by_type() {
        let ctx = Context::new().with(42_i32).with(String::from("db"));

        assert_eq!(ctx.get::<i32>(), Some(&42));
        assert_eq!(ctx.get::<String>().map(String::as_str), Some("db"));
        assert_eq!(ctx.get::<u8>(), None);
    }

    #[test]
    fn field_error_from_display() {
        let err = FieldError::from("broken").prefixed("In field \"a\": ");

        assert_eq!(err.message(), "In field \"a\": broken");
        assert!(err.extensions().is_null());

        let err = FieldError::new("broken", graphql_value!({"code": 7}));
        assert_eq!(err.extensions(), &graphql_value!({"code": 7}));
    }
}
