use std::{collections::HashMap, fmt};

use indexmap::IndexMap;
use itertools::Itertools as _;

use crate::{parser::Spanning, value::ScalarValue};

/// Type literal in a syntax tree.
///
/// Carries no semantic information and might refer to types that don't exist.
/// The schema uses the same representation for the declared types of
/// properties and arguments.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// Nullable named type, e.g. `String`.
    Named(String),

    /// Nullable list type, e.g. `[String]`.
    ///
    /// The list itself is what's nullable, the containing type might be non-null.
    List(Box<Type>),

    /// Non-null named type, e.g. `String!`.
    NonNullNamed(String),

    /// Non-null list type, e.g. `[String]!`.
    ///
    /// The list itself is what's non-null, the containing type might be null.
    NonNullList(Box<Type>),
}

impl Type {
    /// Returns the name of a named type.
    ///
    /// Only applies to named types; lists will return [`None`].
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => Some(n),
            Self::List(_) | Self::NonNullList(_) => None,
        }
    }

    /// Returns the innermost name by unpacking lists.
    ///
    /// All type literals contain exactly one named type.
    pub fn innermost_name(&self) -> &str {
        match self {
            Self::Named(n) | Self::NonNullNamed(n) => n,
            Self::List(l) | Self::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Returns the contained type of a list.
    pub fn list_contents(&self) -> Option<&Self> {
        match self {
            Self::List(l) | Self::NonNullList(l) => Some(l),
            Self::Named(_) | Self::NonNullNamed(_) => None,
        }
    }

    /// Indicates whether this type can only represent non-null values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNullNamed(_) | Self::NonNullList(_))
    }

    /// Drops the outermost non-null marker.
    pub fn into_nullable(self) -> Self {
        match self {
            Self::NonNullNamed(n) => Self::Named(n),
            Self::NonNullList(l) => Self::List(l),
            nullable => nullable,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(n) => write!(f, "{n}"),
            Self::NonNullNamed(n) => write!(f, "{n}!"),
            Self::List(t) => write!(f, "[{t}]"),
            Self::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

/// JSON-like value that can be passed into query execution, either
/// out-of-band, or in-band as default variable values. These are _not_
/// constant and might contain variables.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum InputValue {
    Null,
    Scalar(ScalarValue),
    Enum(String),
    Variable(String),
    List(Vec<InputValue>),
    Object(Vec<(String, InputValue)>),
}

impl InputValue {
    /// Constructs a `null` value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Constructs a scalar value.
    pub fn scalar(v: impl Into<ScalarValue>) -> Self {
        Self::Scalar(v.into())
    }

    /// Constructs an enum value.
    pub fn enum_value(s: impl Into<String>) -> Self {
        Self::Enum(s.into())
    }

    /// Constructs a variable value.
    pub fn variable(v: impl Into<String>) -> Self {
        Self::Variable(v.into())
    }

    /// Constructs a list value.
    pub fn list(l: Vec<Self>) -> Self {
        Self::List(l)
    }

    /// Constructs an object value, preserving the order of the given fields.
    pub fn object<K: Into<String>>(o: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Object(o.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Resolves all variables of this [`InputValue`] to their actual `values`.
    ///
    /// Undefined variables become `null`.
    #[must_use]
    pub fn into_const(self, values: &Variables) -> Self {
        match self {
            Self::Variable(v) => values.get(&v).cloned().unwrap_or(Self::Null),
            Self::List(l) => Self::List(l.into_iter().map(|v| v.into_const(values)).collect()),
            Self::Object(o) => Self::Object(
                o.into_iter()
                    .map(|(k, v)| (k, v.into_const(values)))
                    .collect(),
            ),
            v => v,
        }
    }

    /// Whether this is a `null` literal.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is an unresolved variable reference.
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Views the underlying scalar value, if present.
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Views the underlying enum value, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Views the underlying string value, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        self.as_scalar().and_then(ScalarValue::as_str)
    }

    /// Views the underlying object value, if present.
    pub fn to_object_value(&self) -> Option<IndexMap<&str, &Self>> {
        match self {
            Self::Object(o) => Some(o.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            _ => None,
        }
    }

    /// Views the underlying list value, if present.
    pub fn to_list_value(&self) -> Option<Vec<&Self>> {
        match self {
            Self::List(l) => Some(l.iter().collect()),
            _ => None,
        }
    }

    /// Recursively finds all variables referenced by this value.
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name],
            Self::List(l) => l.iter().flat_map(Self::referenced_variables).collect(),
            Self::Object(o) => o.iter().flat_map(|(_, v)| v.referenced_variables()).collect(),
            _ => vec![],
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(v) => write!(f, "[{}]", v.iter().format(", ")),
            Self::Object(o) => write!(
                f,
                "{{{}}}",
                o.iter()
                    .format_with(", ", |(k, v), f| f(&format_args!("{k}: {v}"))),
            ),
        }
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        Self::scalar(s)
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        Self::scalar(s)
    }
}

impl From<i32> for InputValue {
    fn from(i: i32) -> Self {
        Self::scalar(i)
    }
}

impl From<i64> for InputValue {
    fn from(l: i64) -> Self {
        Self::scalar(l)
    }
}

impl From<f64> for InputValue {
    fn from(f: f64) -> Self {
        Self::scalar(f)
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        Self::scalar(b)
    }
}

/// Variables of a query, keyed by name without the leading `$`.
pub type Variables = HashMap<String, InputValue>;

/// Declaration of an operation variable.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition {
    /// Declared type.
    pub var_type: Spanning<Type>,
    /// Value used when the variable is not provided.
    pub default_value: Option<InputValue>,
}

/// Field selection, as in `alias: name(arg: 1) @skip(if: false) { ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Response key replacing the name, if given.
    pub alias: Option<Spanning<String>>,
    /// Name of the selected field.
    pub name: Spanning<String>,
    /// Arguments in source order.
    pub arguments: Vec<(Spanning<String>, InputValue)>,
    /// Directives applied to the selection.
    pub directives: Vec<Spanning<Directive>>,
    /// Subselection; absent for leaf fields.
    pub selection_set: Option<Vec<Selection>>,
}

impl Field {
    /// Key under which this field appears in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_ref().unwrap_or(&self.name).item.as_str()
    }
}

/// Use of a named fragment, as in `...fragmentName`.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread {
    /// Name of the spread fragment.
    pub name: Spanning<String>,
    /// Directives applied to the spread.
    pub directives: Vec<Spanning<Directive>>,
}

/// Anonymous fragment, as in `... on User { name }`.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment {
    /// Type the fragment applies to; any type if absent.
    pub type_condition: Option<Spanning<String>>,
    /// Directives applied to the fragment.
    pub directives: Vec<Spanning<Directive>>,
    /// Selections of the fragment.
    pub selection_set: Vec<Selection>,
}

/// Entry in a GraphQL selection set.
///
/// Represents one of the three variants of a selection that exists in
/// GraphQL: a field, a fragment spread, or an inline fragment. Each of the
/// variants references its location in the query source.
///
/// ```text
/// {
///   field(withArg: 123) { subField }
///   ...fragmentSpread
///   ...on User {
///     inlineFragmentField
///   }
/// }
/// ```
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Selection {
    Field(Spanning<Field>),
    FragmentSpread(Spanning<FragmentSpread>),
    InlineFragment(Spanning<InlineFragment>),
}

/// Directive applied to a selection, as in `@include(if: $flag)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    /// Name, without `@`.
    pub name: Spanning<String>,
    /// Arguments in source order.
    pub arguments: Vec<(Spanning<String>, InputValue)>,
}

impl Directive {
    /// Returns the value of the named argument, if given.
    pub fn argument(&self, name: &str) -> Option<&InputValue> {
        self.arguments
            .iter()
            .find(|(n, _)| n.item == name)
            .map(|(_, v)| v)
    }
}

/// Kind of an operation.
#[derive(Clone, Copy, Debug, derive_more::Display, Eq, PartialEq)]
pub enum OperationType {
    /// Read-only fetch, its root fields resolved concurrently.
    #[display("query")]
    Query,
    /// Write, its root fields resolved one after another.
    #[display("mutation")]
    Mutation,
    /// Not supported by the engine.
    #[display("subscription")]
    Subscription,
}

/// Operation of a document.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    /// Kind of the operation.
    pub operation_type: OperationType,
    /// Name; absent for anonymous operations.
    pub name: Option<Spanning<String>>,
    /// Declared variables, names without `$`.
    pub variable_definitions: Vec<(Spanning<String>, VariableDefinition)>,
    /// Directives applied to the operation.
    pub directives: Vec<Spanning<Directive>>,
    /// Root selections.
    pub selection_set: Vec<Selection>,
}

/// Named fragment definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    /// Name used by spreads.
    pub name: Spanning<String>,
    /// Type the fragment applies to.
    pub type_condition: Spanning<String>,
    /// Directives applied to the definition.
    pub directives: Vec<Spanning<Directive>>,
    /// Selections of the fragment.
    pub selection_set: Vec<Selection>,
}

/// Top-level definition of a document.
#[derive(Clone, Debug, PartialEq)]
#[expect(missing_docs, reason = "self-explanatory")]
pub enum Definition {
    Operation(Spanning<Operation>),
    Fragment(Spanning<Fragment>),
}

/// Parsed query document.
pub type Document = Vec<Definition>;

#[cfg(test)]
mod tests {
    use super::{InputValue, Type, Variables};

    #[test]
    fn type_display() {
        let ty = Type::NonNullList(Box::new(Type::NonNullNamed("Actor".into())));

        assert_eq!(ty.to_string(), "[Actor!]!");
        assert_eq!(ty.innermost_name(), "Actor");
        assert_eq!(ty.clone().into_nullable().to_string(), "[Actor!]");
        assert!(ty.is_non_null());
    }

    #[test]
    fn input_value_into_const() {
        let mut vars = Variables::new();
        vars.insert("size".into(), InputValue::scalar(2));

        let value = InputValue::object([
            ("size", InputValue::variable("size")),
            ("missing", InputValue::list(vec![InputValue::variable("nope")])),
        ]);

        assert_eq!(
            value.into_const(&vars),
            InputValue::object([
                ("size", InputValue::scalar(2)),
                ("missing", InputValue::list(vec![InputValue::null()])),
            ]),
        );
    }

    #[test]
    fn input_value_display() {
        let value = InputValue::object([
            ("a", InputValue::scalar("x")),
            (
                "b",
                InputValue::list(vec![InputValue::enum_value("FULL_LENGTH"), InputValue::variable("v")]),
            ),
        ]);

        assert_eq!(value.to_string(), r#"{a: "x", b: [FULL_LENGTH, $v]}"#);
    }
}
