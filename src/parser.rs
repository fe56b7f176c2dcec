//! Query parsing.
//!
//! Lexing and parsing of query text is delegated to the [`graphql_parser`]
//! crate. This module translates its AST into the owned [`ast`](crate::ast)
//! types the executor works on, keeping source positions for error reporting.

use std::fmt;

use derive_more::{Display, Error};
use graphql_parser::{Pos, query as external};

use crate::{
    ast::{
        Definition, Directive, Document, Field, Fragment, FragmentSpread, InlineFragment,
        InputValue, Operation, OperationType, Selection, Type, VariableDefinition,
    },
    value::ScalarValue,
};

/// Reference to a line and column in an input source file.
///
/// Both are zero-based; serialization shifts them to the one-based form
/// GraphQL responses use.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SourcePosition {
    line: usize,
    col: usize,
}

impl SourcePosition {
    #[doc(hidden)]
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    #[doc(hidden)]
    pub fn new_origin() -> Self {
        Self::default()
    }

    /// Line of the position, zero-based.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column of the position, zero-based.
    pub fn column(&self) -> usize {
        self.col
    }
}

impl From<Pos> for SourcePosition {
    fn from(pos: Pos) -> Self {
        Self::new(pos.line.saturating_sub(1), pos.column.saturating_sub(1))
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

/// Data structure used to wrap items with the position they start at.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Spanning<T> {
    /// Wrapped item.
    pub item: T,

    /// Start position of the wrapped item.
    pub start: SourcePosition,
}

impl<T> Spanning<T> {
    #[doc(hidden)]
    pub fn new(start: SourcePosition, item: T) -> Self {
        Self { item, start }
    }

    #[doc(hidden)]
    pub fn unlocated(item: T) -> Self {
        Self::new(SourcePosition::new_origin(), item)
    }

    /// Modify the contents of the spanned item.
    pub fn map<O>(self, f: impl FnOnce(T) -> O) -> Spanning<O> {
        Spanning::new(self.start, f(self.item))
    }
}

/// Error while parsing a GraphQL query.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    /// Message describing the failure, including its position.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Parses query text into a [`Document`].
pub fn parse_document(source: &str) -> Result<Document, ParseError> {
    let document = external::parse_query::<String>(source).map_err(|e| ParseError {
        message: e.to_string().trim_end().to_owned(),
    })?;
    Ok(document
        .definitions
        .into_iter()
        .map(translate_definition)
        .collect())
}

fn translate_definition(definition: external::Definition<'_, String>) -> Definition {
    match definition {
        external::Definition::Operation(op) => Definition::Operation(translate_operation(op)),
        external::Definition::Fragment(f) => {
            let external::TypeCondition::On(type_condition) = f.type_condition;
            Definition::Fragment(Spanning::new(
                f.position.into(),
                Fragment {
                    name: Spanning::new(f.position.into(), f.name),
                    type_condition: Spanning::new(f.position.into(), type_condition),
                    directives: translate_directives(f.directives),
                    selection_set: translate_selection_set(f.selection_set),
                },
            ))
        }
    }
}

fn translate_operation(op: external::OperationDefinition<'_, String>) -> Spanning<Operation> {
    use external::OperationDefinition as Op;

    let (operation_type, position, name, variables, directives, selection_set) = match op {
        Op::SelectionSet(s) => (OperationType::Query, s.span.0, None, vec![], vec![], s),
        Op::Query(q) => (
            OperationType::Query,
            q.position,
            q.name,
            q.variable_definitions,
            q.directives,
            q.selection_set,
        ),
        Op::Mutation(m) => (
            OperationType::Mutation,
            m.position,
            m.name,
            m.variable_definitions,
            m.directives,
            m.selection_set,
        ),
        Op::Subscription(s) => (
            OperationType::Subscription,
            s.position,
            s.name,
            s.variable_definitions,
            s.directives,
            s.selection_set,
        ),
    };
    let start = SourcePosition::from(position);

    Spanning::new(
        start,
        Operation {
            operation_type,
            name: name.map(|n| Spanning::new(start, n)),
            variable_definitions: variables
                .into_iter()
                .map(|v| {
                    let pos = SourcePosition::from(v.position);
                    (
                        Spanning::new(pos, v.name),
                        VariableDefinition {
                            var_type: Spanning::new(pos, translate_type(v.var_type)),
                            default_value: v.default_value.map(translate_value),
                        },
                    )
                })
                .collect(),
            directives: translate_directives(directives),
            selection_set: translate_selection_set(selection_set),
        },
    )
}

fn translate_selection_set(set: external::SelectionSet<'_, String>) -> Vec<Selection> {
    set.items.into_iter().map(translate_selection).collect()
}

fn translate_selection(selection: external::Selection<'_, String>) -> Selection {
    match selection {
        external::Selection::Field(f) => {
            let start = SourcePosition::from(f.position);
            Selection::Field(Spanning::new(
                start,
                Field {
                    alias: f.alias.map(|a| Spanning::new(start, a)),
                    name: Spanning::new(start, f.name),
                    arguments: translate_arguments(start, f.arguments),
                    directives: translate_directives(f.directives),
                    selection_set: (!f.selection_set.items.is_empty())
                        .then(|| translate_selection_set(f.selection_set)),
                },
            ))
        }
        external::Selection::FragmentSpread(s) => {
            let start = SourcePosition::from(s.position);
            Selection::FragmentSpread(Spanning::new(
                start,
                FragmentSpread {
                    name: Spanning::new(start, s.fragment_name),
                    directives: translate_directives(s.directives),
                },
            ))
        }
        external::Selection::InlineFragment(i) => {
            let start = SourcePosition::from(i.position);
            Selection::InlineFragment(Spanning::new(
                start,
                InlineFragment {
                    type_condition: i
                        .type_condition
                        .map(|external::TypeCondition::On(n)| Spanning::new(start, n)),
                    directives: translate_directives(i.directives),
                    selection_set: translate_selection_set(i.selection_set),
                },
            ))
        }
    }
}

fn translate_arguments(
    start: SourcePosition,
    arguments: Vec<(String, external::Value<'_, String>)>,
) -> Vec<(Spanning<String>, InputValue)> {
    arguments
        .into_iter()
        .map(|(name, value)| (Spanning::new(start, name), translate_value(value)))
        .collect()
}

fn translate_directives(directives: Vec<external::Directive<'_, String>>) -> Vec<Spanning<Directive>> {
    directives
        .into_iter()
        .map(|d| {
            let start = SourcePosition::from(d.position);
            Spanning::new(
                start,
                Directive {
                    name: Spanning::new(start, d.name),
                    arguments: translate_arguments(start, d.arguments),
                },
            )
        })
        .collect()
}

fn translate_value(value: external::Value<'_, String>) -> InputValue {
    use external::Value as V;

    match value {
        V::Variable(name) => InputValue::Variable(name),
        V::Int(n) => n.as_i64().map_or(InputValue::Null, |n| {
            InputValue::Scalar(i32::try_from(n).map_or(ScalarValue::Long(n), ScalarValue::Int))
        }),
        V::Float(f) => InputValue::scalar(f),
        V::String(s) => InputValue::scalar(s),
        V::Boolean(b) => InputValue::scalar(b),
        V::Null => InputValue::Null,
        V::Enum(e) => InputValue::Enum(e),
        V::List(l) => InputValue::List(l.into_iter().map(translate_value).collect()),
        V::Object(o) => InputValue::Object(
            o.into_iter()
                .map(|(k, v)| (k, translate_value(v)))
                .collect(),
        ),
    }
}

fn translate_type(ty: external::Type<'_, String>) -> Type {
    match ty {
        external::Type::NamedType(n) => Type::Named(n),
        external::Type::ListType(inner) => Type::List(Box::new(translate_type(*inner))),
        external::Type::NonNullType(inner) => match translate_type(*inner) {
            Type::Named(n) => Type::NonNullNamed(n),
            Type::List(l) => Type::NonNullList(l),
            non_null => non_null,
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{SourcePosition, parse_document};
    use crate::ast::{Definition, InputValue, OperationType, Selection, Type};

    #[test]
    fn parses_operation_with_variables() {
        let doc = parse_document(
            "query Film($type: TYPE = FULL_LENGTH, $ids: [Int!]!) {\n  actor(type: $type) { name }\n}",
        )
        .expect("valid query");

        let Definition::Operation(op) = &doc[0] else {
            panic!("expected an operation");
        };
        assert_eq!(op.item.operation_type, OperationType::Query);
        assert_eq!(op.item.name.as_ref().map(|n| n.item.as_str()), Some("Film"));

        let (name, def) = &op.item.variable_definitions[0];
        assert_eq!(name.item, "type");
        assert_eq!(def.var_type.item, Type::Named("TYPE".into()));
        assert_eq!(def.default_value, Some(InputValue::enum_value("FULL_LENGTH")));

        let (_, def) = &op.item.variable_definitions[1];
        assert_eq!(
            def.var_type.item,
            Type::NonNullList(Box::new(Type::NonNullNamed("Int".into()))),
        );

        let Selection::Field(field) = &op.item.selection_set[0] else {
            panic!("expected a field");
        };
        assert_eq!(field.start, SourcePosition::new(1, 2));
        assert_eq!(field.item.arguments[0].1, InputValue::variable("type"));
        assert!(field.item.selection_set.is_some());
    }

    #[test]
    fn shorthand_query_and_fragments() {
        let doc = parse_document("{ ...F } fragment F on Actor { name }").expect("valid query");

        assert_eq!(doc.len(), 2);
        assert!(matches!(&doc[1], Definition::Fragment(f) if f.item.type_condition.item == "Actor"));
    }

    #[test]
    fn large_integers_become_long() {
        let doc = parse_document("{ f(a: 1, b: 5000000000) }").expect("valid query");

        let Definition::Operation(op) = &doc[0] else {
            panic!("expected an operation");
        };
        let Selection::Field(field) = &op.item.selection_set[0] else {
            panic!("expected a field");
        };
        assert_eq!(field.item.arguments[0].1, InputValue::scalar(1));
        assert_eq!(field.item.arguments[1].1, InputValue::scalar(5_000_000_000_i64));
    }

    #[test]
    fn reports_syntax_errors() {
        let err = parse_document("{ actor( }").expect_err("invalid query");

        assert!(!err.message().is_empty());
    }
}
