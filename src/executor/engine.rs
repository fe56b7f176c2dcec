//! Query execution.
//!
//! Fields of one selection set resolve concurrently and are written into
//! index-addressed [`Slots`], so the response keeps the shape and order of
//! the query no matter in which order resolvers finish. Mutation root fields
//! resolve one after another.

use std::sync::{Mutex, PoisonError};

use fnv::{FnvHashMap, FnvHashSet};
use futures::{
    FutureExt as _, StreamExt as _,
    future::BoxFuture,
    stream::FuturesUnordered,
};
use indexmap::IndexMap;
use tracing::{Instrument as _, debug_span, trace};

use crate::{
    GraphQLError,
    ast::{
        Definition, Directive, Document, Field, Fragment, InputValue, Operation, OperationType,
        Selection, Type, Variables,
    },
    executor::{
        BlockingPool, Context, ErrorKind, ExecutionError, FieldError, FieldPath, sort_errors,
        response::Slots,
    },
    parser::{SourcePosition, Spanning},
    schema::{
        meta::{ObjectType, Property, TypeNode},
        model::SchemaType,
    },
    types::base::{AnyValue, InputContext, Output},
    value::{Object, Value},
};

const TYPENAME: &str = "__typename";

/// Fields of one selection set, grouped by response key.
type GroupedFields<'a> = IndexMap<&'a str, Vec<&'a Spanning<Field>>>;

/// Executes the selected operation of `document`.
///
/// Field failures are collected next to the data; only failures preventing
/// execution from starting are returned as [`GraphQLError`].
pub(crate) async fn execute_validated_query(
    document: &Document,
    operation_name: Option<&str>,
    schema: &SchemaType,
    pool: &BlockingPool,
    variables: &Variables,
    context: &Context,
) -> Result<(Value, Vec<ExecutionError>), GraphQLError> {
    let operation = get_operation(document, operation_name)?;
    let root = match operation.item.operation_type {
        OperationType::Query => schema.query_type(),
        OperationType::Mutation => schema.mutation_type(),
        OperationType::Subscription => None,
    }
    .ok_or(GraphQLError::UnsupportedOperation(operation.item.operation_type))?;
    let variables = coerce_variables(schema, &operation.item, variables)?;

    let fragments = document
        .iter()
        .filter_map(|d| match d {
            Definition::Fragment(f) => Some((f.item.name.item.as_str(), &f.item)),
            Definition::Operation(_) => None,
        })
        .collect();

    let execution = Execution {
        schema,
        pool,
        context,
        fragments,
        variables,
        serial: operation.item.operation_type == OperationType::Mutation,
        errors: Mutex::new(vec![]),
    };

    let span = debug_span!(
        "execute",
        operation = %operation.item.operation_type,
        operation_name = operation.item.name.as_ref().map(|n| n.item.as_str()),
    );
    let selections = operation.item.selection_set.iter().collect();
    let data = execution
        .resolve_object(root, None, selections, FieldPath::default())
        .instrument(span)
        .await
        .map_or_else(Value::null, Value::object);

    let mut errors = execution
        .errors
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    sort_errors(&mut errors);
    Ok((data, errors))
}

/// Picks the operation to execute.
///
/// Without a name, the document must contain exactly one operation.
pub(crate) fn get_operation<'d>(
    document: &'d Document,
    operation_name: Option<&str>,
) -> Result<&'d Spanning<Operation>, GraphQLError> {
    let mut operation = None;
    for def in document {
        if let Definition::Operation(op) = def {
            if operation_name.is_none() && operation.is_some() {
                return Err(GraphQLError::MultipleOperationsProvided);
            }

            let move_op = operation_name.is_none()
                || op.item.name.as_ref().map(|s| s.item.as_str()) == operation_name;

            if move_op {
                operation = Some(op);
            }
        }
    }
    operation.ok_or(match operation_name {
        Some(_) => GraphQLError::UnknownOperationName,
        None => GraphQLError::NoOperationProvided,
    })
}

/// Checks that every declared variable has an input type of the schema, and
/// fills in defaults for variables that weren't provided.
fn coerce_variables(
    schema: &SchemaType,
    operation: &Operation,
    provided: &Variables,
) -> Result<Variables, GraphQLError> {
    let mut variables = provided.clone();
    for (name, definition) in &operation.variable_definitions {
        let type_name = definition.var_type.item.innermost_name();
        if !schema.type_by_name(type_name).is_some_and(TypeNode::is_input) {
            return Err(GraphQLError::UnknownVariableType {
                variable: name.item.clone(),
                type_name: type_name.into(),
            });
        }
        if let Some(default) = &definition.default_value {
            _ = variables
                .entry(name.item.clone())
                .or_insert_with(|| default.clone());
        }
    }
    Ok(variables)
}

/// State of one execution, shared by all of its field futures.
struct Execution<'a> {
    schema: &'a SchemaType,
    pool: &'a BlockingPool,
    context: &'a Context,
    fragments: FnvHashMap<&'a str, &'a Fragment>,
    variables: Variables,
    serial: bool,
    errors: Mutex<Vec<ExecutionError>>,
}

impl<'a> Execution<'a> {
    fn push_error(&self, location: SourcePosition, path: &FieldPath, error: FieldError, kind: ErrorKind) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ExecutionError::new(location, path.to_vec(), error, kind));
    }

    /// Records an error for a value of `field_type`, returning the value its
    /// position takes: `null` if allowed, [`None`] to null the parent.
    fn fail(
        &self,
        field_type: &Type,
        location: SourcePosition,
        path: &FieldPath,
        error: FieldError,
        kind: ErrorKind,
    ) -> Option<Value> {
        self.push_error(location, path, error, kind);
        nullable(field_type)
    }

    /// Resolves a selection set against `object`.
    ///
    /// Returns [`None`] if a non-null field failed, so the object itself must
    /// become `null`.
    fn resolve_object<'s>(
        &'s self,
        object: &'a ObjectType,
        parent: Option<AnyValue>,
        selections: Vec<&'a Selection>,
        path: FieldPath,
    ) -> BoxFuture<'s, Option<Object>> {
        async move {
            let mut fields = GroupedFields::new();
            self.collect_fields(object, &selections, &mut fields, &mut FnvHashSet::default(), &path);

            let mut slots = Slots::new(fields.len());
            let mut propagate = false;
            if self.serial && parent.is_none() {
                for (idx, (key, group)) in fields.iter().enumerate() {
                    match self
                        .resolve_field(object, parent.as_ref(), key, group, path.field(key))
                        .await
                    {
                        Some(value) => slots.fill(idx, value),
                        None => propagate = true,
                    }
                }
            } else {
                let mut pending = fields
                    .iter()
                    .enumerate()
                    .map(|(idx, (key, group))| {
                        self.resolve_field(object, parent.as_ref(), key, group, path.field(key))
                            .map(move |value| (idx, value))
                    })
                    .collect::<FuturesUnordered<_>>();
                while let Some((idx, value)) = pending.next().await {
                    match value {
                        Some(value) => slots.fill(idx, value),
                        None => propagate = true,
                    }
                }
            }

            (!propagate).then(|| slots.into_object(fields.keys().copied()))
        }
        .boxed()
    }

    fn collect_fields(
        &self,
        object: &ObjectType,
        selections: &[&'a Selection],
        fields: &mut GroupedFields<'a>,
        visited: &mut FnvHashSet<&'a str>,
        path: &FieldPath,
    ) {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    if self.is_excluded(&field.item.directives) {
                        continue;
                    }
                    fields
                        .entry(field.item.response_key())
                        .or_default()
                        .push(field);
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.item.name.item.as_str();
                    if self.is_excluded(&spread.item.directives) || !visited.insert(name) {
                        continue;
                    }
                    let Some(fragment) = self.fragments.get(name) else {
                        self.push_error(
                            spread.start,
                            path,
                            format!("Unknown fragment \"{name}\"").into(),
                            ErrorKind::UnknownField,
                        );
                        continue;
                    };
                    if self.applies(&fragment.type_condition.item, object) {
                        let nested: Vec<_> = fragment.selection_set.iter().collect();
                        self.collect_fields(object, &nested, fields, visited, path);
                    }
                }
                Selection::InlineFragment(fragment) => {
                    if self.is_excluded(&fragment.item.directives) {
                        continue;
                    }
                    let applies = fragment
                        .item
                        .type_condition
                        .as_ref()
                        .is_none_or(|cond| self.applies(&cond.item, object));
                    if applies {
                        let nested: Vec<_> = fragment.item.selection_set.iter().collect();
                        self.collect_fields(object, &nested, fields, visited, path);
                    }
                }
            }
        }
    }

    /// Indicates whether a type condition matches `object`, either by name or
    /// through a union containing it.
    fn applies(&self, condition: &str, object: &ObjectType) -> bool {
        condition == object.name().as_str()
            || self
                .schema
                .union_type(condition)
                .is_some_and(|u| u.contains(object.name()))
    }

    fn is_excluded(&self, directives: &[Spanning<Directive>]) -> bool {
        directives.iter().any(|d| {
            let condition = || {
                d.item
                    .argument("if")
                    .map(|v| v.clone().into_const(&self.variables))
                    .and_then(|v| v.as_scalar().and_then(|s| s.as_bool()))
                    .unwrap_or(false)
            };
            match d.item.name.item.as_str() {
                "skip" => condition(),
                "include" => !condition(),
                _ => false,
            }
        })
    }

    async fn resolve_field(
        &self,
        object: &'a ObjectType,
        parent: Option<&AnyValue>,
        key: &str,
        group: &[&'a Spanning<Field>],
        path: FieldPath,
    ) -> Option<Value> {
        let Some(field) = group.first() else {
            return Some(Value::null());
        };
        let name = field.item.name.item.as_str();
        if name == TYPENAME {
            return Some(Value::scalar(object.name().as_str()));
        }
        let Some(property) = object.property(name) else {
            self.push_error(
                field.start,
                &path,
                format!("Unknown field \"{name}\" on type \"{}\"", object.name()).into(),
                ErrorKind::UnknownField,
            );
            return Some(Value::null());
        };
        trace!(type_name = %object.name(), field = name, response_key = key, "resolving field");

        let provided = match self.arguments(object, property, field) {
            Ok(provided) => provided,
            Err(error) => {
                return self.fail(
                    &property.field_type,
                    field.start,
                    &path,
                    error,
                    ErrorKind::UnknownField,
                );
            }
        };

        let input = InputContext::new(self.schema);
        let mut output = property
            .resolver
            .resolve(parent, &provided, input, self.context, self.pool)
            .await;
        for transformation in &property.transformations {
            output = output
                .and_then(|o| transformation.transform(o, &provided, input, self.context));
        }
        let output = match output {
            Ok(output) => output,
            Err(e) => {
                let (kind, error) = e.into_parts();
                return self.fail(&property.field_type, field.start, &path, error, kind);
            }
        };

        let selections = group
            .iter()
            .filter_map(|f| f.item.selection_set.as_ref())
            .flatten()
            .collect();
        self.complete_value(&property.field_type, output, selections, field.start, path)
            .await
    }

    /// Takes the field's arguments from the query, with variables replaced by
    /// their values.
    fn arguments(
        &self,
        object: &ObjectType,
        property: &Property,
        field: &'a Spanning<Field>,
    ) -> Result<IndexMap<&'a str, InputValue>, FieldError> {
        field
            .item
            .arguments
            .iter()
            .map(|(name, value)| {
                if property.argument(&name.item).is_none() {
                    return Err(format!(
                        "Unknown argument \"{}\" on field \"{}\" of type \"{}\"",
                        name.item,
                        property.name(),
                        object.name(),
                    )
                    .into());
                }
                Ok((name.item.as_str(), value.clone().into_const(&self.variables)))
            })
            .collect()
    }

    /// Turns a resolved value into a response value of `field_type`.
    fn complete_value<'s>(
        &'s self,
        field_type: &'a Type,
        output: Output,
        selections: Vec<&'a Selection>,
        location: SourcePosition,
        path: FieldPath,
    ) -> BoxFuture<'s, Option<Value>> {
        async move {
            match (field_type, output) {
                (_, Output::Null) => {
                    if field_type.is_non_null() {
                        self.fail(
                            field_type,
                            location,
                            &path,
                            "Cannot return null for non-nullable field".into(),
                            ErrorKind::NullViolation,
                        )
                    } else {
                        Some(Value::null())
                    }
                }
                (Type::List(inner) | Type::NonNullList(inner), Output::List(items)) => {
                    let mut slots = Slots::new(items.len());
                    let mut propagate = false;
                    let mut pending = items
                        .into_iter()
                        .enumerate()
                        .map(|(idx, item)| {
                            self.complete_value(inner, item, selections.clone(), location, path.index(idx))
                                .map(move |value| (idx, value))
                        })
                        .collect::<FuturesUnordered<_>>();
                    while let Some((idx, value)) = pending.next().await {
                        match value {
                            Some(value) => slots.fill(idx, value),
                            None => propagate = true,
                        }
                    }
                    if propagate {
                        nullable(field_type)
                    } else {
                        Some(Value::list(slots.into_list()))
                    }
                }
                (Type::Named(name) | Type::NonNullNamed(name), Output::Value(item)) => {
                    let value = &**item.value();
                    let completed = match self.schema.type_by_name(name) {
                        Some(TypeNode::Scalar(scalar)) => {
                            scalar.coercion().serialize_value(value).map(Value::Scalar)
                        }
                        Some(TypeNode::Enum(enumeration)) => (enumeration.to_name)(value)
                            .map(Value::scalar)
                            .ok_or_else(|| {
                                format!(
                                    "Value of type {} is not a value of enum \"{name}\"",
                                    item.rust_type().name(),
                                )
                                .into()
                            }),
                        Some(TypeNode::Object(object)) => {
                            return self
                                .resolve_object(object, Some(item.value().clone()), selections, path)
                                .await
                                .map_or_else(|| nullable(field_type), |o| Some(Value::object(o)));
                        }
                        Some(TypeNode::Union(union)) => {
                            let member = union
                                .member_for(item.rust_type().id())
                                .and_then(|m| self.schema.type_by_name(m))
                                .and_then(TypeNode::as_object);
                            let Some(object) = member else {
                                return self.fail(
                                    field_type,
                                    location,
                                    &path,
                                    format!(
                                        "Value of type {} is not a member of union \"{name}\"",
                                        item.rust_type().name(),
                                    )
                                    .into(),
                                    ErrorKind::Coercion,
                                );
                            };
                            return self
                                .resolve_object(object, Some(item.value().clone()), selections, path)
                                .await
                                .map_or_else(|| nullable(field_type), |o| Some(Value::object(o)));
                        }
                        Some(TypeNode::InputObject(_)) | None => {
                            Err(format!("Type \"{name}\" cannot be resolved").into())
                        }
                    };
                    match completed {
                        Ok(value) => Some(value),
                        Err(error) => self.fail(field_type, location, &path, error, ErrorKind::Coercion),
                    }
                }
                (_, output) => self.fail(
                    field_type,
                    location,
                    &path,
                    format!(
                        "Expected a value of type \"{field_type}\", found {}",
                        match output {
                            Output::List(_) => "a list",
                            Output::Value(_) | Output::Null => "a single value",
                        },
                    )
                    .into(),
                    ErrorKind::Coercion,
                ),
            }
        }
        .boxed()
    }
}

fn nullable(field_type: &Type) -> Option<Value> {
    (!field_type.is_non_null()).then(Value::null)
}
