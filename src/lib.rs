//! GraphQL schemas declared at runtime, executed by a mixed blocking/async
//! engine.
//!
//! Types, queries, mutations, unions and custom scalars are declared on a
//! [`SchemaBuilder`]. Rust types describe themselves through [`OutputType`]
//! and [`InputType`], most easily implemented with the [`graphql_object!`],
//! [`graphql_input_object!`], [`graphql_enum!`] and [`graphql_scalar!`]
//! macros. The builder resolves every declaration and every type reachable
//! from it into an immutable [`SchemaType`], which executes parsed queries.
//!
//! Resolvers are plain functions. Blocking ones run on a bounded worker pool,
//! future-returning ones are awaited by the engine, and both may be mixed
//! freely within one query.
//!
//! ```rust
//! use juniper_dynamic::{Context, Schema, Variables, graphql_object, graphql_value};
//!
//! #[derive(Clone)]
//! struct Actor {
//!     name: String,
//!     age: i32,
//! }
//!
//! graphql_object!(Actor { name, age });
//!
//! let schema = Schema::build()
//!     .query("actors", |q| {
//!         q.args(["minAge"]).resolver(|min_age: i32| {
//!             vec![
//!                 Actor { name: "Boguś Linda".into(), age: 66 },
//!                 Actor { name: "Jerzy Stuhr".into(), age: 77 },
//!             ]
//!             .into_iter()
//!             .filter(|a| a.age >= min_age)
//!             .collect::<Vec<_>>()
//!         })
//!     })
//!     .build()
//!     .expect("valid schema");
//!
//! let (data, errors) = schema
//!     .execute_sync("{ actors(minAge: 70) { name } }", None, &Variables::new(), &Context::new())
//!     .expect("query executes");
//!
//! assert!(errors.is_empty());
//! assert_eq!(data, graphql_value!({"actors": [{"name": "Jerzy Stuhr"}]}));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

#[doc(hidden)]
#[macro_use]
pub mod macros;
mod ast;
pub mod config;
pub mod executor;
pub mod integrations;
pub mod parser;
pub mod schema;
mod types;
mod value;

#[cfg(test)]
mod tests;

#[cfg(test)]
mod executor_tests;

use std::{fmt, time::Duration};

#[doc(hidden)]
pub use arcstr::ArcStr;

pub use crate::{
    ast::{
        Definition, Document, InputValue, Operation, OperationType, Selection, Type, Variables,
    },
    config::SchemaConfiguration,
    executor::{
        Context, ErrorKind, ExecutionError, FieldError, FieldResult, GraphQLResponse, PathSegment,
        resolver::{FieldResolver, IntoResolvable, ResolverArg, ResolverMode, Transformation},
    },
    parser::{ParseError, SourcePosition, Spanning, parse_document},
    schema::{
        SchemaError,
        builder::{SchemaBuilder, UnionRef},
        meta::{self, DeprecationStatus},
        model::{Schema, SchemaType},
        scalar::{
            BooleanScalarCoercion, Coercion, FloatScalarCoercion, IntScalarCoercion,
            LongScalarCoercion, ScalarCoercion, StringScalarCoercion,
        },
    },
    types::{
        base::{
            AnyValue, InputContext, InputObjectDescriptor, InputType, Item, ObjectDescriptor,
            Output, OutputType, RustType, TypeRef, TypeRefKind,
        },
        scalars::ID,
        union::UnionMember,
    },
    value::{Object, ScalarValue, Value},
};

/// An error that prevented query execution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GraphQLError {
    /// Query text is not valid GraphQL.
    ParseError(ParseError),
    /// Document contains no operation.
    NoOperationProvided,
    /// Document contains several operations, and no name picks one.
    MultipleOperationsProvided,
    /// No operation of the document has the requested name.
    UnknownOperationName,
    /// Schema has no root for the operation's type.
    UnsupportedOperation(OperationType),
    /// Variable is declared with a type the schema has no input type for.
    UnknownVariableType {
        /// Name of the variable, without `$`.
        variable: String,
        /// Declared type name.
        type_name: String,
    },
    /// Execution took longer than the configured limit.
    Timeout(Duration),
    /// Synchronous execution was requested from within an async runtime, or
    /// its own runtime could not be created.
    Runtime(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(e) => write!(f, "{e}"),
            Self::NoOperationProvided => write!(f, "No operation provided"),
            Self::MultipleOperationsProvided => write!(f, "Multiple operations provided"),
            Self::UnknownOperationName => write!(f, "Unknown operation name"),
            Self::UnsupportedOperation(op) => write!(f, "Schema does not support {op} operations"),
            Self::UnknownVariableType {
                variable,
                type_name,
            } => write!(f, "Variable \"${variable}\" has unknown input type \"{type_name}\""),
            Self::Timeout(limit) => write!(f, "Execution timed out after {limit:?}"),
            Self::Runtime(e) => write!(f, "Failed to start execution runtime: {e}"),
        }
    }
}

impl std::error::Error for GraphQLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseError(e) => Some(e),
            Self::NoOperationProvided
            | Self::MultipleOperationsProvided
            | Self::UnknownOperationName
            | Self::UnsupportedOperation(_)
            | Self::UnknownVariableType { .. }
            | Self::Timeout(_)
            | Self::Runtime(_) => None,
        }
    }
}

impl From<ParseError> for GraphQLError {
    fn from(e: ParseError) -> Self {
        Self::ParseError(e)
    }
}
