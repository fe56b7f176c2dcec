//! Schema declaration, the type graph builder and the resulting registry.

pub mod builder;
pub mod meta;
pub mod model;
pub(crate) mod registry;
pub mod scalar;

use arcstr::ArcStr;
use derive_more::with_trait::{Display, Error};

/// Error building a [`Schema`](model::Schema) from its declarations.
///
/// Every variant names the type, property or union the failure is about.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum SchemaError {
    /// Two types were registered under the same name.
    #[display("Type name \"{name}\" is used by more than one type")]
    DuplicateTypeName {
        /// Name in use.
        name: ArcStr,
    },

    /// Two properties of one type share a name.
    #[display("Property \"{property}\" is declared more than once on \"{type_name}\"")]
    DuplicateProperty {
        /// Declaring type.
        type_name: ArcStr,
        /// Property in question.
        property: ArcStr,
    },

    /// A property resolves to a function value.
    #[display(
        "Cannot handle function {signature} as Object type \
         (property \"{property}\" of \"{type_name}\")"
    )]
    FunctionType {
        /// Name of the function type.
        signature: &'static str,
        /// Declaring type.
        type_name: ArcStr,
        /// Property in question.
        property: ArcStr,
    },

    /// A property or argument has a type with unresolved type parameters.
    #[display("Generic types are not supported by GraphQL, found {type_name}")]
    GenericType {
        /// Rust name of the type.
        type_name: &'static str,
    },

    /// A scalar type was used without a registered coercion.
    #[display("No scalar is registered for {type_name}")]
    UnknownScalar {
        /// Rust name of the type.
        type_name: &'static str,
    },

    /// A custom scalar was declared without both coercion functions.
    #[display("Scalar \"{name}\" needs both a serialize and a deserialize function")]
    IncompleteScalar {
        /// Name of the scalar.
        name: ArcStr,
    },

    /// A customization refers to a property the type doesn't have.
    #[display("Type \"{type_name}\" has no property \"{property}\"")]
    UnknownProperty {
        /// Customized type.
        type_name: ArcStr,
        /// Property in question.
        property: ArcStr,
    },

    /// A query, mutation, property or transformation has no function.
    #[display("No resolver is declared for \"{property}\" of \"{type_name}\"")]
    MissingResolver {
        /// Declaring type.
        type_name: ArcStr,
        /// Property in question.
        property: ArcStr,
    },

    /// The argument names don't match the resolver's parameters.
    #[display(
        "\"{property}\" of \"{type_name}\" names {found} argument(s), \
         but its function takes {expected}"
    )]
    ArgumentNames {
        /// Declaring type.
        type_name: ArcStr,
        /// Property in question.
        property: ArcStr,
        /// Number of parameters bound from query arguments.
        expected: usize,
        /// Number of names declared.
        found: usize,
    },

    /// Two functions of one property bind the same argument to different
    /// types.
    #[display(
        "Argument \"{argument}\" of \"{property}\" on \"{type_name}\" \
         is declared as both {first} and {second}"
    )]
    ConflictingArgument {
        /// Declaring type.
        type_name: ArcStr,
        /// Property in question.
        property: ArcStr,
        /// Argument in question.
        argument: ArcStr,
        /// Type of the first declaration.
        first: String,
        /// Type of the conflicting declaration.
        second: String,
    },

    /// A transformation takes a value of another type than its property
    /// resolves to.
    #[display(
        "Transformation of \"{property}\" on \"{type_name}\" expects {found}, \
         but the property resolves to {expected}"
    )]
    TransformationType {
        /// Declaring type.
        type_name: ArcStr,
        /// Property in question.
        property: ArcStr,
        /// Rust type of the property.
        expected: &'static str,
        /// Rust type the transformation takes.
        found: &'static str,
    },

    /// A union property refers to an undeclared union.
    #[display("Union \"{name}\" is not declared")]
    UnknownUnion {
        /// Name of the union.
        name: ArcStr,
    },

    /// A union property lacks its union, or its resolver doesn't return
    /// union members.
    #[display(
        "Property \"{property}\" of \"{type_name}\" must declare a union return type \
         and resolve to UnionMember values"
    )]
    UnionReturnType {
        /// Declaring type.
        type_name: ArcStr,
        /// Property in question.
        property: ArcStr,
    },

    /// A union member is not an object type.
    #[display("Union \"{union}\" can only contain object types, found {member}")]
    InvalidUnionMember {
        /// Name of the union.
        union: ArcStr,
        /// Rust name of the member.
        member: &'static str,
    },

    /// A union has no members.
    #[display("Union \"{name}\" has no members")]
    EmptyUnion {
        /// Name of the union.
        name: ArcStr,
    },

    /// A type was used where its kind doesn't fit.
    #[display("{type_name} cannot be used as {usage}")]
    InvalidTypeUsage {
        /// Rust name of the type.
        type_name: &'static str,
        /// Expected kind.
        usage: &'static str,
    },
}
