//! Types used to describe the type graph of a schema

use std::{any::TypeId, sync::Arc};

use arcstr::ArcStr;
use fnv::FnvHashMap;
use indexmap::IndexMap;

use crate::{
    ast::Type,
    executor::resolver::{FieldResolver, Transformation},
    schema::scalar::ScalarType,
    types::base::{EnumNameFn, RustType},
};

/// Whether an item is deprecated, with context.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum DeprecationStatus {
    /// The field/variant is not deprecated.
    #[default]
    Current,
    /// The field/variant is deprecated, with an optional reason
    Deprecated(Option<ArcStr>),
}

impl DeprecationStatus {
    /// If this deprecation status indicates the item is deprecated.
    pub fn is_deprecated(&self) -> bool {
        match self {
            Self::Current => false,
            Self::Deprecated(_) => true,
        }
    }

    /// An optional reason for the deprecation, or none if `Current`.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Current => None,
            Self::Deprecated(rsn) => rsn.as_deref(),
        }
    }
}

/// Named type of the graph.
#[derive(Debug)]
pub enum TypeNode {
    /// Leaf type with a coercion pair.
    Scalar(ScalarType),
    /// Leaf type with an ordered set of named values.
    Enum(EnumType),
    /// Type with properties.
    Object(ObjectType),
    /// Set of object types one of which is picked at runtime.
    Union(UnionType),
    /// Shape of an argument value.
    InputObject(InputObjectType),
}

impl TypeNode {
    /// Returns the name of the type.
    pub fn name(&self) -> &ArcStr {
        match self {
            Self::Scalar(s) => s.name(),
            Self::Enum(e) => &e.name,
            Self::Object(o) => &o.name,
            Self::Union(u) => &u.name,
            Self::InputObject(i) => &i.name,
        }
    }

    /// Returns the description of the type, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        match self {
            Self::Scalar(s) => s.description(),
            Self::Enum(e) => e.description.as_ref(),
            Self::Object(o) => o.description.as_ref(),
            Self::Union(u) => u.description.as_ref(),
            Self::InputObject(i) => i.description.as_ref(),
        }
    }

    /// Views the type as a scalar, if it is one.
    pub fn as_scalar(&self) -> Option<&ScalarType> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Views the type as an enum, if it is one.
    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Views the type as an object, if it is one.
    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Views the type as a union, if it is one.
    pub fn as_union(&self) -> Option<&UnionType> {
        match self {
            Self::Union(u) => Some(u),
            _ => None,
        }
    }

    /// Views the type as an input object, if it is one.
    pub fn as_input_object(&self) -> Option<&InputObjectType> {
        match self {
            Self::InputObject(i) => Some(i),
            _ => None,
        }
    }

    /// Indicates whether values of this type can be passed as arguments.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }
}

/// Where a [`Property`] gets its value from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropertyOrigin {
    /// Field of the underlying Rust value.
    Native,
    /// Resolver declared on the schema builder.
    Extension,
    /// Resolver declared on the schema builder returning a union member.
    Union,
}

/// Argument of a [`Property`].
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub(crate) name: ArcStr,
    pub(crate) arg_type: Type,
}

impl Argument {
    /// Name of the argument.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Type of the argument.
    pub fn arg_type(&self) -> &Type {
        &self.arg_type
    }
}

/// Field of an [`ObjectType`], or a root query/mutation.
#[derive(Clone, Debug)]
pub struct Property {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) deprecation: DeprecationStatus,
    pub(crate) field_type: Type,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) origin: PropertyOrigin,
    pub(crate) resolver: FieldResolver,
    pub(crate) transformations: Vec<Transformation>,
}

impl Property {
    /// Name of the property.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Deprecation status of the property.
    pub fn deprecation(&self) -> &DeprecationStatus {
        &self.deprecation
    }

    /// Declared type of the resolved value.
    pub fn field_type(&self) -> &Type {
        &self.field_type
    }

    /// Arguments of the resolver followed by those of the transformations,
    /// each name listed once.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Looks up an argument by name.
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name.as_str() == name)
    }

    /// Where the value of the property comes from.
    pub fn origin(&self) -> PropertyOrigin {
        self.origin
    }

    /// Resolver producing the value, before transformations.
    pub fn resolver(&self) -> &FieldResolver {
        &self.resolver
    }

    /// Transformations in the order they are applied.
    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    /// Name of the union this property returns members of.
    pub fn union_name(&self) -> Option<&str> {
        (self.origin == PropertyOrigin::Union).then(|| self.field_type.innermost_name())
    }
}

/// Object type metadata
#[derive(Debug)]
pub struct ObjectType {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) rust: Option<RustType>,
    pub(crate) properties: IndexMap<ArcStr, Property>,
}

impl ObjectType {
    /// Returns the name of the object type.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Returns the description of the object type, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Rust type backing this object, [`None`] for the root types.
    pub fn rust_type(&self) -> Option<RustType> {
        self.rust
    }

    /// All requestable properties, in declaration order.
    pub fn properties(&self) -> &IndexMap<ArcStr, Property> {
        &self.properties
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Properties backed by resolvers declared on the schema builder.
    pub fn extension_properties(&self) -> impl Iterator<Item = &Property> {
        self.by_origin(PropertyOrigin::Extension)
    }

    /// Properties resolving to union members.
    pub fn union_properties(&self) -> impl Iterator<Item = &Property> {
        self.by_origin(PropertyOrigin::Union)
    }

    /// Transformations of all properties, paired with the property name.
    pub fn transformations(&self) -> impl Iterator<Item = (&ArcStr, &Transformation)> {
        self.properties
            .values()
            .flat_map(|p| p.transformations.iter().map(move |t| (&p.name, t)))
    }

    fn by_origin(&self, origin: PropertyOrigin) -> impl Iterator<Item = &Property> {
        self.properties.values().filter(move |p| p.origin == origin)
    }
}

/// Enum type metadata
#[derive(derive_more::Debug)]
pub struct EnumType {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) rust: RustType,
    pub(crate) values: Vec<ArcStr>,
    #[debug(skip)]
    pub(crate) to_name: Arc<EnumNameFn>,
}

impl EnumType {
    /// Returns the name of the enum type.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Returns the description of the enum type, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Rust type backing this enum.
    pub fn rust_type(&self) -> RustType {
        self.rust
    }

    /// Value names in declaration order.
    pub fn values(&self) -> &[ArcStr] {
        &self.values
    }
}

/// Union type metadata
#[derive(Debug)]
pub struct UnionType {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) members: Vec<ArcStr>,
    pub(crate) member_ids: FnvHashMap<TypeId, ArcStr>,
}

impl UnionType {
    /// Returns the name of the union type.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Returns the description of the union type, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Names of the member object types, in declaration order.
    pub fn members(&self) -> &[ArcStr] {
        &self.members
    }

    /// Picks the member a value of the given Rust type belongs to.
    pub fn member_for(&self, id: TypeId) -> Option<&ArcStr> {
        self.member_ids.get(&id)
    }

    /// Whether `member` is one of the member object types.
    pub fn contains(&self, member: &str) -> bool {
        self.members.iter().any(|m| m.as_str() == member)
    }
}

/// Input object type metadata
#[derive(Debug)]
pub struct InputObjectType {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) rust: RustType,
    pub(crate) fields: IndexMap<ArcStr, Type>,
}

impl InputObjectType {
    /// Returns the name of the input object type.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Returns the description of the input object type, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Rust type the input object decodes to.
    pub fn rust_type(&self) -> RustType {
        self.rust
    }

    /// Declared fields and their types, in declaration order.
    pub fn fields(&self) -> &IndexMap<ArcStr, Type> {
        &self.fields
    }
}
