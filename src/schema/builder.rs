//! Declaration surface of a [`Schema`].
//!
//! Declarations are collected as they are made and only checked when
//! [`SchemaBuilder::build()`] hands them to the type graph builder, so
//! declaration order never matters.

use std::{any::TypeId, fmt, marker::PhantomData, mem, sync::Arc};

use arcstr::ArcStr;
use indexmap::IndexMap;

use crate::{
    config::SchemaConfiguration,
    executor::{
        FieldError, FieldResult,
        resolver::{
            BlockingPropertyResolver, BlockingResolver, FieldResolver, SuspendingPropertyResolver,
            SuspendingResolver, Transformation, TransformationFn,
        },
    },
    schema::{
        SchemaError,
        meta::{DeprecationStatus, PropertyOrigin},
        model::Schema,
        registry::Registry,
        scalar::{Coercion, RawScalar, ScalarType},
    },
    types::base::{InputType, OutputType, RustType, TypeRef, TypeRefKind},
};

/// Everything declared on a [`SchemaBuilder`], as consumed by the type graph
/// builder.
#[derive(Debug, Default)]
pub(crate) struct Declarations {
    pub(crate) queries: Vec<PropertyDecl>,
    pub(crate) mutations: Vec<PropertyDecl>,
    pub(crate) types: IndexMap<TypeId, TypeDecl>,
    pub(crate) enums: IndexMap<TypeId, EnumDecl>,
    pub(crate) unions: IndexMap<ArcStr, UnionDecl>,
    pub(crate) scalars: Vec<ScalarType>,
    pub(crate) inputs: Vec<TypeRef>,
}

#[derive(Debug)]
pub(crate) struct PropertyDecl {
    pub(crate) name: ArcStr,
    pub(crate) description: Option<ArcStr>,
    pub(crate) deprecation: DeprecationStatus,
    pub(crate) args: Vec<ArcStr>,
    pub(crate) resolver: Option<FieldResolver>,
    pub(crate) origin: PropertyOrigin,
    pub(crate) union: Option<ArcStr>,
}

impl PropertyDecl {
    fn new(name: ArcStr, origin: PropertyOrigin) -> Self {
        Self {
            name,
            description: None,
            deprecation: DeprecationStatus::Current,
            args: vec![],
            resolver: None,
            origin,
            union: None,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct PropertyConfig {
    pub(crate) description: Option<ArcStr>,
    pub(crate) deprecation: Option<DeprecationStatus>,
}

#[derive(Debug)]
pub(crate) struct TransformationDecl {
    pub(crate) property: ArcStr,
    pub(crate) args: Vec<ArcStr>,
    pub(crate) transformation: Option<Transformation>,
}

#[derive(Debug)]
pub(crate) struct TypeDecl {
    pub(crate) type_ref: TypeRef,
    pub(crate) name: Option<ArcStr>,
    pub(crate) description: Option<ArcStr>,
    pub(crate) ignored: Vec<ArcStr>,
    pub(crate) configured: Vec<(ArcStr, PropertyConfig)>,
    pub(crate) transformations: Vec<TransformationDecl>,
    pub(crate) properties: Vec<PropertyDecl>,
}

impl TypeDecl {
    pub(crate) fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            name: None,
            description: None,
            ignored: vec![],
            configured: vec![],
            transformations: vec![],
            properties: vec![],
        }
    }
}

#[derive(Debug)]
pub(crate) struct EnumDecl {
    pub(crate) type_ref: TypeRef,
    pub(crate) name: Option<ArcStr>,
    pub(crate) description: Option<ArcStr>,
}

#[derive(Debug)]
pub(crate) struct UnionDecl {
    pub(crate) description: Option<ArcStr>,
    pub(crate) members: Vec<TypeRef>,
}

/// Collects the declarations of a [`Schema`].
///
/// ```rust
/// use juniper_dynamic::{Schema, graphql_object};
///
/// #[derive(Clone)]
/// struct Actor {
///     name: String,
///     age: i32,
/// }
///
/// graphql_object!(Actor { name, age });
///
/// let schema = Schema::build()
///     .query("actor", |q| {
///         q.resolver(|| Actor { name: "Little John".into(), age: 44 })
///     })
///     .type_::<Actor>(|t| {
///         t.property("senior", |p| p.resolver(|actor: &Actor| actor.age >= 65))
///     })
///     .build()
///     .expect("valid schema");
///
/// assert!(schema.object_type::<Actor>().is_some());
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct SchemaBuilder {
    declarations: Declarations,
    configuration: SchemaConfiguration,
    errors: Vec<SchemaError>,
}

impl SchemaBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Declares a root query field.
    pub fn query(
        &mut self,
        name: impl Into<ArcStr>,
        f: impl FnOnce(FieldDsl) -> FieldDsl,
    ) -> &mut Self {
        let dsl = f(FieldDsl(PropertyDecl::new(name.into(), PropertyOrigin::Extension)));
        self.declarations.queries.push(dsl.0);
        self
    }

    /// Declares a root mutation field.
    pub fn mutation(
        &mut self,
        name: impl Into<ArcStr>,
        f: impl FnOnce(FieldDsl) -> FieldDsl,
    ) -> &mut Self {
        let dsl = f(FieldDsl(PropertyDecl::new(name.into(), PropertyOrigin::Extension)));
        self.declarations.mutations.push(dsl.0);
        self
    }

    /// Declares, or customizes, the object type backed by `T`.
    ///
    /// Repeated calls for the same `T` extend the same declaration.
    pub fn type_<T: OutputType>(&mut self, f: impl FnOnce(TypeDsl<T>) -> TypeDsl<T>) -> &mut Self {
        let type_ref = T::type_ref();
        if !matches!(type_ref.kind(), TypeRefKind::Object(_)) {
            self.errors.push(SchemaError::InvalidTypeUsage {
                type_name: type_ref.rust().name(),
                usage: "an object type",
            });
            return self;
        }

        let id = type_ref.rust().id();
        let decl = self
            .declarations
            .types
            .shift_remove(&id)
            .unwrap_or_else(|| TypeDecl::new(type_ref));
        let dsl = f(TypeDsl {
            decl,
            _type: PhantomData,
        });
        _ = self.declarations.types.insert(id, dsl.decl);
        self
    }

    /// Declares a union of object types, returning the reference union
    /// properties declare as their return type.
    pub fn union_type(
        &mut self,
        name: impl Into<ArcStr>,
        f: impl FnOnce(UnionDsl) -> UnionDsl,
    ) -> UnionRef {
        let name = name.into();
        let dsl = f(UnionDsl(UnionDecl {
            description: None,
            members: vec![],
        }));
        if self.declarations.unions.contains_key(&name) {
            self.errors.push(SchemaError::DuplicateTypeName { name: name.clone() });
        } else {
            _ = self.declarations.unions.insert(name.clone(), dsl.0);
        }
        UnionRef { name }
    }

    /// Customizes the enum type backed by `E`.
    pub fn enum_type<E: OutputType>(&mut self, f: impl FnOnce(EnumDsl<E>) -> EnumDsl<E>) -> &mut Self {
        let type_ref = E::type_ref();
        if !matches!(type_ref.kind(), TypeRefKind::Enum(_)) {
            self.errors.push(SchemaError::InvalidTypeUsage {
                type_name: type_ref.rust().name(),
                usage: "an enum type",
            });
            return self;
        }

        let id = type_ref.rust().id();
        let dsl = f(EnumDsl {
            decl: EnumDecl {
                type_ref,
                name: None,
                description: None,
            },
            _type: PhantomData,
        });
        _ = self.declarations.enums.insert(id, dsl.decl);
        self
    }

    /// Declares a custom scalar represented as a GraphQL `String`.
    pub fn string_scalar<T: Send + Sync + 'static>(
        &mut self,
        f: impl FnOnce(ScalarDsl<T, String>) -> ScalarDsl<T, String>,
    ) -> &mut Self {
        self.scalar(f)
    }

    /// Declares a custom scalar represented as a GraphQL `Int`.
    pub fn int_scalar<T: Send + Sync + 'static>(
        &mut self,
        f: impl FnOnce(ScalarDsl<T, i32>) -> ScalarDsl<T, i32>,
    ) -> &mut Self {
        self.scalar(f)
    }

    /// Declares a custom scalar represented as a 64-bit `Long`.
    pub fn long_scalar<T: Send + Sync + 'static>(
        &mut self,
        f: impl FnOnce(ScalarDsl<T, i64>) -> ScalarDsl<T, i64>,
    ) -> &mut Self {
        self.scalar(f)
    }

    /// Declares a custom scalar represented as a GraphQL `Float`.
    pub fn float_scalar<T: Send + Sync + 'static>(
        &mut self,
        f: impl FnOnce(ScalarDsl<T, f64>) -> ScalarDsl<T, f64>,
    ) -> &mut Self {
        self.scalar(f)
    }

    /// Declares a custom scalar represented as a GraphQL `Boolean`.
    pub fn boolean_scalar<T: Send + Sync + 'static>(
        &mut self,
        f: impl FnOnce(ScalarDsl<T, bool>) -> ScalarDsl<T, bool>,
    ) -> &mut Self {
        self.scalar(f)
    }

    fn scalar<T: Send + Sync + 'static, R: RawScalar>(
        &mut self,
        f: impl FnOnce(ScalarDsl<T, R>) -> ScalarDsl<T, R>,
    ) -> &mut Self {
        let dsl = f(ScalarDsl {
            name: None,
            description: None,
            serialize: None,
            deserialize: None,
        });
        match dsl.finish() {
            Ok(scalar) => self.declarations.scalars.push(scalar),
            Err(e) => self.errors.push(e),
        }
        self
    }

    /// Registers `T` as an input type, along with the types of its fields.
    ///
    /// Types of resolver arguments are registered automatically; this is
    /// only needed for input types no resolver mentions.
    pub fn input_type<T: InputType>(&mut self) -> &mut Self {
        self.declarations.inputs.push(T::input_ref());
        self
    }

    /// Adjusts the execution settings of the schema.
    pub fn configure(
        &mut self,
        f: impl FnOnce(SchemaConfiguration) -> SchemaConfiguration,
    ) -> &mut Self {
        self.configuration = f(mem::take(&mut self.configuration));
        self
    }

    /// Resolves the declarations into an immutable [`Schema`].
    ///
    /// # Errors
    ///
    /// If a declaration is invalid, or a declared type cannot be represented
    /// in the type graph.
    pub fn build(&mut self) -> Result<Schema, SchemaError> {
        if let Some(e) = mem::take(&mut self.errors).into_iter().next() {
            return Err(e);
        }
        let schema = Registry::build(mem::take(&mut self.declarations))?;
        Ok(Schema::new(schema, mem::take(&mut self.configuration)))
    }
}

/// Declaration of a root query or mutation field.
#[derive(Debug)]
#[must_use]
pub struct FieldDsl(PropertyDecl);

impl FieldDsl {
    /// Sets the description of the field.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.0.description = Some(description.into());
        self
    }

    /// Marks the field deprecated for `reason`.
    pub fn deprecated(mut self, reason: impl Into<ArcStr>) -> Self {
        self.0.deprecation = DeprecationStatus::Deprecated(Some(reason.into()));
        self
    }

    /// Names the query arguments bound to the resolver's parameters, in
    /// order. [`Context`](crate::Context) parameters are not named.
    pub fn args<I: IntoIterator<Item = S>, S: Into<ArcStr>>(mut self, names: I) -> Self {
        self.0.args = names.into_iter().map(Into::into).collect();
        self
    }

    /// Resolves the field with a blocking function.
    pub fn resolver<Args, R>(mut self, f: impl BlockingResolver<Args, R>) -> Self {
        self.0.resolver = Some(f.into_resolver());
        self
    }

    /// Resolves the field with a function returning a future.
    pub fn suspend_resolver<Args, R>(mut self, f: impl SuspendingResolver<Args, R>) -> Self {
        self.0.resolver = Some(f.into_resolver());
        self
    }
}

/// Customization of the object type backed by `T`.
#[derive(Debug)]
#[must_use]
pub struct TypeDsl<T> {
    decl: TypeDecl,
    _type: PhantomData<fn(T)>,
}

impl<T: Send + Sync + 'static> TypeDsl<T> {
    /// Overrides the name the type is registered under.
    pub fn name(mut self, name: impl Into<ArcStr>) -> Self {
        self.decl.name = Some(name.into());
        self
    }

    /// Sets the description of the type.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.decl.description = Some(description.into());
        self
    }

    /// Removes a native property. Its type is never looked at.
    pub fn ignore(mut self, property: impl Into<ArcStr>) -> Self {
        self.decl.ignored.push(property.into());
        self
    }

    /// Overrides the metadata of a property.
    pub fn configure(
        mut self,
        property: impl Into<ArcStr>,
        f: impl FnOnce(PropertyConfigDsl) -> PropertyConfigDsl,
    ) -> Self {
        let dsl = f(PropertyConfigDsl(PropertyConfig::default()));
        self.decl.configured.push((property.into(), dsl.0));
        self
    }

    /// Attaches a transformation to a property. Transformations of one
    /// property apply in the order they are declared.
    pub fn transformation(
        mut self,
        property: impl Into<ArcStr>,
        f: impl FnOnce(TransformationDsl) -> TransformationDsl,
    ) -> Self {
        let dsl = f(TransformationDsl {
            args: vec![],
            transformation: None,
        });
        self.decl.transformations.push(TransformationDecl {
            property: property.into(),
            args: dsl.args,
            transformation: dsl.transformation,
        });
        self
    }

    /// Declares an extension property computed by a resolver.
    pub fn property(
        mut self,
        name: impl Into<ArcStr>,
        f: impl FnOnce(PropertyDsl<T>) -> PropertyDsl<T>,
    ) -> Self {
        let dsl = f(PropertyDsl::new(name.into(), PropertyOrigin::Extension));
        self.decl.properties.push(dsl.decl);
        self
    }

    /// Declares a property resolving to members of a union.
    pub fn union_property(
        mut self,
        name: impl Into<ArcStr>,
        f: impl FnOnce(PropertyDsl<T>) -> PropertyDsl<T>,
    ) -> Self {
        let dsl = f(PropertyDsl::new(name.into(), PropertyOrigin::Union));
        self.decl.properties.push(dsl.decl);
        self
    }
}

/// Declaration of a resolver-backed property of `T`.
#[derive(Debug)]
#[must_use]
pub struct PropertyDsl<T> {
    decl: PropertyDecl,
    _type: PhantomData<fn(T)>,
}

impl<T: Send + Sync + 'static> PropertyDsl<T> {
    fn new(name: ArcStr, origin: PropertyOrigin) -> Self {
        Self {
            decl: PropertyDecl::new(name, origin),
            _type: PhantomData,
        }
    }

    /// Sets the description of the property.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.decl.description = Some(description.into());
        self
    }

    /// Marks the property deprecated for `reason`.
    pub fn deprecated(mut self, reason: impl Into<ArcStr>) -> Self {
        self.decl.deprecation = DeprecationStatus::Deprecated(Some(reason.into()));
        self
    }

    /// Names the query arguments bound to the resolver's parameters after
    /// the receiver, in order.
    pub fn args<I: IntoIterator<Item = S>, S: Into<ArcStr>>(mut self, names: I) -> Self {
        self.decl.args = names.into_iter().map(Into::into).collect();
        self
    }

    /// Declares the union this property resolves to.
    pub fn return_type(mut self, union: &UnionRef) -> Self {
        self.decl.union = Some(union.name.clone());
        self
    }

    /// Resolves the property with a blocking function receiving `&T`.
    pub fn resolver<Args, R>(mut self, f: impl BlockingPropertyResolver<T, Args, R>) -> Self {
        self.decl.resolver = Some(f.into_resolver());
        self
    }

    /// Resolves the property with a function receiving `Arc<T>` and
    /// returning a future.
    pub fn suspend_resolver<Args, R>(
        mut self,
        f: impl SuspendingPropertyResolver<T, Args, R>,
    ) -> Self {
        self.decl.resolver = Some(f.into_resolver());
        self
    }
}

/// Metadata overrides of an existing property.
#[derive(Debug)]
#[must_use]
pub struct PropertyConfigDsl(PropertyConfig);

impl PropertyConfigDsl {
    /// Replaces the description of the property.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.0.description = Some(description.into());
        self
    }

    /// Marks the property deprecated for `reason`.
    pub fn deprecated(mut self, reason: impl Into<ArcStr>) -> Self {
        self.0.deprecation = Some(DeprecationStatus::Deprecated(Some(reason.into())));
        self
    }

    /// Clears a deprecation.
    pub fn current(mut self) -> Self {
        self.0.deprecation = Some(DeprecationStatus::Current);
        self
    }
}

/// Declaration of a property transformation.
#[derive(Debug)]
#[must_use]
pub struct TransformationDsl {
    args: Vec<ArcStr>,
    transformation: Option<Transformation>,
}

impl TransformationDsl {
    /// Names the query arguments bound to the function's parameters after
    /// the transformed value, in order.
    pub fn args<I: IntoIterator<Item = S>, S: Into<ArcStr>>(mut self, names: I) -> Self {
        self.args = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the function, which receives the property value first.
    pub fn apply<V, Args, R>(mut self, f: impl TransformationFn<V, Args, R>) -> Self {
        self.transformation = Some(f.into_transformation());
        self
    }
}

/// Handle of a declared union.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnionRef {
    name: ArcStr,
}

impl UnionRef {
    /// Name of the union.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }
}

/// Declaration of a union.
#[derive(Debug)]
#[must_use]
pub struct UnionDsl(UnionDecl);

impl UnionDsl {
    /// Adds the object type backed by `T` as a member.
    pub fn member<T: OutputType>(mut self) -> Self {
        self.0.members.push(T::type_ref());
        self
    }

    /// Sets the description of the union.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.0.description = Some(description.into());
        self
    }
}

/// Customization of the enum type backed by `E`.
#[derive(Debug)]
#[must_use]
pub struct EnumDsl<E> {
    decl: EnumDecl,
    _type: PhantomData<fn(E)>,
}

impl<E> EnumDsl<E> {
    /// Overrides the name the enum is registered under.
    pub fn name(mut self, name: impl Into<ArcStr>) -> Self {
        self.decl.name = Some(name.into());
        self
    }

    /// Sets the description of the enum.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.decl.description = Some(description.into());
        self
    }
}

/// Declaration of a custom scalar backed by `T` and represented as `R`.
#[must_use]
pub struct ScalarDsl<T, R> {
    name: Option<ArcStr>,
    description: Option<ArcStr>,
    serialize: Option<Box<dyn Fn(&T) -> R + Send + Sync>>,
    deserialize: Option<Box<dyn Fn(R) -> FieldResult<T> + Send + Sync>>,
}

impl<T: Send + Sync + 'static, R: RawScalar> ScalarDsl<T, R> {
    /// Sets the name of the scalar. Defaults to the name of `T`.
    pub fn name(mut self, name: impl Into<ArcStr>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the description of the scalar.
    pub fn description(mut self, description: impl Into<ArcStr>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the function producing the external representation.
    pub fn serialize(mut self, f: impl Fn(&T) -> R + Send + Sync + 'static) -> Self {
        self.serialize = Some(Box::new(f));
        self
    }

    /// Sets the function decoding the external representation.
    ///
    /// Any error it returns is reported as an argument binding failure.
    pub fn deserialize<E: Into<FieldError>>(
        mut self,
        f: impl Fn(R) -> Result<T, E> + Send + Sync + 'static,
    ) -> Self {
        self.deserialize = Some(Box::new(move |raw| f(raw).map_err(Into::into)));
        self
    }

    fn finish(self) -> Result<ScalarType, SchemaError> {
        let Self {
            name,
            description,
            serialize,
            deserialize,
        } = self;
        let name = name.unwrap_or_else(|| RustType::of::<T>().short_name().into());
        let (Some(serialize), Some(deserialize)) = (serialize, deserialize) else {
            return Err(SchemaError::IncompleteScalar { name });
        };
        let coercion = Coercion::new(serialize, deserialize);
        Ok(ScalarType::new(name, description, Arc::new(coercion)))
    }
}

impl<T, R> fmt::Debug for ScalarDsl<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarDsl")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
