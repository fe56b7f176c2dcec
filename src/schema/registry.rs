//! Type graph builder.
//!
//! Walks the declarations of a [`SchemaBuilder`](super::builder::SchemaBuilder)
//! and every type reachable from them, producing the immutable
//! [`SchemaType`]. Types are memoized by their Rust identity, and a type's
//! name is reserved before its properties are walked, so self-referencing and
//! mutually referencing types resolve without recursing forever.

use std::{any::TypeId, mem};

use arcstr::ArcStr;
use fnv::FnvHashMap;
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    ast::Type,
    executor::resolver::FieldResolver,
    schema::{
        SchemaError,
        builder::{Declarations, EnumDecl, PropertyDecl, TransformationDecl, TypeDecl, UnionDecl},
        meta::{
            Argument, DeprecationStatus, EnumType, InputObjectType, ObjectType, Property,
            PropertyOrigin, TypeNode, UnionType,
        },
        model::SchemaType,
        scalar::{ScalarType, builtin_scalars},
    },
    types::base::{EnumRef, InputObjectRef, ObjectRef, RustType, TypeRef, TypeRefKind},
};

const QUERY: &str = "Query";
const MUTATION: &str = "Mutation";

/// Property whose type is being resolved, for error reporting.
struct Site<'s> {
    type_name: &'s ArcStr,
    property: &'s ArcStr,
    union: Option<&'s ArcStr>,
}

pub(crate) struct Registry {
    types: IndexMap<ArcStr, Option<TypeNode>>,
    output_ids: FnvHashMap<TypeId, ArcStr>,
    input_ids: FnvHashMap<TypeId, ArcStr>,
    scalar_ids: FnvHashMap<TypeId, ArcStr>,
    type_decls: IndexMap<TypeId, TypeDecl>,
    enum_decls: IndexMap<TypeId, EnumDecl>,
    union_names: Vec<ArcStr>,
}

impl Registry {
    pub(crate) fn build(declarations: Declarations) -> Result<SchemaType, SchemaError> {
        let Declarations {
            queries,
            mutations,
            types,
            enums,
            unions,
            scalars,
            inputs,
        } = declarations;

        let mut registry = Self {
            types: IndexMap::new(),
            output_ids: FnvHashMap::default(),
            input_ids: FnvHashMap::default(),
            scalar_ids: FnvHashMap::default(),
            type_decls: types,
            enum_decls: enums,
            union_names: unions.keys().cloned().collect(),
        };

        for scalar in builtin_scalars().into_iter().chain(scalars) {
            registry.add_scalar(scalar)?;
        }

        registry.add_root(QUERY, queries)?;
        let mutation_type_name = if mutations.is_empty() {
            None
        } else {
            registry.add_root(MUTATION, mutations)?;
            Some(ArcStr::from(MUTATION))
        };

        // Declared but unreferenced types are part of the schema as well.
        let declared: Vec<TypeRef> = registry
            .type_decls
            .values()
            .map(|d| d.type_ref.clone())
            .chain(registry.enum_decls.values().map(|d| d.type_ref.clone()))
            .collect();
        for type_ref in &declared {
            match type_ref.kind() {
                TypeRefKind::Object(object) => {
                    _ = registry.register_object(type_ref, object)?;
                }
                TypeRefKind::Enum(enumeration) => {
                    _ = registry.register_enum(type_ref.rust(), enumeration)?;
                }
                _ => {}
            }
        }

        for input in &inputs {
            _ = registry.input_type(input)?;
        }

        for (name, decl) in unions {
            registry.register_union(name, decl)?;
        }

        let Self {
            types,
            output_ids,
            input_ids,
            scalar_ids,
            ..
        } = registry;
        let types: IndexMap<_, _> = types
            .into_iter()
            .filter_map(|(name, node)| node.map(|node| (name, node)))
            .collect();
        debug!(types = types.len(), "schema built");

        Ok(SchemaType::new(
            types,
            output_ids,
            input_ids,
            scalar_ids,
            ArcStr::from(QUERY),
            mutation_type_name,
        ))
    }

    /// Claims `name` for a type about to be described.
    fn reserve(&mut self, name: &ArcStr) -> Result<(), SchemaError> {
        if self.types.contains_key(name) {
            return Err(SchemaError::DuplicateTypeName { name: name.clone() });
        }
        _ = self.types.insert(name.clone(), None);
        Ok(())
    }

    fn fill(&mut self, node: TypeNode) {
        if let Some(slot) = self.types.get_mut(node.name()) {
            *slot = Some(node);
        }
    }

    fn add_scalar(&mut self, scalar: ScalarType) -> Result<(), SchemaError> {
        let name = scalar.name().clone();
        let id = scalar.coercion().rust_type().id();
        if let Some(existing) = self.scalar_ids.get(&id) {
            return Err(SchemaError::DuplicateTypeName {
                name: existing.clone(),
            });
        }
        self.reserve(&name)?;
        debug!(scalar = %name, rust_type = scalar.coercion().rust_type().name(), "registering scalar");
        _ = self.scalar_ids.insert(id, name);
        self.fill(TypeNode::Scalar(scalar));
        Ok(())
    }

    fn add_root(&mut self, name: &'static str, decls: Vec<PropertyDecl>) -> Result<(), SchemaError> {
        let name = ArcStr::from(name);
        self.reserve(&name)?;

        let mut properties = IndexMap::new();
        for decl in decls {
            let property = self.property(&name, decl)?;
            insert_property(&name, &mut properties, property)?;
        }
        debug!(root = %name, fields = properties.len(), "registering root type");

        self.fill(TypeNode::Object(ObjectType {
            name,
            description: None,
            rust: None,
            properties,
        }));
        Ok(())
    }

    fn scalar_name(&self, rust: RustType) -> Result<ArcStr, SchemaError> {
        self.scalar_ids
            .get(&rust.id())
            .cloned()
            .ok_or(SchemaError::UnknownScalar {
                type_name: rust.name(),
            })
    }

    /// Resolves the declared type of a property value.
    fn output_type(&mut self, type_ref: &TypeRef, site: &Site<'_>) -> Result<Type, SchemaError> {
        let rust = type_ref.rust();
        match type_ref.kind() {
            TypeRefKind::Nullable(inner) => Ok(self.output_type(inner, site)?.into_nullable()),
            TypeRefKind::List(inner) => Ok(Type::NonNullList(Box::new(
                self.output_type(inner, site)?,
            ))),
            TypeRefKind::Scalar => self.scalar_name(rust).map(non_null),
            TypeRefKind::Enum(enumeration) => self.register_enum(rust, enumeration).map(non_null),
            TypeRefKind::Object(object) => self.register_object(type_ref, object).map(non_null),
            TypeRefKind::Union => site
                .union
                .cloned()
                .map(non_null)
                .ok_or_else(|| SchemaError::UnionReturnType {
                    type_name: site.type_name.clone(),
                    property: site.property.clone(),
                }),
            TypeRefKind::InputObject(_) => Err(SchemaError::InvalidTypeUsage {
                type_name: rust.name(),
                usage: "an output type",
            }),
            TypeRefKind::Function => Err(SchemaError::FunctionType {
                signature: rust.name(),
                type_name: site.type_name.clone(),
                property: site.property.clone(),
            }),
            TypeRefKind::Generic => Err(SchemaError::GenericType {
                type_name: rust.name(),
            }),
        }
    }

    /// Resolves the declared type of an argument or input field, registering
    /// input objects on the way.
    fn input_type(&mut self, type_ref: &TypeRef) -> Result<Type, SchemaError> {
        let rust = type_ref.rust();
        match type_ref.kind() {
            TypeRefKind::Nullable(inner) => Ok(self.input_type(inner)?.into_nullable()),
            TypeRefKind::List(inner) => Ok(Type::NonNullList(Box::new(self.input_type(inner)?))),
            TypeRefKind::Scalar => self.scalar_name(rust).map(non_null),
            TypeRefKind::Enum(enumeration) => self.register_enum(rust, enumeration).map(non_null),
            TypeRefKind::InputObject(object) => self.register_input_object(rust, object).map(non_null),
            TypeRefKind::Object(_) | TypeRefKind::Union | TypeRefKind::Function => {
                Err(SchemaError::InvalidTypeUsage {
                    type_name: rust.name(),
                    usage: "an input type",
                })
            }
            TypeRefKind::Generic => Err(SchemaError::GenericType {
                type_name: rust.name(),
            }),
        }
    }

    fn register_object(&mut self, type_ref: &TypeRef, object: &ObjectRef) -> Result<ArcStr, SchemaError> {
        let rust = type_ref.rust();
        if let Some(name) = self.output_ids.get(&rust.id()) {
            return Ok(name.clone());
        }

        let mut decl = self
            .type_decls
            .shift_remove(&rust.id())
            .unwrap_or_else(|| TypeDecl::new(type_ref.clone()));
        let name = decl
            .name
            .take()
            .unwrap_or_else(|| ArcStr::from(object.name()));
        self.reserve(&name)?;
        _ = self.output_ids.insert(rust.id(), name.clone());
        debug!(type_name = %name, rust_type = rust.name(), "registering object type");

        let fields = object.fields();
        if let Some(ignored) = decl
            .ignored
            .iter()
            .find(|i| !fields.iter().any(|f| f.name() == i.as_str()))
        {
            return Err(SchemaError::UnknownProperty {
                type_name: name,
                property: ignored.clone(),
            });
        }

        let mut properties = IndexMap::new();
        for field in &fields {
            if decl.ignored.iter().any(|i| i.as_str() == field.name()) {
                debug!(type_name = %name, property = field.name(), "ignoring property");
                continue;
            }
            let property_name = ArcStr::from(field.name());
            let site = Site {
                type_name: &name,
                property: &property_name,
                union: None,
            };
            let field_type = self.output_type(field.type_ref(), &site)?;
            let property = Property {
                name: property_name,
                description: None,
                deprecation: DeprecationStatus::Current,
                field_type,
                arguments: vec![],
                origin: PropertyOrigin::Native,
                resolver: FieldResolver::native(field),
                transformations: vec![],
            };
            insert_property(&name, &mut properties, property)?;
        }

        for property_decl in mem::take(&mut decl.properties) {
            let property = self.property(&name, property_decl)?;
            insert_property(&name, &mut properties, property)?;
        }

        for (property_name, config) in mem::take(&mut decl.configured) {
            let property = properties.get_mut(&property_name).ok_or_else(|| {
                SchemaError::UnknownProperty {
                    type_name: name.clone(),
                    property: property_name.clone(),
                }
            })?;
            if let Some(description) = config.description {
                property.description = Some(description);
            }
            if let Some(deprecation) = config.deprecation {
                property.deprecation = deprecation;
            }
        }

        for transformation in mem::take(&mut decl.transformations) {
            let property = properties
                .get_mut(&transformation.property)
                .ok_or_else(|| SchemaError::UnknownProperty {
                    type_name: name.clone(),
                    property: transformation.property.clone(),
                })?;
            self.attach_transformation(&name, property, transformation)?;
        }

        self.fill(TypeNode::Object(ObjectType {
            name: name.clone(),
            description: decl.description,
            rust: Some(rust),
            properties,
        }));
        Ok(name)
    }

    /// Builds a resolver-backed property of `owner`.
    fn property(&mut self, owner: &ArcStr, decl: PropertyDecl) -> Result<Property, SchemaError> {
        let PropertyDecl {
            name,
            description,
            deprecation,
            args,
            resolver,
            origin,
            union,
        } = decl;

        let mut resolver = resolver.ok_or_else(|| SchemaError::MissingResolver {
            type_name: owner.clone(),
            property: name.clone(),
        })?;
        let found = args.len();
        resolver
            .name_arguments(args)
            .map_err(|expected| SchemaError::ArgumentNames {
                type_name: owner.clone(),
                property: name.clone(),
                expected,
                found,
            })?;

        let origin = if union.is_some() {
            PropertyOrigin::Union
        } else {
            origin
        };
        if origin == PropertyOrigin::Union {
            let union_return_type = || SchemaError::UnionReturnType {
                type_name: owner.clone(),
                property: name.clone(),
            };
            let declared = union.as_ref().ok_or_else(union_return_type)?;
            if !self.union_names.contains(declared) {
                return Err(SchemaError::UnknownUnion {
                    name: declared.clone(),
                });
            }
            if !returns_union(resolver.return_type()) {
                return Err(union_return_type());
            }
        }

        let site = Site {
            type_name: owner,
            property: &name,
            union: union.as_ref(),
        };
        let field_type = self.output_type(resolver.return_type(), &site)?;

        let mut arguments = vec![];
        self.merge_arguments(owner, &name, &mut arguments, resolver.arguments())?;
        debug!(
            type_name = %owner,
            property = %name,
            mode = ?resolver.mode(),
            "registering resolver"
        );

        Ok(Property {
            name,
            description,
            deprecation,
            field_type,
            arguments,
            origin,
            resolver,
            transformations: vec![],
        })
    }

    fn attach_transformation(
        &mut self,
        owner: &ArcStr,
        property: &mut Property,
        decl: TransformationDecl,
    ) -> Result<(), SchemaError> {
        let TransformationDecl {
            property: property_name,
            args,
            transformation,
        } = decl;

        let mut transformation = transformation.ok_or_else(|| SchemaError::MissingResolver {
            type_name: owner.clone(),
            property: property_name.clone(),
        })?;
        let found = args.len();
        transformation
            .name_arguments(args)
            .map_err(|expected| SchemaError::ArgumentNames {
                type_name: owner.clone(),
                property: property_name.clone(),
                expected,
                found,
            })?;

        let expected = property.resolver.return_type().rust();
        if transformation.value_type() != expected {
            return Err(SchemaError::TransformationType {
                type_name: owner.clone(),
                property: property_name,
                expected: expected.name(),
                found: transformation.value_type().name(),
            });
        }

        self.merge_arguments(
            owner,
            &property.name,
            &mut property.arguments,
            transformation.arguments(),
        )?;
        debug!(type_name = %owner, property = %property_name, "attaching transformation");
        property.transformations.push(transformation);
        Ok(())
    }

    /// Adds the arguments of one function to those of its property. A name
    /// declared by several functions binds the same query argument, so its
    /// types must agree.
    fn merge_arguments<'a>(
        &mut self,
        owner: &ArcStr,
        property: &ArcStr,
        arguments: &mut Vec<Argument>,
        declared: impl Iterator<Item = (&'a ArcStr, &'a TypeRef)>,
    ) -> Result<(), SchemaError> {
        for (name, type_ref) in declared {
            let arg_type = self.input_type(type_ref)?;
            match arguments.iter().find(|a| a.name == *name) {
                Some(existing) if existing.arg_type != arg_type => {
                    return Err(SchemaError::ConflictingArgument {
                        type_name: owner.clone(),
                        property: property.clone(),
                        argument: name.clone(),
                        first: existing.arg_type.to_string(),
                        second: arg_type.to_string(),
                    });
                }
                Some(_) => {}
                None => arguments.push(Argument {
                    name: name.clone(),
                    arg_type,
                }),
            }
        }
        Ok(())
    }

    fn register_enum(&mut self, rust: RustType, enumeration: &EnumRef) -> Result<ArcStr, SchemaError> {
        if let Some(name) = self.output_ids.get(&rust.id()) {
            return Ok(name.clone());
        }

        let decl = self.enum_decls.shift_remove(&rust.id());
        let (name, description) = match decl {
            Some(EnumDecl {
                name, description, ..
            }) => (name, description),
            None => (None, None),
        };
        let name = name.unwrap_or_else(|| ArcStr::from(enumeration.name()));
        self.reserve(&name)?;
        _ = self.output_ids.insert(rust.id(), name.clone());
        _ = self.input_ids.insert(rust.id(), name.clone());
        debug!(enum_name = %name, rust_type = rust.name(), "registering enum type");

        self.fill(TypeNode::Enum(EnumType {
            name: name.clone(),
            description,
            rust,
            values: enumeration.values().iter().copied().map(ArcStr::from).collect(),
            to_name: enumeration.to_name(),
        }));
        Ok(name)
    }

    fn register_input_object(
        &mut self,
        rust: RustType,
        object: &InputObjectRef,
    ) -> Result<ArcStr, SchemaError> {
        if let Some(name) = self.input_ids.get(&rust.id()) {
            return Ok(name.clone());
        }

        let name = ArcStr::from(object.name());
        self.reserve(&name)?;
        _ = self.input_ids.insert(rust.id(), name.clone());
        debug!(input = %name, rust_type = rust.name(), "registering input type");

        let mut fields = IndexMap::new();
        for field in object.fields() {
            let field_type = self.input_type(field.type_ref())?;
            _ = fields.insert(ArcStr::from(field.name()), field_type);
        }

        self.fill(TypeNode::InputObject(InputObjectType {
            name: name.clone(),
            description: None,
            rust,
            fields,
        }));
        Ok(name)
    }

    fn register_union(&mut self, name: ArcStr, decl: UnionDecl) -> Result<(), SchemaError> {
        if decl.members.is_empty() {
            return Err(SchemaError::EmptyUnion { name });
        }
        self.reserve(&name)?;
        debug!(union = %name, members = decl.members.len(), "registering union type");

        let mut members = Vec::with_capacity(decl.members.len());
        let mut member_ids = FnvHashMap::default();
        for member in &decl.members {
            let TypeRefKind::Object(object) = member.kind() else {
                return Err(SchemaError::InvalidUnionMember {
                    union: name,
                    member: member.rust().name(),
                });
            };
            let member_name = self.register_object(member, object)?;
            _ = member_ids.insert(member.rust().id(), member_name.clone());
            members.push(member_name);
        }

        self.fill(TypeNode::Union(UnionType {
            name,
            description: decl.description,
            members,
            member_ids,
        }));
        Ok(())
    }
}

fn non_null(name: ArcStr) -> Type {
    Type::NonNullNamed(name.to_string())
}

fn returns_union(type_ref: &TypeRef) -> bool {
    match type_ref.kind() {
        TypeRefKind::Union => true,
        TypeRefKind::Nullable(inner) | TypeRefKind::List(inner) => returns_union(inner),
        _ => false,
    }
}

fn insert_property(
    owner: &ArcStr,
    properties: &mut IndexMap<ArcStr, Property>,
    property: Property,
) -> Result<(), SchemaError> {
    if properties.contains_key(&property.name) {
        return Err(SchemaError::DuplicateProperty {
            type_name: owner.clone(),
            property: property.name,
        });
    }
    _ = properties.insert(property.name.clone(), property);
    Ok(())
}
