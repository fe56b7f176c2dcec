use std::{
    any::{Any, TypeId, type_name},
    marker::PhantomData,
    sync::Arc,
};

use indexmap::IndexMap;

use crate::{
    ast::InputValue,
    executor::{FieldError, FieldResult},
    schema::model::SchemaType,
};

/// Type-erased, shareable value flowing through the executor.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// Identity of a Rust type: its [`TypeId`] together with its name for
/// diagnostics.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RustType {
    id: TypeId,
    name: &'static str,
}

impl RustType {
    /// Describes `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// [`TypeId`] of the type.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified name, as reported by [`type_name`].
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the name, without generic parameters.
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

/// Description of a Rust type, as consumed by the schema's type graph
/// builder.
///
/// Object and input object descriptions expose their fields lazily, so
/// self-referencing types can be described without recursing.
#[derive(Clone, Debug)]
pub struct TypeRef {
    rust: RustType,
    kind: TypeRefKind,
}

/// Shape of a [`TypeRef`].
#[derive(Clone, Debug)]
pub enum TypeRefKind {
    /// Leaf value serialized through a registered scalar coercion.
    Scalar,
    /// Enum with a fixed set of named values.
    Enum(EnumRef),
    /// Object type with fields.
    Object(ObjectRef),
    /// Input object type with fields.
    InputObject(InputObjectRef),
    /// Value of some member of a union declared on the schema builder.
    Union,
    /// Sequence of the inner type.
    List(Box<TypeRef>),
    /// Optional value of the inner type.
    Nullable(Box<TypeRef>),
    /// Function value; never representable in a schema.
    Function,
    /// Tuple, map or similar type with unresolved type parameters; never
    /// representable in a schema.
    Generic,
}

pub(crate) type EnumNameFn = dyn Fn(&(dyn Any + Send + Sync)) -> Option<&'static str> + Send + Sync;

/// Description of an enum type.
#[derive(Clone, derive_more::Debug)]
pub struct EnumRef {
    name: &'static str,
    values: &'static [&'static str],
    #[debug(skip)]
    to_name: Arc<EnumNameFn>,
}

impl EnumRef {
    /// GraphQL name of the enum.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Names of the values, in declaration order.
    pub fn values(&self) -> &'static [&'static str] {
        self.values
    }

    pub(crate) fn to_name(&self) -> Arc<EnumNameFn> {
        self.to_name.clone()
    }
}

/// Description of an object type.
#[derive(Clone, derive_more::Debug)]
pub struct ObjectRef {
    name: &'static str,
    #[debug(skip)]
    describe: Arc<dyn Fn() -> Vec<FieldDescription> + Send + Sync>,
}

impl ObjectRef {
    /// GraphQL name of the object type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Lists the exposed fields in declaration order.
    pub fn fields(&self) -> Vec<FieldDescription> {
        (self.describe)()
    }
}

/// Description of an input object type.
#[derive(Clone, derive_more::Debug)]
pub struct InputObjectRef {
    name: &'static str,
    #[debug(skip)]
    describe: Arc<dyn Fn() -> Vec<InputFieldDescription> + Send + Sync>,
}

impl InputObjectRef {
    /// GraphQL name of the input object type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Lists the input fields in declaration order.
    pub fn fields(&self) -> Vec<InputFieldDescription> {
        (self.describe)()
    }
}

pub(crate) type Accessor =
    Arc<dyn Fn(&(dyn Any + Send + Sync)) -> FieldResult<Output> + Send + Sync>;

/// Field of an object type, read directly from the Rust value.
#[derive(Clone, derive_more::Debug)]
pub struct FieldDescription {
    name: &'static str,
    type_ref: TypeRef,
    #[debug(skip)]
    accessor: Accessor,
}

impl FieldDescription {
    /// Name of the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type of the field's value.
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub(crate) fn accessor(&self) -> Accessor {
        self.accessor.clone()
    }
}

/// Field of an input object type.
#[derive(Clone, Debug)]
pub struct InputFieldDescription {
    name: &'static str,
    type_ref: TypeRef,
}

impl InputFieldDescription {
    /// Name of the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type the field decodes to.
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }
}

/// Collects the fields of an object type `T`.
pub struct ObjectDescriptor<T> {
    fields: Vec<FieldDescription>,
    _type: PhantomData<fn(&T)>,
}

impl<T: Send + Sync + 'static> ObjectDescriptor<T> {
    /// Exposes a field computed from the value.
    pub fn field<R: OutputType>(
        &mut self,
        name: &'static str,
        get: impl Fn(&T) -> R + Send + Sync + 'static,
    ) -> &mut Self {
        self.fields.push(FieldDescription {
            name,
            type_ref: R::type_ref(),
            accessor: Arc::new(move |parent: &(dyn Any + Send + Sync)| {
                parent
                    .downcast_ref::<T>()
                    .map(|p| get(p).into_output())
                    .ok_or_else(|| unexpected_value::<T>())
            }),
        });
        self
    }
}

/// Collects the fields of an input object type `T`.
pub struct InputObjectDescriptor<T> {
    fields: Vec<InputFieldDescription>,
    _type: PhantomData<fn(&T)>,
}

impl<T> InputObjectDescriptor<T> {
    /// Declares an input field. The accessor only serves to name its type.
    pub fn field<F: InputType>(&mut self, name: &'static str, _: fn(&T) -> &F) -> &mut Self {
        self.fields.push(InputFieldDescription {
            name,
            type_ref: F::input_ref(),
        });
        self
    }
}

impl TypeRef {
    fn new<T: ?Sized + 'static>(kind: TypeRefKind) -> Self {
        Self {
            rust: RustType::of::<T>(),
            kind,
        }
    }

    /// Leaf type coerced through the scalar registered for `T`.
    pub fn scalar<T: 'static>() -> Self {
        Self::new::<T>(TypeRefKind::Scalar)
    }

    /// Enum type whose values are named by `to_name`.
    pub fn enumeration<T: Send + Sync + 'static>(
        name: &'static str,
        values: &'static [&'static str],
        to_name: fn(&T) -> &'static str,
    ) -> Self {
        Self::new::<T>(TypeRefKind::Enum(EnumRef {
            name,
            values,
            to_name: Arc::new(move |v: &(dyn Any + Send + Sync)| v.downcast_ref::<T>().map(to_name)),
        }))
    }

    /// Object type whose fields `describe` declares.
    pub fn object<T: Send + Sync + 'static>(
        name: &'static str,
        describe: fn(&mut ObjectDescriptor<T>),
    ) -> Self {
        Self::new::<T>(TypeRefKind::Object(ObjectRef {
            name,
            describe: Arc::new(move || {
                let mut descriptor = ObjectDescriptor {
                    fields: vec![],
                    _type: PhantomData,
                };
                describe(&mut descriptor);
                descriptor.fields
            }),
        }))
    }

    /// Input object type whose fields `describe` declares.
    pub fn input_object<T: 'static>(
        name: &'static str,
        describe: fn(&mut InputObjectDescriptor<T>),
    ) -> Self {
        Self::new::<T>(TypeRefKind::InputObject(InputObjectRef {
            name,
            describe: Arc::new(move || {
                let mut descriptor = InputObjectDescriptor {
                    fields: vec![],
                    _type: PhantomData,
                };
                describe(&mut descriptor);
                descriptor.fields
            }),
        }))
    }

    /// Union member value; `T` is the carrier type.
    pub fn union<T: 'static>() -> Self {
        Self::new::<T>(TypeRefKind::Union)
    }

    /// List of `inner`; `T` is the container type.
    pub fn list<T: 'static>(inner: Self) -> Self {
        Self::new::<T>(TypeRefKind::List(Box::new(inner)))
    }

    /// Nullable `inner`; `T` is the wrapper type.
    pub fn nullable<T: 'static>(inner: Self) -> Self {
        Self::new::<T>(TypeRefKind::Nullable(Box::new(inner)))
    }

    /// Function value, rejected when the schema is built.
    pub fn function<T: ?Sized + 'static>() -> Self {
        Self::new::<T>(TypeRefKind::Function)
    }

    /// Type with unresolved parameters, rejected when the schema is built.
    pub fn generic<T: ?Sized + 'static>() -> Self {
        Self::new::<T>(TypeRefKind::Generic)
    }

    /// Rust type being described.
    pub fn rust(&self) -> RustType {
        self.rust
    }

    /// Shape of the type.
    pub fn kind(&self) -> &TypeRefKind {
        &self.kind
    }
}

/// Type-erased result of a resolver, before it is completed into a
/// [`Value`](crate::Value).
#[derive(Clone, Debug)]
pub enum Output {
    /// Absent value.
    Null,
    /// Single value.
    Value(Item),
    /// List of values.
    List(Vec<Output>),
}

/// Single non-null value of some Rust type.
#[derive(Clone, derive_more::Debug)]
pub struct Item {
    rust: RustType,
    #[debug(skip)]
    value: AnyValue,
}

impl Item {
    /// Rust type of the value.
    pub fn rust_type(&self) -> RustType {
        self.rust
    }

    /// The erased value.
    pub fn value(&self) -> &AnyValue {
        &self.value
    }

    /// Borrows the value as a `T`, if it is one.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }
}

impl Output {
    /// Wraps a single value.
    pub fn value<T: Any + Send + Sync>(v: T) -> Self {
        Self::Value(Item {
            rust: RustType::of::<T>(),
            value: Arc::new(v),
        })
    }

    /// Whether this is [`Output::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Recovers the value wrapped by [`Output::value`].
    ///
    /// Fails if the value is of another type or still shared.
    pub fn take<T: Any + Send + Sync>(self) -> Option<T> {
        match self {
            Self::Value(item) => item
                .value
                .downcast::<T>()
                .ok()
                .and_then(|v| Arc::try_unwrap(v).ok()),
            Self::Null | Self::List(_) => None,
        }
    }
}

/// Rust type that can be returned from resolvers and exposed as fields.
pub trait OutputType: Sized + Send + Sync + 'static {
    /// Describes the type.
    fn type_ref() -> TypeRef;

    /// Erases the value for the executor.
    fn into_output(self) -> Output;

    /// Inverse of [`OutputType::into_output`].
    fn from_output(output: Output) -> Option<Self>;
}

/// Rust type that can be decoded from query arguments.
pub trait InputType: Sized + Send + 'static {
    /// Describes the type.
    fn input_ref() -> TypeRef;

    /// Decodes the value. Absent arguments are passed as `null`.
    fn from_input(value: &InputValue, ctx: &InputContext<'_>) -> FieldResult<Self>;
}

/// Access to the schema while decoding input values.
#[derive(Clone, Copy)]
pub struct InputContext<'a> {
    schema: &'a SchemaType,
}

impl<'a> InputContext<'a> {
    pub(crate) fn new(schema: &'a SchemaType) -> Self {
        Self { schema }
    }

    /// Decodes a custom scalar through the coercion registered for `T`.
    pub fn deserialize_scalar<T: Any + Send>(&self, value: &InputValue) -> FieldResult<T> {
        let scalar = self
            .schema
            .scalar_by_type_id(TypeId::of::<T>())
            .ok_or_else(|| format!("No scalar is registered for {}", type_name::<T>()))?;
        let raw = value
            .as_scalar()
            .ok_or_else(|| format!("Expected \"{}\", found {value}", scalar.name()))?;
        scalar
            .coercion()
            .deserialize_value(raw)?
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| unexpected_value::<T>())
    }

    /// Decodes the field `name` of an input object. Absent fields decode as
    /// `null`.
    pub fn field<T: InputType>(&self, object: &IndexMap<&str, &InputValue>, name: &str) -> FieldResult<T> {
        let value = object.get(name).copied().unwrap_or(&NULL);
        T::from_input(value, self).map_err(|e| e.prefixed(&format!("In field \"{name}\": ")))
    }

    /// Fails on the first entry of `object` that is not among `known`.
    pub fn check_fields(
        &self,
        object: &IndexMap<&str, &InputValue>,
        known: &[&str],
        type_name: &str,
    ) -> FieldResult<()> {
        match object.keys().find(|k| !known.contains(k)) {
            Some(unknown) => Err(format!(
                "Unknown field \"{unknown}\" on input type \"{type_name}\""
            )
            .into()),
            None => Ok(()),
        }
    }
}

static NULL: InputValue = InputValue::Null;

fn unexpected_value<T>() -> FieldError {
    FieldError::from(format!("Expected a value of type {}", type_name::<T>()))
}
