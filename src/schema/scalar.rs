//! Scalar coercion table.
//!
//! Every scalar of a schema pairs a Rust type with a serialize function,
//! turning its values into a raw [`ScalarValue`], and a deserialize function
//! decoding raw input back. Built-in scalars use identity coercions; custom
//! scalars are declared on the schema builder.

use std::{
    any::{Any, type_name},
    fmt,
    sync::Arc,
};

use arcstr::ArcStr;

use crate::{
    executor::{FieldError, FieldResult},
    types::{base::RustType, scalars::ID},
    value::ScalarValue,
};

/// Raw representation a scalar is coerced through.
pub trait RawScalar: Sized + Send + 'static {
    /// Name of the raw kind, for error messages.
    const KIND: &'static str;

    /// Extracts the raw value, if `value` is of this kind.
    fn from_scalar(value: &ScalarValue) -> Option<Self>;

    /// Wraps the raw value.
    fn into_scalar(self) -> ScalarValue;
}

impl RawScalar for String {
    const KIND: &'static str = "String";

    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        value.as_str().map(Into::into)
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::String(self)
    }
}

impl RawScalar for i32 {
    const KIND: &'static str = "Int";

    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        value.as_int()
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Int(self)
    }
}

impl RawScalar for i64 {
    const KIND: &'static str = "Long";

    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        value.as_long()
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Long(self)
    }
}

impl RawScalar for f64 {
    const KIND: &'static str = "Float";

    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        value.as_float()
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Float(self)
    }
}

impl RawScalar for bool {
    const KIND: &'static str = "Boolean";

    fn from_scalar(value: &ScalarValue) -> Option<Self> {
        value.as_bool()
    }

    fn into_scalar(self) -> ScalarValue {
        ScalarValue::Boolean(self)
    }
}

type SerializeFn<T, R> = dyn Fn(&T) -> R + Send + Sync;
type DeserializeFn<T, R> = dyn Fn(R) -> FieldResult<T> + Send + Sync;

/// Pair of coercion functions between `T` and the raw kind `R`.
pub struct Coercion<T, R> {
    serialize: Arc<SerializeFn<T, R>>,
    deserialize: Arc<DeserializeFn<T, R>>,
}

/// Coercion of a scalar represented as a GraphQL `String`.
pub type StringScalarCoercion<T> = Coercion<T, String>;

/// Coercion of a scalar represented as a GraphQL `Int`.
pub type IntScalarCoercion<T> = Coercion<T, i32>;

/// Coercion of a scalar represented as a 64-bit `Long`.
pub type LongScalarCoercion<T> = Coercion<T, i64>;

/// Coercion of a scalar represented as a GraphQL `Float`.
pub type FloatScalarCoercion<T> = Coercion<T, f64>;

/// Coercion of a scalar represented as a GraphQL `Boolean`.
pub type BooleanScalarCoercion<T> = Coercion<T, bool>;

impl<T, R> Coercion<T, R> {
    /// Creates a coercion from its two functions.
    pub fn new(
        serialize: impl Fn(&T) -> R + Send + Sync + 'static,
        deserialize: impl Fn(R) -> FieldResult<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            serialize: Arc::new(serialize),
            deserialize: Arc::new(deserialize),
        }
    }

    /// Produces the external representation of `value`.
    pub fn serialize(&self, value: &T) -> R {
        (self.serialize)(value)
    }

    /// Decodes a value from its external representation.
    pub fn deserialize(&self, raw: R) -> FieldResult<T> {
        (self.deserialize)(raw)
    }
}

impl<T: Clone + 'static, R: From<T> + 'static> Coercion<T, R>
where
    T: TryFrom<R>,
    <T as TryFrom<R>>::Error: fmt::Display,
{
    /// Coercion converting through `From`/`TryFrom`.
    pub fn identity() -> Self {
        Self::new(
            |v: &T| R::from(v.clone()),
            |raw: R| T::try_from(raw).map_err(FieldError::from),
        )
    }
}

impl<T, R> fmt::Debug for Coercion<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coercion<{}, {}>", type_name::<T>(), type_name::<R>())
    }
}

/// Type-erased view of a [`Coercion`], stored in the schema.
pub trait ScalarCoercion: fmt::Debug + Send + Sync + 'static {
    /// Rust type the coercion converts.
    fn rust_type(&self) -> RustType;

    /// Serializes a value of the coerced type.
    fn serialize_value(&self, value: &(dyn Any + Send + Sync)) -> FieldResult<ScalarValue>;

    /// Deserializes a raw value into the coerced type.
    fn deserialize_value(&self, value: &ScalarValue) -> FieldResult<Box<dyn Any + Send>>;

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;
}

impl<T: Send + Sync + 'static, R: RawScalar> ScalarCoercion for Coercion<T, R> {
    fn rust_type(&self) -> RustType {
        RustType::of::<T>()
    }

    fn serialize_value(&self, value: &(dyn Any + Send + Sync)) -> FieldResult<ScalarValue> {
        value
            .downcast_ref::<T>()
            .map(|v| self.serialize(v).into_scalar())
            .ok_or_else(|| format!("Expected a value of type {}", type_name::<T>()).into())
    }

    fn deserialize_value(&self, value: &ScalarValue) -> FieldResult<Box<dyn Any + Send>> {
        let raw = R::from_scalar(value)
            .ok_or_else(|| format!("Expected {} value, found {value}", R::KIND))?;
        self.deserialize(raw).map(|v| Box::new(v) as Box<dyn Any + Send>)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Scalar type metadata.
#[derive(Clone, Debug)]
pub struct ScalarType {
    name: ArcStr,
    description: Option<ArcStr>,
    coercion: Arc<dyn ScalarCoercion>,
}

impl ScalarType {
    pub(crate) fn new(
        name: ArcStr,
        description: Option<ArcStr>,
        coercion: Arc<dyn ScalarCoercion>,
    ) -> Self {
        Self {
            name,
            description,
            coercion,
        }
    }

    /// Returns the name of the scalar.
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Returns the description of the scalar, if any.
    pub fn description(&self) -> Option<&ArcStr> {
        self.description.as_ref()
    }

    /// Erased coercion functions of this scalar.
    pub fn coercion(&self) -> &dyn ScalarCoercion {
        &*self.coercion
    }

    /// Recovers the typed coercion, e.g.
    /// `scalar.typed_coercion::<StringScalarCoercion<Uuid>>()`.
    pub fn typed_coercion<C: 'static>(&self) -> Option<&C> {
        self.coercion.as_any().downcast_ref()
    }
}

/// Scalars every schema starts with.
pub(crate) fn builtin_scalars() -> Vec<ScalarType> {
    fn builtin(name: &'static str, coercion: Arc<dyn ScalarCoercion>) -> ScalarType {
        ScalarType::new(ArcStr::from(name), None, coercion)
    }

    vec![
        builtin("String", Arc::new(StringScalarCoercion::<String>::identity())),
        builtin("Int", Arc::new(IntScalarCoercion::<i32>::identity())),
        builtin("Long", Arc::new(LongScalarCoercion::<i64>::identity())),
        builtin("Float", Arc::new(FloatScalarCoercion::<f64>::identity())),
        builtin("Boolean", Arc::new(BooleanScalarCoercion::<bool>::identity())),
        builtin(
            "ID",
            Arc::new(StringScalarCoercion::<ID>::new(
                |id: &ID| id.to_string(),
                |raw: String| Ok(ID::new(raw)),
            )),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{ScalarCoercion as _, StringScalarCoercion, builtin_scalars};
    use crate::value::ScalarValue;

    #[derive(Debug, PartialEq)]
    struct Celsius(i32);

    #[test]
    fn custom_coercion_roundtrip() {
        let coercion = StringScalarCoercion::<Celsius>::new(
            |c| format!("{}C", c.0),
            |raw| {
                raw.strip_suffix('C')
                    .and_then(|n| n.parse().ok())
                    .map(Celsius)
                    .ok_or_else(|| format!("Invalid temperature: {raw}").into())
            },
        );

        assert_eq!(
            coercion.serialize_value(&Celsius(21)),
            Ok(ScalarValue::from("21C")),
        );
        let decoded = coercion
            .deserialize_value(&ScalarValue::from("-4C"))
            .expect("valid temperature");
        assert_eq!(decoded.downcast_ref::<Celsius>(), Some(&Celsius(-4)));

        let err = coercion
            .deserialize_value(&ScalarValue::Int(4))
            .expect_err("wrong raw kind");
        assert_eq!(err.message(), "Expected String value, found 4");
    }

    #[test]
    fn builtins_are_identities() {
        let scalars = builtin_scalars();
        let int = scalars
            .iter()
            .find(|s| s.name().as_str() == "Int")
            .expect("Int is built in");

        assert_eq!(
            int.coercion().serialize_value(&42_i32),
            Ok(ScalarValue::Int(42)),
        );
        assert!(int.coercion().serialize_value(&"42").is_err());
    }
}
