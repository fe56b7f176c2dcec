use derive_more::with_trait::{Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::{
    ast::InputValue,
    executor::FieldResult,
    types::base::{InputContext, InputType, Output, OutputType, TypeRef},
    value::ScalarValue,
};

/// An ID as defined by the GraphQL specification.
///
/// Represented as a string, but can be converted _to_ from an integer as well.
#[derive(Clone, Debug, Deref, Deserialize, Display, Eq, From, Hash, Into, PartialEq, Serialize)]
#[deref(forward)]
pub struct ID(String);

impl ID {
    /// Constructs a new [`ID`] from anything implementing [`Into`]`<`[`String`]`>`.
    #[must_use]
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }
}

impl From<&str> for ID {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

macro_rules! builtin_scalar {
    ($ty:ty, |$v:ident| $decode:expr, $expected:literal) => {
        impl OutputType for $ty {
            fn type_ref() -> TypeRef {
                TypeRef::scalar::<Self>()
            }

            fn into_output(self) -> Output {
                Output::value(self)
            }

            fn from_output(output: Output) -> Option<Self> {
                output.take()
            }
        }

        impl InputType for $ty {
            fn input_ref() -> TypeRef {
                TypeRef::scalar::<Self>()
            }

            fn from_input(value: &InputValue, _: &InputContext<'_>) -> FieldResult<Self> {
                value
                    .as_scalar()
                    .and_then(|$v: &ScalarValue| $decode)
                    .ok_or_else(|| format!("Expected \"{}\", found {value}", $expected).into())
            }
        }
    };
}

builtin_scalar!(String, |v| v.as_str().map(Into::into), "String");
builtin_scalar!(i32, |v| v.as_int(), "Int");
builtin_scalar!(i64, |v| v.as_long(), "Long");
builtin_scalar!(f64, |v| v.as_float(), "Float");
builtin_scalar!(bool, |v| v.as_bool(), "Boolean");
builtin_scalar!(
    ID,
    |v| v
        .as_str()
        .map(ID::new)
        .or_else(|| v.as_int().map(|i| ID::new(i.to_string()))),
    "ID"
);
