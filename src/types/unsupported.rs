//! Rust types that have no GraphQL representation.
//!
//! They still describe themselves, so the schema builder can reject them with
//! a precise error instead of the program failing to compile far away from
//! the offending declaration.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use crate::{
    ast::InputValue,
    executor::FieldResult,
    types::base::{InputContext, InputType, Output, OutputType, TypeRef},
};

macro_rules! function_types {
    ($($arg:ident),*) => {
        impl<R: 'static, $($arg: 'static),*> OutputType for fn($($arg),*) -> R {
            fn type_ref() -> TypeRef {
                TypeRef::function::<Self>()
            }

            fn into_output(self) -> Output {
                Output::Null
            }

            fn from_output(_: Output) -> Option<Self> {
                None
            }
        }

        impl<R: 'static, $($arg: 'static),*> OutputType for Arc<dyn Fn($($arg),*) -> R + Send + Sync> {
            fn type_ref() -> TypeRef {
                TypeRef::function::<Self>()
            }

            fn into_output(self) -> Output {
                Output::Null
            }

            fn from_output(_: Output) -> Option<Self> {
                None
            }
        }
    };
}

function_types!();
function_types!(A);
function_types!(A, B);
function_types!(A, B, C);

macro_rules! generic_types {
    ($(<$($param:ident),+> $ty:ty),* $(,)?) => {$(
        impl<$($param: Send + Sync + 'static),+> OutputType for $ty {
            fn type_ref() -> TypeRef {
                TypeRef::generic::<Self>()
            }

            fn into_output(self) -> Output {
                Output::Null
            }

            fn from_output(_: Output) -> Option<Self> {
                None
            }
        }

        impl<$($param: Send + 'static),+> InputType for $ty {
            fn input_ref() -> TypeRef {
                TypeRef::generic::<Self>()
            }

            fn from_input(_: &InputValue, _: &InputContext<'_>) -> FieldResult<Self> {
                Err(format!("Generic types are not supported by GraphQL, found {}", std::any::type_name::<Self>()).into())
            }
        }
    )*};
}

generic_types! {
    <A, B> (A, B),
    <A, B, C> (A, B, C),
    <A, B, C, D> (A, B, C, D),
    <K, V> HashMap<K, V>,
    <K, V> BTreeMap<K, V>,
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use crate::types::base::{InputType, OutputType, TypeRefKind};

    #[test]
    fn functions_describe_as_function() {
        assert!(matches!(
            <fn() -> i32 as OutputType>::type_ref().kind(),
            TypeRefKind::Function,
        ));
        assert!(matches!(
            <Arc<dyn Fn(String) -> i32 + Send + Sync> as OutputType>::type_ref().kind(),
            TypeRefKind::Function,
        ));
    }

    #[test]
    fn tuples_and_maps_describe_as_generic() {
        let ty = <(i32, String) as OutputType>::type_ref();

        assert!(matches!(ty.kind(), TypeRefKind::Generic));
        assert!(ty.rust().name().starts_with("(i32, "));
        assert!(matches!(
            <HashMap<String, i32> as InputType>::input_ref().kind(),
            TypeRefKind::Generic,
        ));
    }
}
