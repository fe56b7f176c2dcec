use std::sync::Arc;

use crate::{
    ast::InputValue,
    executor::FieldResult,
    types::base::{InputContext, InputType, Output, OutputType, TypeRef},
};

impl<T: OutputType> OutputType for Option<T> {
    fn type_ref() -> TypeRef {
        TypeRef::nullable::<Self>(T::type_ref())
    }

    fn into_output(self) -> Output {
        self.map_or(Output::Null, T::into_output)
    }

    fn from_output(output: Output) -> Option<Self> {
        match output {
            Output::Null => Some(None),
            o => T::from_output(o).map(Some),
        }
    }
}

impl<T: InputType> InputType for Option<T> {
    fn input_ref() -> TypeRef {
        TypeRef::nullable::<Self>(T::input_ref())
    }

    fn from_input(value: &InputValue, ctx: &InputContext<'_>) -> FieldResult<Self> {
        match value {
            InputValue::Null => Ok(None),
            v => T::from_input(v, ctx).map(Some),
        }
    }
}

impl<T: OutputType> OutputType for Vec<T> {
    fn type_ref() -> TypeRef {
        TypeRef::list::<Self>(T::type_ref())
    }

    fn into_output(self) -> Output {
        Output::List(self.into_iter().map(T::into_output).collect())
    }

    fn from_output(output: Output) -> Option<Self> {
        match output {
            Output::List(items) => items.into_iter().map(T::from_output).collect(),
            Output::Null | Output::Value(_) => None,
        }
    }
}

impl<T: InputType> InputType for Vec<T> {
    fn input_ref() -> TypeRef {
        TypeRef::list::<Self>(T::input_ref())
    }

    fn from_input(value: &InputValue, ctx: &InputContext<'_>) -> FieldResult<Self> {
        match value {
            InputValue::List(items) => items.iter().map(|i| T::from_input(i, ctx)).collect(),
            InputValue::Null => Err("Expected a list, found null".into()),
            // Single values coerce into a list of one.
            v => T::from_input(v, ctx).map(|i| vec![i]),
        }
    }
}

// Smart pointers share the identity of their pointee, so `Box<Node>` and
// `Node` describe the same type.
impl<T: OutputType> OutputType for Box<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }

    fn into_output(self) -> Output {
        (*self).into_output()
    }

    fn from_output(output: Output) -> Option<Self> {
        T::from_output(output).map(Box::new)
    }
}

impl<T: InputType> InputType for Box<T> {
    fn input_ref() -> TypeRef {
        T::input_ref()
    }

    fn from_input(value: &InputValue, ctx: &InputContext<'_>) -> FieldResult<Self> {
        T::from_input(value, ctx).map(Box::new)
    }
}

impl<T: OutputType + Clone> OutputType for Arc<T> {
    fn type_ref() -> TypeRef {
        T::type_ref()
    }

    fn into_output(self) -> Output {
        Arc::unwrap_or_clone(self).into_output()
    }

    fn from_output(output: Output) -> Option<Self> {
        T::from_output(output).map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::types::base::{Output, OutputType, TypeRefKind};

    #[test]
    fn option_describes_nullable() {
        let ty = <Option<Vec<i32>> as OutputType>::type_ref();

        let TypeRefKind::Nullable(inner) = ty.kind() else {
            panic!("expected nullable, found {ty:?}");
        };
        assert!(matches!(inner.kind(), TypeRefKind::List(_)));
    }

    #[test]
    fn output_roundtrip() {
        let value = Some(vec![1, 2]);

        let output = value.clone().into_output();
        assert!(matches!(&output, Output::List(items) if items.len() == 2));
        assert_eq!(Option::<Vec<i32>>::from_output(output), Some(value));
        assert_eq!(Option::<i32>::from_output(Output::Null), Some(None));
    }
}
