use crate::types::base::{Output, OutputType, RustType, TypeRef};

/// Value of a union-typed field.
///
/// The union a field returns is declared on the schema builder; at runtime
/// the Rust type of the wrapped value selects the member it resolves to.
#[derive(Clone, Debug)]
pub struct UnionMember(Output);

impl UnionMember {
    /// Wraps a value of one of the union's member types.
    pub fn new<T: OutputType>(value: T) -> Self {
        Self(value.into_output())
    }

    /// Rust type of the wrapped value, if it is a single value.
    pub fn rust_type(&self) -> Option<RustType> {
        match &self.0 {
            Output::Value(item) => Some(item.rust_type()),
            Output::Null | Output::List(_) => None,
        }
    }
}

impl OutputType for UnionMember {
    fn type_ref() -> TypeRef {
        TypeRef::union::<Self>()
    }

    fn into_output(self) -> Output {
        self.0
    }

    fn from_output(output: Output) -> Option<Self> {
        Some(Self(output))
    }
}
