/**
Expose a fieldless enum as a GraphQL enum type.

Each variant is mapped to the name it has in queries and responses. As input,
both enum literals and strings carrying a value name are accepted, so JSON
variables work without extra steps.

```rust
# use juniper_dynamic::graphql_enum;
#[derive(Clone, Copy, Debug, PartialEq)]
enum FilmType {
    ShortLength,
    FullLength,
}

graphql_enum!(FilmType as "TYPE" {
    FilmType::ShortLength => "SHORT_LENGTH",
    FilmType::FullLength => "FULL_LENGTH",
});
```
*/
#[macro_export]
macro_rules! graphql_enum {
    ($ty:ty $(as $name:literal)? { $($variant:path => $value:literal),* $(,)? }) => {
        impl $crate::OutputType for $ty {
            fn type_ref() -> $crate::TypeRef {
                let name = $crate::__type_name!(Self $(, $name)?);
                $crate::TypeRef::enumeration::<Self>(name, &[$($value),*], |v| match v {
                    $( $variant => $value, )*
                })
            }

            fn into_output(self) -> $crate::Output {
                $crate::Output::value(self)
            }

            fn from_output(output: $crate::Output) -> ::std::option::Option<Self> {
                output.take()
            }
        }

        impl $crate::InputType for $ty {
            fn input_ref() -> $crate::TypeRef {
                <Self as $crate::OutputType>::type_ref()
            }

            fn from_input(
                value: &$crate::InputValue,
                _: &$crate::InputContext<'_>,
            ) -> $crate::FieldResult<Self> {
                let name = $crate::__type_name!(Self $(, $name)?);
                match value.as_enum_value().or_else(|| value.as_string_value()) {
                    $( ::std::option::Option::Some($value) => ::std::result::Result::Ok($variant), )*
                    _ => ::std::result::Result::Err(
                        ::std::format!("Invalid value {value} for enum \"{name}\"").into(),
                    ),
                }
            }
        }
    };
}
