/**
Expose a struct as a GraphQL input object type.

Every listed field is decoded from the argument object of the same name;
absent fields decode as `null`, so they must be [`Option`]s unless every
query provides them. Fields not listed are rejected. All fields of the
struct must be listed.

```rust
# use juniper_dynamic::graphql_input_object;
struct InputTwo {
    one: InputOne,
    quantity: i32,
}

struct InputOne {
    id: String,
    tags: Option<Vec<String>>,
}

graphql_input_object!(InputOne { id, tags });
graphql_input_object!(InputTwo as "OrderInput" { one, quantity });
```

Types of arguments are registered on their own when the schema is built, so
nothing else is needed to use `InputTwo` as a resolver parameter.
*/
#[macro_export]
macro_rules! graphql_input_object {
    ($ty:ty $(as $name:literal)? { $($field:ident),* $(,)? }) => {
        impl $crate::InputType for $ty {
            fn input_ref() -> $crate::TypeRef {
                let name = $crate::__type_name!(Self $(, $name)?);
                $crate::TypeRef::input_object::<Self>(name, |descriptor| {
                    $( _ = descriptor.field(stringify!($field), |v: &Self| &v.$field); )*
                })
            }

            fn from_input(
                value: &$crate::InputValue,
                ctx: &$crate::InputContext<'_>,
            ) -> $crate::FieldResult<Self> {
                let name = $crate::__type_name!(Self $(, $name)?);
                let object = value.to_object_value().ok_or_else(|| {
                    ::std::format!("Expected input object \"{name}\", found {value}")
                })?;
                ctx.check_fields(&object, &[$(stringify!($field)),*], name)?;
                ::std::result::Result::Ok(Self {
                    $( $field: ctx.field(&object, stringify!($field))?, )*
                })
            }
        }
    };
}
