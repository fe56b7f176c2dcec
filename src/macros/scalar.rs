/**
Expose a type as a custom GraphQL scalar.

The macro only makes the type usable in resolvers and objects; the scalar
itself, with its name and coercion functions, is declared on the
[`SchemaBuilder`](crate::SchemaBuilder). Building a schema that uses the type
without declaring the scalar fails with
[`SchemaError::UnknownScalar`](crate::SchemaError::UnknownScalar).

```rust
# use juniper_dynamic::{Schema, graphql_scalar};
#[derive(Clone, Debug, PartialEq)]
struct Id {
    literal: String,
    numeric: i32,
}

graphql_scalar!(Id);

let schema = Schema::build()
    .string_scalar::<Id>(|s| {
        s.name("Id")
            .description("Literal and number joined by a colon")
            .serialize(|id| format!("{}:{}", id.literal, id.numeric))
            .deserialize(|raw| {
                let (literal, numeric) = raw.split_once(':').ok_or("missing colon")?;
                Ok::<_, String>(Id {
                    literal: literal.into(),
                    numeric: numeric.parse().map_err(|_| "invalid number")?,
                })
            })
    })
    .query("id", |q| q.resolver(|| Id { literal: "x".into(), numeric: 1 }))
    .build()
    .expect("valid schema");

assert!(schema.scalar("Id").is_some());
```
*/
#[macro_export]
macro_rules! graphql_scalar {
    ($ty:ty) => {
        impl $crate::OutputType for $ty {
            fn type_ref() -> $crate::TypeRef {
                $crate::TypeRef::scalar::<Self>()
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
                $crate::TypeRef::scalar::<Self>()
            }

            fn from_input(
                value: &$crate::InputValue,
                ctx: &$crate::InputContext<'_>,
            ) -> $crate::FieldResult<Self> {
                ctx.deserialize_scalar(value)
            }
        }
    };
}
