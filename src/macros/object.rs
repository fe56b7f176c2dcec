/**
Expose a struct as a GraphQL object type.

Every listed field becomes a property of the type, resolved by cloning the
field out of the value. The type is named after the struct unless a name is
given with `as`. Further properties, renames and metadata are declared on the
[`SchemaBuilder`](crate::SchemaBuilder).

```rust
# use juniper_dynamic::graphql_object;
#[derive(Clone)]
struct Scenario {
    id: String,
    content: String,
    parent: Option<Box<Scenario>>,
}

graphql_object!(Scenario { id, content, parent });

#[derive(Clone)]
struct Film {
    title: String,
}

graphql_object!(Film as "Movie" { title });
```

Field types must implement [`OutputType`](crate::OutputType) and [`Clone`].
Fields of function or generic types are accepted here, and rejected when the
schema is built.
*/
#[macro_export]
macro_rules! graphql_object {
    ($ty:ty $(as $name:literal)? { $($field:ident),* $(,)? }) => {
        impl $crate::OutputType for $ty {
            fn type_ref() -> $crate::TypeRef {
                let name = $crate::__type_name!(Self $(, $name)?);
                $crate::TypeRef::object::<Self>(name, |descriptor| {
                    $(
                        _ = descriptor.field(stringify!($field), |v: &Self| {
                            ::std::clone::Clone::clone(&v.$field)
                        });
                    )*
                })
            }

            fn into_output(self) -> $crate::Output {
                $crate::Output::value(self)
            }

            fn from_output(output: $crate::Output) -> ::std::option::Option<Self> {
                output.take()
            }
        }
    };
}

/// Name of a described type: the explicit one if given, otherwise the last
/// path segment of the Rust type.
#[doc(hidden)]
#[macro_export]
macro_rules! __type_name {
    ($ty:ty) => {
        $crate::RustType::of::<$ty>().short_name()
    };
    ($ty:ty, $name:literal) => {
        $name
    };
}
