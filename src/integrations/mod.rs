//! Provides serialization support and scalars for some external types
#[doc(hidden)]
pub mod serde;

#[cfg(feature = "uuid")]
/// GraphQL support for [uuid](https://doc.rust-lang.org/uuid/uuid/struct.Uuid.html) types.
pub mod uuid;
