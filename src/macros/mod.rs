//! Declarative macros implementing [`OutputType`](crate::OutputType) and
//! [`InputType`](crate::InputType) for user types.

#[macro_use]
mod object;
#[macro_use]
mod input_object;
#[macro_use]
mod enums;
#[macro_use]
mod scalar;
