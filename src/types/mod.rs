pub mod base;
pub mod containers;
pub mod scalars;
pub mod union;
pub mod unsupported;
