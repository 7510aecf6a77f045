//! Small value types shared by the handle operations.

pub mod entry_name;

pub use entry_name::normalize;
