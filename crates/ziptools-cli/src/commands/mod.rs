//! Command implementations

pub mod add;
pub mod drop;
pub mod exists;
pub mod features;
pub mod get;
pub mod list;
pub mod make;
pub mod stat;
