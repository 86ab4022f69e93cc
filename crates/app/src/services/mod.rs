//! Permission-gated use cases, implemented as `Session` methods.

pub mod dashboard;
pub mod history;
pub mod items;
pub mod movements;
