//! Request/response bodies

pub mod info;
pub mod prediction;

pub use info::*;
pub use prediction::*;
