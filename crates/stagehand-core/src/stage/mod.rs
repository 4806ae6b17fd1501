//! Population of the staging directory.

pub mod deps;
pub mod extras;
