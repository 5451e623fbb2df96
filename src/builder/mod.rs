//! External build tool integration.
//!
//! This module drives CMake and writes the files its configure step reads.

pub mod cmake;
pub mod generators;
pub mod tool;

pub use cmake::CMake;
pub use tool::BuildTool;
