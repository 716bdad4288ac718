//! The parts of building a native executable that have to talk to the operating system: a
//! temporary file to hold the generated C source, the external C compiler, and the permission bits
//! on whatever it produced.
//!
//! Only Unix-like systems are supported.

mod compiler;
mod error;
mod permissions;
mod temp_source;

pub use compiler::NativeCompiler;
pub use error::{BuildError, Result};
pub use permissions::make_executable;
pub use temp_source::TempSource;
