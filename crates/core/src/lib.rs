//! Fudge internals.
//!
//! The pipeline is short, and every stage hands the next one something a little denser:
//!
//!  - source code is parsed into a [RawProgram], one [Instruction] per significant character,
//!    with the loop brackets checked for balance along the way;
//!  - the raw program is _lowered_ into an [EncodedProgram]: repeated `+`, `-`, `>`, and `<` are
//!    collapsed into a single counted [ir::Operation], and each bracket knows where its partner is;
//!  - the encoded program is then either _interpreted_ on a growable [tape::Tape], or compiled to
//!    C source code that an external C compiler turns into an executable.

use crate::codegen::CodeGenerator;
use crate::interpreter::InterpretedProgram;

pub mod errors;
pub mod interpreter;
pub mod ir;
pub mod parsing;
pub mod tape;

mod codegen;
mod program;

pub use crate::errors::{CompilationError, RuntimeError};
pub use crate::ir::EncodedProgram;
pub use crate::parsing::{parse, Instruction, RawProgram};
pub use crate::program::Program;

/// Lower the raw program, ready to be interpreted.
pub fn compile_to_bytecode(program: &RawProgram) -> InterpretedProgram {
    InterpretedProgram::new(ir::lower(program))
}

/// Lower the raw program and generate a standalone C program from it.
pub fn compile_to_c(program: &RawProgram) -> String {
    let encoded = ir::lower(program);

    let mut gen = CodeGenerator::new();
    gen.compile(&encoded).to_owned()
}
