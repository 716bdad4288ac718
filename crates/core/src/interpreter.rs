//! Runs an [EncodedProgram] directly on an emulated [Tape].

use std::io::{self, Read, Write};

use tracing::debug;

use crate::errors::RuntimeError;
use crate::ir::{EncodedProgram, Operation};
use crate::program::Program;
use crate::tape::{Cell, Tape};

/// What a read stores when the input has run dry. Same as C's `EOF`.
pub const END_OF_INPUT: Cell = -1;

/// A [Program] that is interpreted one [Operation] at a time.
pub struct InterpretedProgram {
    program: EncodedProgram,
}

impl InterpretedProgram {
    pub fn new(program: EncodedProgram) -> Self {
        InterpretedProgram { program }
    }

    /// Runs the program, returning the tape as it was when the program halted.
    pub fn run_on_tape(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<Tape, RuntimeError> {
        use Operation::*;

        let operations = self.program.operations();
        let mut tape = Tape::new();
        let mut program_counter = 0;

        while program_counter < operations.len() {
            program_counter = match operations[program_counter] {
                Increment(n) => {
                    tape.add(n);
                    program_counter + 1
                }
                Decrement(n) => {
                    tape.subtract(n);
                    program_counter + 1
                }
                MoveForward(n) => {
                    tape.move_forward(n);
                    program_counter + 1
                }
                MoveBackward(n) => {
                    tape.move_backward(n)?;
                    program_counter + 1
                }
                WriteByte => {
                    output.write_all(&[tape.get() as u8])?;
                    program_counter + 1
                }
                ReadByte => {
                    // Prompts must be visible before we block on input.
                    output.flush()?;
                    tape.set(read_byte(input)?);
                    program_counter + 1
                }
                LoopStart(target) => {
                    if tape.get() == 0 {
                        target.0 + 1
                    } else {
                        program_counter + 1
                    }
                }
                LoopEnd(target) => {
                    if tape.get() != 0 {
                        target.0 + 1
                    } else {
                        program_counter + 1
                    }
                }
            }
        }

        output.flush()?;
        debug!(cells = tape.len(), "program halted");

        Ok(tape)
    }
}

impl Program for InterpretedProgram {
    fn run_with_io(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<(), RuntimeError> {
        self.run_on_tape(input, output).map(|_| ())
    }
}

/// Reads exactly one byte, or [END_OF_INPUT] if there are none left.
fn read_byte(input: &mut dyn Read) -> io::Result<Cell> {
    let mut one_byte = [0u8];
    loop {
        match input.read(&mut one_byte) {
            Ok(0) => return Ok(END_OF_INPUT),
            Ok(_) => return Ok(one_byte[0] as Cell),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
