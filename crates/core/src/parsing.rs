//! Turns source text into a flat list of [Instruction]s, checking that loops are balanced.

use std::fmt;

use tracing::debug;

use crate::errors::{CompilationError, Location, Reason};

/// The raw, validated instruction stream, exactly as written in the source (minus comments).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawProgram {
    instructions: Vec<Instruction>,
}

/// One of the eight significant characters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    Increment,
    Decrement,
    ReadByte,
    WriteByte,
    MoveForward,
    MoveBackward,
    LoopStart,
    LoopEnd,
}

// public functions

/// Parses source text (really, just a bunch of bytes) into a list of instructions.
///
/// Fails as soon as a `]` shows up with no `[` to close, and after the whole input has been
/// scanned if any `[` is left open.
pub fn parse(source_text: &[u8]) -> Result<RawProgram, CompilationError> {
    let mut instructions = Vec::new();
    let mut open_loops = OpenLoops::new();
    let mut line_no = 1;

    for &byte in source_text {
        if byte == b'\n' {
            line_no += 1;
        }

        let instruction = match Instruction::from_byte(byte) {
            Some(instruction) => instruction,
            None => continue,
        };

        match instruction {
            Instruction::LoopStart => open_loops.push(line_no),
            Instruction::LoopEnd => {
                if open_loops.pop().is_none() {
                    return Err(CompilationError::new(
                        Reason::LoopEndBeforeStart,
                        Location::new(line_no),
                    ));
                }
            }
            _ => (),
        }

        instructions.push(instruction);
    }

    if let Some(line_no) = open_loops.outermost() {
        return Err(CompilationError::new(
            Reason::UnbalancedLoop,
            Location::new(line_no),
        ));
    }

    debug!(
        instructions = instructions.len(),
        source_bytes = source_text.len(),
        "parsed program"
    );

    Ok(RawProgram { instructions })
}

// Implementations

impl Instruction {
    /// Classifies a single source byte. Anything that isn't one of the eight instructions is a
    /// comment.
    pub fn from_byte(byte: u8) -> Option<Instruction> {
        use Instruction::*;
        match byte {
            b'+' => Some(Increment),
            b'-' => Some(Decrement),
            b',' => Some(ReadByte),
            b'.' => Some(WriteByte),
            b'>' => Some(MoveForward),
            b'<' => Some(MoveBackward),
            b'[' => Some(LoopStart),
            b']' => Some(LoopEnd),
            _ => None,
        }
    }

    /// The source character for this instruction.
    pub fn symbol(self) -> char {
        use Instruction::*;
        match self {
            Increment => '+',
            Decrement => '-',
            ReadByte => ',',
            WriteByte => '.',
            MoveForward => '>',
            MoveBackward => '<',
            LoopStart => '[',
            LoopEnd => ']',
        }
    }

    /// Instructions that can be collapsed into a single (instruction, count) pair.
    pub fn is_repeatable(self) -> bool {
        use Instruction::*;
        matches!(self, Increment | Decrement | MoveForward | MoveBackward)
    }
}

impl RawProgram {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions[..]
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl From<Vec<Instruction>> for RawProgram {
    /// Wraps instructions that are already known to be balanced.
    fn from(instructions: Vec<Instruction>) -> Self {
        RawProgram { instructions }
    }
}

impl fmt::Display for RawProgram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for instruction in self.instructions.iter() {
            write!(f, "{}", instruction.symbol())?;
        }
        Ok(())
    }
}

// Private data structures

/// Lines of every `[` that hasn't been closed yet.
struct OpenLoops {
    stack: Vec<u32>,
}

impl OpenLoops {
    fn new() -> Self {
        Self { stack: Vec::new() }
    }

    fn push(&mut self, line_no: u32) {
        self.stack.push(line_no);
    }

    fn pop(&mut self) -> Option<u32> {
        self.stack.pop()
    }

    fn outermost(&self) -> Option<u32> {
        self.stack.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Instruction::*;

    #[test]
    fn ignores_comments() {
        let program = parse(b"hello +- world .,\n<>").unwrap();
        assert_eq!(
            program.instructions(),
            &[Increment, Decrement, WriteByte, ReadByte, MoveBackward, MoveForward]
        );
    }

    #[test]
    fn empty_input_is_an_empty_program() {
        let program = parse(b"no instructions here").unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn lone_open_bracket() {
        let err = parse(b"[").unwrap_err();
        assert_eq!(err.reason(), Reason::UnbalancedLoop);
    }

    #[test]
    fn lone_close_bracket() {
        let err = parse(b"]").unwrap_err();
        assert_eq!(err.reason(), Reason::LoopEndBeforeStart);
    }

    #[test]
    fn close_before_open_fails_even_if_balanced_overall() {
        let err = parse(b"][").unwrap_err();
        assert_eq!(err.reason(), Reason::LoopEndBeforeStart);
    }

    #[test]
    fn reports_line_of_stray_close_bracket() {
        let err = parse(b"+\n+\n]").unwrap_err();
        assert_eq!(err.location().map(Location::line_no), Some(3));
    }

    #[test]
    fn reports_line_of_outermost_unclosed_loop() {
        let err = parse(b"\n[\n[]\n[").unwrap_err();
        assert_eq!(err.reason(), Reason::UnbalancedLoop);
        assert_eq!(err.location().map(Location::line_no), Some(2));
    }

    #[test]
    fn displays_as_source() {
        let program = parse(b"a[b-c]d.").unwrap();
        assert_eq!(program.to_string(), "[-].");
    }
}
