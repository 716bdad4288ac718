//! The encoded representation of a program, and the lowering pass that produces it.
//!
//! Lowering does two things at once: runs of the same `+`, `-`, `>`, or `<` are collapsed into a
//! single operation with a count, and every loop bracket learns the index of its partner so that
//! jumping is a single lookup.

use std::fmt;
use std::io::{self, Write};

use tracing::debug;

use crate::parsing::{Instruction, RawProgram};

/// A program after lowering. Both backends consume this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedProgram {
    operations: Vec<Operation>,
}

/// One operation, with its operand (if any) attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Increment(usize),
    Decrement(usize),
    MoveForward(usize),
    MoveBackward(usize),
    ReadByte,
    WriteByte,
    /// Index of the matching [Operation::LoopEnd].
    LoopStart(JumpTarget),
    /// Index of the matching [Operation::LoopStart].
    LoopEnd(JumpTarget),
}

/// The index of an operation within the same [EncodedProgram].
///
/// A taken jump lands one past the target, skipping the partner bracket itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JumpTarget(pub usize);

// Implementation

impl EncodedProgram {
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The width of this program if every operand took a slot of its own: two slots for a
    /// counted run or a bracket, one for I/O.
    pub fn slot_count(&self) -> usize {
        self.operations.iter().map(|op| op.slots()).sum()
    }

    /// Undoes run-length compression, giving back an equivalent raw program.
    pub fn expand(&self) -> RawProgram {
        let mut instructions = Vec::new();

        for &op in self.operations.iter() {
            let (instruction, count) = op.as_run();
            instructions.extend(std::iter::repeat(instruction).take(count));
        }

        RawProgram::from(instructions)
    }
}

impl Operation {
    /// The first operation of a run of `instruction`.
    fn start_of(instruction: Instruction) -> Self {
        use Instruction::*;
        match instruction {
            Increment => Operation::Increment(1),
            Decrement => Operation::Decrement(1),
            MoveForward => Operation::MoveForward(1),
            MoveBackward => Operation::MoveBackward(1),
            ReadByte => Operation::ReadByte,
            WriteByte => Operation::WriteByte,
            // Patched once the matching LoopEnd is seen.
            LoopStart => Operation::LoopStart(JumpTarget(0)),
            LoopEnd => Operation::LoopEnd(JumpTarget(0)),
        }
    }

    /// Adds one more repetition to a counted operation.
    fn extend_run(&mut self) {
        use Operation::*;
        match self {
            Increment(n) | Decrement(n) | MoveForward(n) | MoveBackward(n) => *n += 1,
            _ => panic!("tried to extend a run of {:?}", self),
        }
    }

    /// The raw instruction this operation came from, and how many times it was repeated.
    pub fn as_run(self) -> (Instruction, usize) {
        use Operation::*;
        match self {
            Increment(n) => (Instruction::Increment, n),
            Decrement(n) => (Instruction::Decrement, n),
            MoveForward(n) => (Instruction::MoveForward, n),
            MoveBackward(n) => (Instruction::MoveBackward, n),
            ReadByte => (Instruction::ReadByte, 1),
            WriteByte => (Instruction::WriteByte, 1),
            LoopStart(_) => (Instruction::LoopStart, 1),
            LoopEnd(_) => (Instruction::LoopEnd, 1),
        }
    }

    fn slots(self) -> usize {
        match self {
            Operation::ReadByte | Operation::WriteByte => 1,
            _ => 2,
        }
    }
}

/// Computes exactly how many operations [lower] will produce.
pub fn encoded_len(program: &RawProgram) -> usize {
    let mut len = 0;
    let mut previous = None;

    for &instruction in program.instructions() {
        let continues_run = instruction.is_repeatable() && previous == Some(instruction);
        if !continues_run {
            len += 1;
        }
        previous = Some(instruction);
    }

    len
}

/// Lowers a validated [RawProgram] into an [EncodedProgram].
///
/// # Panics
///
/// If the brackets are unbalanced. [crate::parse] never produces such a program.
pub fn lower(program: &RawProgram) -> EncodedProgram {
    let expected_len = encoded_len(program);
    let mut operations: Vec<Operation> = Vec::with_capacity(expected_len);
    let mut pending_loops: Vec<usize> = Vec::new();
    let mut run: Option<Instruction> = None;

    for &instruction in program.instructions() {
        if instruction.is_repeatable() && run == Some(instruction) {
            if let Some(last) = operations.last_mut() {
                last.extend_run();
            }
            continue;
        }

        run = Some(instruction).filter(|i| i.is_repeatable());
        let pc = operations.len();

        let op = match instruction {
            Instruction::LoopStart => {
                pending_loops.push(pc);
                Operation::start_of(instruction)
            }
            Instruction::LoopEnd => {
                let start = pending_loops
                    .pop()
                    .expect("every loop end should have a matching start");
                operations[start] = Operation::LoopStart(JumpTarget(pc));
                Operation::LoopEnd(JumpTarget(start))
            }
            _ => Operation::start_of(instruction),
        };
        operations.push(op);
    }

    assert!(
        pending_loops.is_empty(),
        "every loop start should have a matching end"
    );
    debug_assert_eq!(operations.len(), expected_len);

    debug!(
        raw = program.len(),
        encoded = operations.len(),
        "lowered program"
    );

    EncodedProgram { operations }
}

/// Prints an [EncodedProgram] in a pseudo-assembly format.
pub fn disassemble(program: &EncodedProgram, out: &mut dyn Write) -> io::Result<()> {
    for (i, op) in program.operations().iter().enumerate() {
        writeln!(out, "{:4}: {}", i, op)?;
    }
    Ok(())
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Operation::*;
        match self {
            Increment(amount) => write!(f, "[p] <- [p] + #{}", amount),
            Decrement(amount) => write!(f, "[p] <- [p] - #{}", amount),
            MoveForward(amount) => write!(f, "p <- p + #{}", amount),
            MoveBackward(amount) => write!(f, "p <- p - #{}", amount),
            ReadByte => write!(f, "getchar [p]"),
            WriteByte => write!(f, "putchar [p]"),
            LoopStart(target) => write!(f, "beq {}", target.0 + 1),
            LoopEnd(target) => write!(f, "bne {}", target.0 + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse;
    use Operation::*;

    fn lowered(source: &str) -> EncodedProgram {
        lower(&parse(source.as_bytes()).unwrap())
    }

    #[test]
    fn collapses_runs() {
        let program = lowered("+++>>--<.");
        assert_eq!(
            program.operations(),
            &[
                Increment(3),
                MoveForward(2),
                Decrement(2),
                MoveBackward(1),
                WriteByte
            ]
        );
    }

    #[test]
    fn io_is_never_collapsed() {
        let program = lowered(",,..");
        assert_eq!(program.operations(), &[ReadByte, ReadByte, WriteByte, WriteByte]);
    }

    #[test]
    fn loops_break_runs() {
        let program = lowered("+[]+");
        assert_eq!(
            program.operations(),
            &[
                Increment(1),
                LoopStart(JumpTarget(2)),
                LoopEnd(JumpTarget(1)),
                Increment(1)
            ]
        );
    }

    #[test]
    fn comments_do_not_break_runs() {
        let program = lowered("+ + +");
        assert_eq!(program.operations(), &[Increment(3)]);
    }

    #[test]
    fn nested_loops_match_their_own_partner() {
        let program = lowered("[[-]+]");
        assert_eq!(
            program.operations(),
            &[
                LoopStart(JumpTarget(5)),
                LoopStart(JumpTarget(3)),
                Decrement(1),
                LoopEnd(JumpTarget(1)),
                Increment(1),
                LoopEnd(JumpTarget(0)),
            ]
        );
    }

    #[test]
    fn sibling_loops() {
        let program = lowered("[][-]");
        assert_eq!(
            program.operations(),
            &[
                LoopStart(JumpTarget(1)),
                LoopEnd(JumpTarget(0)),
                LoopStart(JumpTarget(4)),
                Decrement(1),
                LoopEnd(JumpTarget(2)),
            ]
        );
    }

    #[test]
    fn encoded_len_is_exact() {
        for source in ["", "+", "+++--->>><<<", "[[-]+]", ",.,.", "+[>+<-]>."] {
            let raw = parse(source.as_bytes()).unwrap();
            assert_eq!(encoded_len(&raw), lower(&raw).len(), "for {:?}", source);
        }
    }

    #[test]
    fn slot_count_uses_flat_layout() {
        // Increment(8) [2] + LoopStart [2] + MoveForward [2] + Increment [2] + MoveBackward [2]
        // + Decrement [2] + LoopEnd [2] + MoveForward [2] + WriteByte [1]
        let program = lowered("++++++++[>++++++++<-]>.");
        assert_eq!(program.slot_count(), 17);
    }

    #[test]
    fn expand_gives_back_the_source() {
        let source = "++++++++[>++++++++<-]>.";
        assert_eq!(lowered(source).expand().to_string(), source);
    }

    #[test]
    fn disassembles() {
        let mut out = Vec::new();
        disassemble(&lowered("+[-]."), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "   0: [p] <- [p] + #1\n   1: beq 4\n   2: [p] <- [p] - #1\n   3: bne 2\n   4: putchar [p]\n"
        );
    }
}
