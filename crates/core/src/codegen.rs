//! Generates C source code for a given program.
//!
//! The generated program keeps all of its state in a `struct tape` that is passed explicitly to
//! the helpers, so it has no globals. Cells are `unsigned int` so that overflow wraps the same way
//! it does in the interpreter.

use tracing::debug;

use crate::ir::{EncodedProgram, Operation};

/// Everything before the body of `main`.
const PROLOGUE: &str = r#"#include <stdio.h>
#include <stdlib.h>
#include <string.h>

struct tape {
    unsigned int *cells;
    size_t size;
    size_t ptr;
};

static void tape_grow(struct tape *t)
{
    if (t->ptr < t->size)
        return;
    size_t old_size = t->size;
    while (t->ptr >= t->size)
        t->size *= 2;
    unsigned int *cells = realloc(t->cells, t->size * sizeof(unsigned int));
    if (cells == NULL) {
        perror("tape_grow");
        exit(71);
    }
    memset(cells + old_size, 0, (t->size - old_size) * sizeof(unsigned int));
    t->cells = cells;
}

static void tape_back(struct tape *t, size_t n)
{
    if (t->ptr < n) {
        fputs("runtime error: moved past the start of the tape\n", stderr);
        exit(70);
    }
    t->ptr -= n;
}

int main(void)
{
    struct tape t = { calloc(1, sizeof(unsigned int)), 1, 0 };
    if (t.cells == NULL)
        return 71;
"#;

/// Everything after the body of `main`.
const EPILOGUE: &str = r#"    fflush(stdout);
    free(t.cells);
    return 0;
}
"#;

const INDENT: &str = "    ";

/// Takes an [EncodedProgram] and writes an equivalent C program.
pub struct CodeGenerator {
    source: String,
    open_loops: Vec<usize>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        CodeGenerator {
            source: String::new(),
            open_loops: Vec::new(),
        }
    }

    pub fn compile(&mut self, program: &EncodedProgram) -> &str {
        self.source.clear();
        self.open_loops.clear();

        self.source.push_str(PROLOGUE);
        for (pc, &op) in program.operations().iter().enumerate() {
            self.generate_statement(pc, op);
        }
        assert!(
            self.open_loops.is_empty(),
            "expected every while loop to be closed before main returns"
        );
        self.source.push_str(EPILOGUE);

        debug!(
            operations = program.len(),
            bytes = self.source.len(),
            "generated C source"
        );

        &self.source
    }

    fn generate_statement(&mut self, pc: usize, op: Operation) {
        use Operation::*;
        match op {
            // Counts are truncated to the width of a cell, same as in the interpreter.
            Increment(n) => self.line(&format!("t.cells[t.ptr] += {}u;", n as u32)),
            Decrement(n) => self.line(&format!("t.cells[t.ptr] -= {}u;", n as u32)),
            MoveForward(n) => {
                self.line(&format!("t.ptr += {};", n));
                self.line("tape_grow(&t);");
            }
            MoveBackward(n) => self.line(&format!("tape_back(&t, {});", n)),
            ReadByte => {
                self.line("fflush(stdout);");
                self.line("t.cells[t.ptr] = (unsigned int)getchar();");
            }
            WriteByte => self.line("putchar((unsigned char)t.cells[t.ptr]);"),
            LoopStart(_) => {
                self.line("while (t.cells[t.ptr] != 0) {");
                self.open_loops.push(pc);
            }
            LoopEnd(target) => {
                let start = self.open_loops.pop();
                debug_assert_eq!(start, Some(target.0), "loop end closes the wrong loop");
                self.line("}");
            }
        }
    }

    // Writes one line of the body of main, at the current nesting depth.
    fn line(&mut self, statement: &str) {
        for _ in 0..=self.open_loops.len() {
            self.source.push_str(INDENT);
        }
        self.source.push_str(statement);
        self.source.push('\n');
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        CodeGenerator::new()
    }
}
