//! Defines [Program] that allows you to run a program, regardless of how it's implemented.

use std::io::{self, Read, Write};

use crate::errors::RuntimeError;

/// A [Program] is ready to be executed. Just give it somewhere to read from and write to!
pub trait Program {
    /// Run the program with I/O routines of your choosing. Output is flushed before returning.
    fn run_with_io(&self, input: &mut dyn Read, output: &mut dyn Write)
        -> Result<(), RuntimeError>;

    /// Runs the program with the default IO (prints to `stdout`; accepts input from `stdin`)
    fn run(&self) -> Result<(), RuntimeError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with_io(&mut stdin.lock(), &mut stdout.lock())
    }
}
