//! The memory a running program operates on.

use tracing::trace;

use crate::errors::RuntimeError;

/// A single memory cell. Arithmetic on cells wraps.
pub type Cell = i32;

/// A zero-initialized row of cells that grows to the right on demand.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<Cell>,
    pointer: usize,
}

impl Tape {
    /// A tape with a single zero cell, with the pointer on it.
    pub fn new() -> Self {
        Tape {
            cells: vec![0],
            pointer: 0,
        }
    }

    /// Index of the current cell.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// How many cells have been allocated so far.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self) -> Cell {
        self.cells[self.pointer]
    }

    pub fn set(&mut self, value: Cell) {
        self.cells[self.pointer] = value;
    }

    pub fn add(&mut self, amount: usize) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(amount as Cell);
    }

    pub fn subtract(&mut self, amount: usize) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub(amount as Cell);
    }

    /// Moves right, doubling the tape until the pointer lands on an allocated cell.
    pub fn move_forward(&mut self, offset: usize) {
        self.pointer += offset;

        if self.pointer >= self.cells.len() {
            let mut new_len = self.cells.len().max(1);
            while self.pointer >= new_len {
                new_len *= 2;
            }
            trace!(from = self.cells.len(), to = new_len, "growing tape");
            self.cells.resize(new_len, 0);
        }
    }

    /// Moves left. Moving past the first cell is an error; the pointer is left where it was.
    pub fn move_backward(&mut self, offset: usize) -> Result<(), RuntimeError> {
        self.pointer = self
            .pointer
            .checked_sub(offset)
            .ok_or(RuntimeError::OutOfBounds {
                pointer: self.pointer,
                offset,
            })?;
        Ok(())
    }
}

impl Default for Tape {
    fn default() -> Self {
        Tape::new()
    }
}
