//! All errors that can be _generated_ by the compiler and the interpreter.
use std::fmt;
use std::io;

/// Any error that occurs as a result of compiling the source code.
#[derive(Debug)]
pub struct CompilationError {
    reason: Reason,
    location: Option<Location>,
}

/// Where in the source an error was detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    filename: Option<String>,
    line_no: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Some `[` was never closed.
    UnbalancedLoop,
    /// A `]` appeared before any `[` it could close.
    LoopEndBeforeStart,
    /// The input source yielded nothing we could read.
    NoInput,
}

impl CompilationError {
    pub fn new(reason: Reason, location: Location) -> Self {
        CompilationError {
            reason,
            location: Some(location),
        }
    }

    pub fn without_location(reason: Reason) -> Self {
        CompilationError {
            reason,
            location: None,
        }
    }

    /// Attaches a filename to the location, once the caller knows where the source came from.
    pub fn in_file(mut self, filename: impl Into<String>) -> Self {
        if let Some(location) = self.location.as_mut() {
            location.filename = Some(filename.into());
        }
        self
    }

    pub fn reason(&self) -> Reason {
        self.reason
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn message(&self) -> &'static str {
        self.reason.message()
    }

    pub fn message_identifier(&self) -> u32 {
        self.reason.message_identifier()
    }
}

impl Reason {
    pub fn message_identifier(&self) -> u32 {
        use Reason::*;
        match self {
            UnbalancedLoop => 0x001,
            LoopEndBeforeStart => 0x002,
            NoInput => 0x003,
        }
    }

    pub fn message(&self) -> &'static str {
        use Reason::*;
        match self {
            UnbalancedLoop => "'[' and ']' were not balanced. Check that each '[' has a matching ']'",
            LoopEndBeforeStart => "encountered ']' before a matching '['",
            NoInput => "could not read from input",
        }
    }
}

impl Location {
    pub fn new(line_no: u32) -> Self {
        Location {
            filename: None,
            line_no,
        }
    }

    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

impl std::error::Error for CompilationError {}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let location = self
            .location
            .as_ref()
            .map(|l| format!(" {}:", l))
            .unwrap_or_else(|| String::from(""));

        write!(
            f,
            "error[{:04x}]:{} {}",
            self.message_identifier(),
            location,
            self.message()
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.filename {
            Some(filename) => write!(f, "{}:{}", filename, self.line_no),
            None => write!(f, "line {}", self.line_no),
        }
    }
}

/// Anything that stops a running program early.
#[derive(Debug)]
pub enum RuntimeError {
    /// The data pointer tried to move to the left of the first cell.
    OutOfBounds { pointer: usize, offset: usize },
    Io(io::Error),
}

impl From<io::Error> for RuntimeError {
    fn from(err: io::Error) -> RuntimeError {
        RuntimeError::Io(err)
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Io(err) => Some(err),
            RuntimeError::OutOfBounds { .. } => None,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuntimeError::OutOfBounds { pointer, offset } => write!(
                f,
                "runtime error: moved {} cells left of cell {}, which is past the start of the tape",
                offset, pointer
            ),
            RuntimeError::Io(err) => write!(f, "runtime error: {}", err),
        }
    }
}
