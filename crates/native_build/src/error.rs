use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use errno::Errno;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

/// Any error thrown while turning C source into an executable. None of these are retried.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not create a temporary source file: {0}")]
    TempFile(Errno),
    #[error("could not reach the C compiler `{program}`: {source}")]
    CannotReachCompiler {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("the C compiler failed ({0})")]
    CompilerFailed(ExitStatus),
    #[error("could not make {} executable: {}", .path.display(), .errno)]
    Permissions { path: PathBuf, errno: Errno },
    #[error("path cannot be passed to the operating system: {}", .0.display())]
    InvalidPath(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}
