use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use tracing::info;

use crate::{make_executable, BuildError, TempSource};

/// An external C compiler, invoked like `cc -O3 -x c -o OUTPUT SOURCE`.
#[derive(Debug, Clone)]
pub struct NativeCompiler {
    program: String,
    flags: Vec<String>,
}

impl NativeCompiler {
    /// Uses `program` (e.g., `cc`, `gcc`, `clang`) with optimizations turned on.
    pub fn new(program: impl Into<String>) -> Self {
        NativeCompiler {
            program: program.into(),
            flags: vec![String::from("-O3")],
        }
    }

    /// Adds another flag, passed before the source file.
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments the compiler will be called with.
    pub fn arguments(&self, source: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.flags.iter().map(OsString::from).collect();
        args.push("-x".into());
        args.push("c".into());
        args.push("-o".into());
        args.push(output.as_os_str().to_owned());
        args.push(source.as_os_str().to_owned());
        args
    }

    /// Writes `c_source` to a temporary file, compiles it to `output`, and marks the result
    /// executable. The temporary file is removed whether or not compilation succeeds.
    pub fn compile(&self, c_source: &str, output: &Path) -> crate::Result<()> {
        let mut source = TempSource::create("fudge")?;
        source.write_source(c_source)?;

        let args = self.arguments(source.path(), output);
        info!(compiler = %self.program, ?args, "invoking C compiler");

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|err| BuildError::CannotReachCompiler {
                program: self.program.clone(),
                source: err,
            })?;

        if !status.success() {
            return Err(BuildError::CompilerFailed(status));
        }

        make_executable(output)
    }
}

impl Default for NativeCompiler {
    fn default() -> Self {
        NativeCompiler::new("cc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_put_the_source_last() {
        let compiler = NativeCompiler::default().with_flag("-g");
        let args = compiler.arguments(Path::new("/tmp/in.c"), Path::new("out"));

        assert_eq!(compiler.program(), "cc");
        assert_eq!(args, ["-O3", "-g", "-x", "c", "-o", "out", "/tmp/in.c"]);
    }

    #[test]
    fn missing_compiler_cannot_be_reached() {
        let compiler = NativeCompiler::new("fudge-test-no-such-compiler");
        let err = compiler
            .compile("int main(void) { return 0; }\n", Path::new("unused.out"))
            .unwrap_err();

        assert!(matches!(err, BuildError::CannotReachCompiler { .. }));
    }

    #[test]
    fn failing_compiler_is_reported() {
        // `false` accepts any arguments and always fails.
        let compiler = NativeCompiler::new("false");
        let err = compiler
            .compile("int main(void) { return 0; }\n", Path::new("unused.out"))
            .unwrap_err();

        assert!(matches!(err, BuildError::CompilerFailed(_)));
    }
}
