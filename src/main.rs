use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use fudge_core::errors::Reason;
use fudge_core::{ir, CompilationError, Program, RawProgram, RuntimeError};
use native_build::{BuildError, NativeCompiler};
use structopt::StructOpt;
use tracing::{debug, error, info};

/// Where compilation mode puts the executable when no output file is given.
const DEFAULT_EXECUTABLE: &str = "a.out";

// Exit statuses, from sysexits(3).
const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_NOINPUT: i32 = 66;
const EX_SOFTWARE: i32 = 70;
const EX_CANTCREAT: i32 = 73;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "fudge",
    about = "Runs Brainfuck programs, or compiles them to native code using C as an intermediate language."
)]
struct Opt {
    /// Read code from the following argument
    #[structopt(short = "c", long = "code", conflicts_with = "file")]
    code: Option<String>,

    /// Read code from the specified file (default: stdin)
    #[structopt(short = "f", long = "file", parse(from_os_str))]
    file: Option<PathBuf>,

    /// Compile to an executable with a C compiler instead of running the program
    #[structopt(short = "g", long = "compile")]
    compile: bool,

    /// Write to the specified file (default: stdout; a.out when compiling)
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output: Option<PathBuf>,

    /// Print the generated C source instead of compiling it
    #[structopt(long = "emit-c", conflicts_with_all = &["compile", "disassemble"])]
    emit_c: bool,

    /// Print the lowered program in a pseudo-assembly format
    #[structopt(long = "disassemble", conflicts_with = "compile")]
    disassemble: bool,

    /// The C compiler used with --compile
    #[structopt(long = "cc", env = "CC", default_value = "cc")]
    cc: String,
}

/// Everything that can make the command fail, and the exit status it results in.
#[derive(Debug)]
enum Failure {
    Compilation(CompilationError),
    Runtime(RuntimeError),
    Build(BuildError),
    Output(PathBuf, io::Error),
}

fn main() {
    let opt = Opt::from_iter_safe(std::env::args_os()).unwrap_or_else(|err| {
        // --help and --version are not usage errors.
        if err.use_stderr() {
            eprintln!("{}", err.message);
            process::exit(EX_USAGE);
        }
        err.exit()
    });
    init_logging();

    if let Err(failure) = run(&opt) {
        eprintln!("{}", failure);
        process::exit(failure.exit_status());
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    // FUDGE_LOG takes precedence over RUST_LOG; only warnings by default.
    let filter = EnvFilter::try_from_env("FUDGE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(opt: &Opt) -> Result<(), Failure> {
    let source_text = read_source(opt)?;
    let program = fudge_core::parse(&source_text).map_err(|err| match &opt.file {
        Some(path) => err.in_file(path.display().to_string()),
        None => err,
    })?;

    if opt.compile {
        let output = opt
            .output
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_EXECUTABLE));
        return compile_natively(&program, &opt.cc, output);
    }

    let mut sink = open_output(opt.output.as_deref())?;
    let output_name = opt
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("<stdout>"));
    let write_failed = |err: io::Error| Failure::Output(output_name.clone(), err);

    if opt.disassemble {
        ir::disassemble(&ir::lower(&program), &mut sink).map_err(write_failed)?;
        return sink.flush().map_err(write_failed);
    }

    if opt.emit_c {
        let c_source = fudge_core::compile_to_c(&program);
        sink.write_all(c_source.as_bytes()).map_err(write_failed)?;
        return sink.flush().map_err(write_failed);
    }

    let interpreted = fudge_core::compile_to_bytecode(&program);
    interpreted.run_with_io(&mut io::stdin().lock(), &mut sink)?;

    Ok(())
}

/// Gets the program text from the command line, a file, or stdin, in that order.
fn read_source(opt: &Opt) -> Result<Vec<u8>, Failure> {
    if let Some(code) = &opt.code {
        return Ok(code.clone().into_bytes());
    }

    let result = match &opt.file {
        Some(path) => {
            debug!(path = %path.display(), "reading program from file");
            std::fs::read(path)
        }
        None => {
            debug!("reading program from stdin");
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer).map(|_| buffer)
        }
    };

    result.map_err(|err| {
        let what = opt
            .file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| String::from("stdin"));
        error!(source = %what, %err, "could not read program");
        Failure::Compilation(CompilationError::without_location(Reason::NoInput))
    })
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, Failure> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|err| Failure::Output(path.to_owned(), err))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

fn compile_natively(program: &RawProgram, cc: &str, output: &Path) -> Result<(), Failure> {
    let c_source = fudge_core::compile_to_c(program);
    NativeCompiler::new(cc).compile(&c_source, output)?;
    info!(executable = %output.display(), "compiled");
    Ok(())
}

impl Failure {
    fn exit_status(&self) -> i32 {
        match self {
            Failure::Compilation(err) => match err.reason() {
                Reason::NoInput => EX_NOINPUT,
                Reason::UnbalancedLoop | Reason::LoopEndBeforeStart => EX_DATAERR,
            },
            Failure::Runtime(_) => EX_SOFTWARE,
            Failure::Build(BuildError::TempFile(_)) => EX_CANTCREAT,
            Failure::Build(_) => EX_SOFTWARE,
            Failure::Output(..) => EX_CANTCREAT,
        }
    }
}

impl From<CompilationError> for Failure {
    fn from(err: CompilationError) -> Self {
        Failure::Compilation(err)
    }
}

impl From<RuntimeError> for Failure {
    fn from(err: RuntimeError) -> Self {
        Failure::Runtime(err)
    }
}

impl From<BuildError> for Failure {
    fn from(err: BuildError) -> Self {
        Failure::Build(err)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Failure::Compilation(err) => write!(f, "{}", err),
            Failure::Runtime(err) => write!(f, "{}", err),
            Failure::Build(err) => write!(f, "error: {}", err),
            Failure::Output(path, err) => {
                write!(f, "error: could not write to {}: {}", path.display(), err)
            }
        }
    }
}
