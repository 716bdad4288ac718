//! Builds the generated C with the system compiler and checks it behaves like the interpreter.
//!
//! Skipped when there is no `cc` on the PATH.

use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use fudge_core::{compile_to_bytecode, compile_to_c, parse, Program};
use native_build::NativeCompiler;

const HELLO_WORLD: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";
const CAT: &str = ",+[-.,+]";
const REVERSE: &str = ">,+[->,+]<[.<]";

fn have_cc() -> bool {
    let found = Command::new("cc").arg("--version").output().is_ok();
    if !found {
        eprintln!("cc not found; skipping");
    }
    found
}

/// Compiles `source` to an executable and runs it with `input` on stdin.
fn run_native(name: &str, source: &str, input: &[u8]) -> Output {
    let executable: PathBuf =
        std::env::temp_dir().join(format!("fudge-native-{}-{}", std::process::id(), name));
    let c_source = compile_to_c(&parse(source.as_bytes()).unwrap());
    NativeCompiler::default()
        .compile(&c_source, &executable)
        .unwrap();

    let mut child = Command::new(&executable)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    let output = child.wait_with_output().unwrap();

    fs::remove_file(&executable).unwrap();
    output
}

fn interpret(source: &str, input: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    compile_to_bytecode(&parse(source.as_bytes()).unwrap())
        .run_with_io(&mut Cursor::new(input), &mut output)
        .unwrap();
    output
}

#[test]
fn native_output_matches_interpreter() {
    if !have_cc() {
        return;
    }

    let far_right = ">".repeat(5000) + "+.";
    let cases: &[(&str, &str, &[u8])] = &[
        ("hello", HELLO_WORLD, b""),
        ("cat", CAT, b"meow"),
        ("reverse", REVERSE, b"stressed"),
        ("eof", ",.", b""),
        ("negative", "-.", b""),
        ("far-right", far_right.as_str(), b""),
    ];

    for &(name, source, input) in cases {
        let native = run_native(name, source, input);
        assert!(native.status.success(), "{} exited with {}", name, native.status);
        assert_eq!(native.stdout, interpret(source, input), "for {}", name);
    }
}

#[test]
fn native_end_of_input_reads_as_minus_one() {
    if !have_cc() {
        return;
    }

    assert_eq!(run_native("eof-byte", ",.", b"").stdout, vec![0xff]);
}

#[test]
fn native_underflow_exits_with_software_error() {
    if !have_cc() {
        return;
    }

    let native = run_native("underflow", "+.<.", b"");
    assert_eq!(native.status.code(), Some(70));
    assert_eq!(native.stdout, vec![1]);
}
