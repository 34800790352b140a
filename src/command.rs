use std::fmt;
use std::process::Command;

use anyhow::{bail, Context, Result};
use log::debug;

/// One external command invocation, argv style. Mode transitions are built
/// as ordered lists of these so the exact sequence can be inspected in
/// tests without touching a real interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    pub program: &'static str,
    pub args: Vec<String>,
}

impl Cmd {
    pub fn new<S: AsRef<str>>(program: &'static str, args: &[S]) -> Self {
        Cmd {
            program,
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }

    pub fn execute(&self) -> Result<()> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        run(self.program, &args)
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.program, self.args.join(" "))
    }
}

/// Run a command, discarding its output.
pub fn run(program: &str, args: &[&str]) -> Result<()> {
    capture(program, args).map(|_| ())
}

/// Run a command and return its stdout.
pub fn output(program: &str, args: &[&str]) -> Result<String> {
    capture(program, args)
}

/// True if the command ran and exited zero. Used for existence probes
/// where a failure is an answer, not an error.
pub fn probe(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn capture(program: &str, args: &[&str]) -> Result<String> {
    debug!("exec: {} {}", program, args.join(" "));
    let out = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to execute {}", program))?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        bail!(
            "`{} {}` failed: {}",
            program,
            args.join(" "),
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&out.stdout).into_owned())
}
