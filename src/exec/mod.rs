// src/exec/mod.rs

pub mod backend;
pub mod command;

pub use backend::{CommandRunner, ExecError, Invocation, InvocationStatus};
pub use command::ShellRunner;
