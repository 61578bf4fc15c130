use std::io;

use nix::errno::Errno;
use thiserror::Error;

use crate::shell::readline::ReadlineError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("pipe: {0}")]
    Pipe(#[source] Errno),

    #[error("fork: {0}")]
    Fork(#[source] Errno),

    #[error("{path}: {source}")]
    Open {
        path: String,
        #[source]
        source: Errno,
    },

    #[error("waitpid: {0}")]
    Wait(#[source] Errno),

    #[error("dup2: {0}")]
    Dup(#[source] Errno),

    #[error("{program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: Errno,
    },

    #[error("signal setup: {0}")]
    Signal(#[source] Errno),

    #[error("argument contains a NUL byte: {0:?}")]
    NulArgument(String),

    #[error("empty command")]
    EmptyCommand,

    #[error("syntax error: missing command after `|`")]
    EmptyPipeStage,

    #[error("{0}: missing argument")]
    MissingArgument(String),

    #[error("{name}: {source}")]
    Builtin {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Readline(#[from] ReadlineError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    /// 子进程因该错误退出时使用的状态码
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::Exec { source: Errno::ENOENT, .. } => 127,
            ShellError::Exec { .. } => 126,
            _ => 1,
        }
    }
}
