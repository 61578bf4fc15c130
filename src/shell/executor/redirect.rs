use std::os::fd::RawFd;

use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};

use crate::shell::error::ShellError;
use crate::shell::parser::CommandLine;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputTarget<'a> {
    pub path: &'a str,
    pub append: bool,
}

impl OutputTarget<'_> {
    fn flags(&self) -> OFlag {
        let mode = if self.append {
            OFlag::O_APPEND
        } else {
            OFlag::O_TRUNC
        };
        OFlag::O_WRONLY | OFlag::O_CREAT | mode
    }
}

/// 某一个阶段要应用的重定向
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Redirections<'a> {
    pub input: Option<&'a str>,
    pub output: Option<OutputTarget<'a>>,
}

impl<'a> Redirections<'a> {
    pub fn for_command(command: &'a CommandLine) -> Self {
        Self {
            input: command.input_file.as_deref(),
            output: command.output_file.as_deref().map(|path| OutputTarget {
                path,
                append: command.append,
            }),
        }
    }

    /// 管道写端：stdout 已经接到管道上，只保留输入重定向
    pub fn writer_side(self) -> Self {
        Self {
            output: None,
            ..self
        }
    }

    /// 管道读端：stdin 已经接到管道上，只保留输出重定向
    pub fn reader_side(self) -> Self {
        Self {
            input: None,
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none()
    }

    /// 打开文件并绑定到当前进程的 stdin/stdout。
    ///
    /// 只在 fork 之后、exec 之前的子进程里调用；失败时由调用方终止子进程。
    pub fn apply(&self) -> Result<(), ShellError> {
        if let Some(path) = self.input {
            rebind(path, OFlag::O_RDONLY, libc::STDIN_FILENO)?;
        }
        if let Some(output) = &self.output {
            rebind(output.path, output.flags(), libc::STDOUT_FILENO)?;
        }
        Ok(())
    }
}

fn rebind(path: &str, flags: OFlag, target: RawFd) -> Result<(), ShellError> {
    let fd = open(path, flags, Mode::from_bits_truncate(0o644)).map_err(|source| {
        ShellError::Open {
            path: path.to_string(),
            source,
        }
    })?;
    if fd == target {
        return Ok(());
    }

    let bound = dup2(fd, target).map_err(ShellError::Dup);
    let _ = close(fd);
    bound.map(drop)
}
