use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, RawFd};

use log::{debug, info, warn};
use nix::sys::signal::{kill, Signal};
use nix::unistd::{close, dup2, execvp, fork, pipe, ForkResult, Pid};

use super::redirect::Redirections;
use super::wait;
use crate::shell::error::ShellError;
use crate::shell::parser::CommandLine;
use crate::shell::signals::SignalPolicy;

/// 一次执行的结果
#[derive(Debug, PartialEq)]
pub enum Launch {
    /// 前台执行，所有子进程都已结束
    Foreground,
    /// 后台执行，子进程交给信号策略回收
    Background(Vec<Pid>),
}

impl Launch {
    /// 后台启动时向用户报告的进程号
    pub fn report(&self) -> Option<String> {
        match self {
            Launch::Foreground => None,
            Launch::Background(pids) => match pids.as_slice() {
                [pid] => Some(format!("[Background pid {}]", pid)),
                pids => Some(format!(
                    "[Background pids {}]",
                    pids.iter()
                        .map(|pid| pid.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            },
        }
    }
}

/// 准备好 exec 的一个阶段。参数在 fork 之前转换好，子进程里不再分配。
struct Stage<'a> {
    argv: Vec<CString>,
    redirections: Redirections<'a>,
}

impl<'a> Stage<'a> {
    fn new(args: &[String], redirections: Redirections<'a>) -> Result<Self, ShellError> {
        if args.is_empty() {
            return Err(ShellError::EmptyCommand);
        }
        let argv = args
            .iter()
            .map(|arg| {
                CString::new(arg.as_str()).map_err(|_| ShellError::NulArgument(arg.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { argv, redirections })
    }

    fn program(&self) -> String {
        self.argv[0].to_string_lossy().into_owned()
    }

    /// 替换当前进程映像，只有失败时才会返回
    fn exec(&self) -> ShellError {
        match execvp(&self.argv[0], &self.argv) {
            Ok(never) => match never {},
            Err(source) => ShellError::Exec {
                program: self.program(),
                source,
            },
        }
    }
}

/// 子进程中把管道的一端接到标准流上，然后关闭两个原始描述符
#[derive(Debug, Clone, Copy)]
struct PipeBinding {
    end: RawFd,
    target: RawFd,
    pipe: [RawFd; 2],
}

impl PipeBinding {
    fn apply(&self) -> Result<(), ShellError> {
        if self.end != self.target {
            dup2(self.end, self.target).map_err(ShellError::Dup)?;
        }
        for fd in self.leftover_fds() {
            let _ = close(fd);
        }
        Ok(())
    }

    /// 绑定完成后需要关闭的管道端；启动时 0/1 已关闭的话，管道端可能正好就是目标
    fn leftover_fds(&self) -> impl Iterator<Item = RawFd> + '_ {
        self.pipe.into_iter().filter(move |&fd| fd != self.target)
    }
}

pub struct Executor {
    signals: SignalPolicy,
}

impl Executor {
    pub fn new(signals: SignalPolicy) -> Self {
        Self { signals }
    }

    /// 执行一条非内建命令。调用前内建命令分发器已经拒绝了它。
    pub fn execute(&self, command: &CommandLine) -> Result<Launch, ShellError> {
        if command.has_pipe {
            self.execute_pipeline(command)
        } else {
            self.execute_command(command)
        }
    }

    fn execute_command(&self, command: &CommandLine) -> Result<Launch, ShellError> {
        let stage = Stage::new(&command.primary_args, Redirections::for_command(command))?;
        debug!("执行外部命令: {:?}", command.primary_args);

        let pid = self.spawn(&stage, None)?;
        self.supervise(command.background, vec![pid])
    }

    fn execute_pipeline(&self, command: &CommandLine) -> Result<Launch, ShellError> {
        if command.secondary_args.is_empty() {
            return Err(ShellError::EmptyPipeStage);
        }
        let redirections = Redirections::for_command(command);
        let writer = Stage::new(&command.primary_args, redirections.writer_side())?;
        let reader = Stage::new(&command.secondary_args, redirections.reader_side())?;
        debug!(
            "执行管道: {:?} | {:?}",
            command.primary_args, command.secondary_args
        );

        let (read_end, write_end) = pipe().map_err(ShellError::Pipe)?;
        let fds = [read_end.as_raw_fd(), write_end.as_raw_fd()];

        let first = self.spawn(
            &writer,
            Some(PipeBinding {
                end: write_end.as_raw_fd(),
                target: libc::STDOUT_FILENO,
                pipe: fds,
            }),
        )?;
        let second = match self.spawn(
            &reader,
            Some(PipeBinding {
                end: read_end.as_raw_fd(),
                target: libc::STDIN_FILENO,
                pipe: fds,
            }),
        ) {
            Ok(pid) => pid,
            Err(e) => {
                abandon(first);
                return Err(e);
            }
        };

        // 父进程不读写管道，两个子进程各自持有需要的一端
        drop(read_end);
        drop(write_end);

        self.supervise(command.background, vec![first, second])
    }

    fn spawn(&self, stage: &Stage, binding: Option<PipeBinding>) -> Result<Pid, ShellError> {
        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                debug!("创建子进程 {}: {}", child, stage.program());
                if !stage.redirections.is_empty() {
                    debug!("子进程 {} 重定向: {:?}", child, stage.redirections);
                }
                Ok(child)
            }
            Ok(ForkResult::Child) => self.run_child(stage, binding),
            Err(e) => Err(ShellError::Fork(e)),
        }
    }

    /// fork 之后在子进程中运行，不会返回：要么 exec 成功，要么报告错误并退出
    fn run_child(&self, stage: &Stage, binding: Option<PipeBinding>) -> ! {
        let err = match self.prepare_child(stage, binding) {
            Ok(()) => stage.exec(),
            Err(e) => e,
        };
        // 子进程里不能 panic，也不能跑父进程的退出清理
        let _ = writeln!(io::stderr(), "{}", err);
        unsafe { libc::_exit(err.exit_code()) }
    }

    fn prepare_child(&self, stage: &Stage, binding: Option<PipeBinding>) -> Result<(), ShellError> {
        self.signals.reset_in_child()?;
        // 先接管道再做文件重定向，各阶段的重定向不会覆盖管道那一端
        if let Some(binding) = binding {
            binding.apply()?;
        }
        stage.redirections.apply()
    }

    fn supervise(&self, background: bool, pids: Vec<Pid>) -> Result<Launch, ShellError> {
        if background {
            info!("后台运行: {:?}", pids);
            return Ok(Launch::Background(pids));
        }
        wait::wait_all(&pids)?;
        Ok(Launch::Foreground)
    }
}

/// 第二个 fork 失败时清理已经启动的第一个阶段
fn abandon(pid: Pid) {
    warn!("第二个阶段启动失败，终止子进程 {}", pid);
    if let Err(e) = kill(pid, Signal::SIGKILL) {
        warn!("无法终止子进程 {}: {}", pid, e);
    }
    if let Err(e) = wait::wait_child(pid) {
        warn!("无法回收子进程 {}: {}", pid, e);
    }
}
