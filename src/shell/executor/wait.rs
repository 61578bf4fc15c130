use std::fmt;

use log::{debug, error};
use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::sys::wait::WaitStatus as WS;
use nix::unistd::Pid;

use crate::shell::error::ShellError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    Exited(i32),
    Signaled(i32),
    /// SIGCHLD 被忽略时系统直接回收子进程，waitpid 以 ECHILD 返回，状态已丢失
    Discarded,
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildExit::Exited(code) => write!(f, "exited {}", code),
            ChildExit::Signaled(sig) => write!(f, "signaled {}", sig),
            ChildExit::Discarded => write!(f, "reaped"),
        }
    }
}

/// 终止状态返回 Some，停止/继续等中间状态返回 None
fn classify(status: WS) -> Option<ChildExit> {
    match status {
        WS::Exited(_, code) => Some(ChildExit::Exited(code)),
        WS::Signaled(_, sig, _core_dumped) => Some(ChildExit::Signaled(sig as i32)),
        _ => None,
    }
}

/// 阻塞直到指定子进程结束。
pub fn wait_child(pid: Pid) -> Result<ChildExit, ShellError> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => match classify(status) {
                Some(exit) => return Ok(exit),
                None => debug!("子进程 {} 状态变化: {:?}", pid, status),
            },
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => return Ok(ChildExit::Discarded),
            Err(e) => return Err(ShellError::Wait(e)),
        }
    }
}

/// 逐个等待所有子进程，顺序无关：先结束的进程会在轮到它时立即返回。
///
/// 这里不能用 `waitpid(-1)`：SIGCHLD 被忽略时它会一直阻塞到所有子进程
/// （包括后台进程）都结束。出错也会继续等待剩下的进程，最后返回第一个错误。
pub fn wait_all(pids: &[Pid]) -> Result<Vec<ChildExit>, ShellError> {
    let mut exits = Vec::with_capacity(pids.len());
    let mut first_error = None;

    for &pid in pids {
        match wait_child(pid) {
            Ok(exit) => {
                debug!("子进程 {} 结束: {}", pid, exit);
                exits.push(exit);
            }
            Err(e) => {
                error!("等待子进程 {} 失败: {}", pid, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(exits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;

    #[test]
    fn test_classify_terminal_states() {
        let pid = Pid::from_raw(42);
        assert_eq!(classify(WS::Exited(pid, 3)), Some(ChildExit::Exited(3)));
        assert_eq!(
            classify(WS::Signaled(pid, Signal::SIGKILL, false)),
            Some(ChildExit::Signaled(9))
        );
        assert_eq!(classify(WS::Stopped(pid, Signal::SIGSTOP)), None);
        assert_eq!(classify(WS::StillAlive), None);
    }

    #[test]
    fn test_wait_without_child() {
        // 不是本进程的子进程，waitpid 返回 ECHILD
        assert!(matches!(
            wait_child(Pid::from_raw(1)),
            Ok(ChildExit::Discarded)
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(ChildExit::Exited(0).to_string(), "exited 0");
        assert_eq!(ChildExit::Discarded.to_string(), "reaped");
    }
}
