use log::debug;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::shell::error::ShellError;

extern "C" fn handle_sigint(_: libc::c_int) {
    // 信号处理函数里只能用异步信号安全的调用
    let newline = b"\n";
    unsafe {
        libc::write(libc::STDOUT_FILENO, newline.as_ptr().cast(), newline.len());
    }
}

/// 进程级信号配置。
///
/// 只能通过 [`SignalPolicy::install`] 获得，启动时安装一次，之后不再修改；
/// 持有它即表示以下规则已经生效：
///
/// - `SIGINT` 只打印一个换行，解释器继续运行
/// - `SIGCHLD` 被忽略，系统自动回收子进程，不会留下僵尸进程
///
/// 唯一的例外是 fork 出来的子进程在 exec 之前调用 [`SignalPolicy::reset_in_child`]。
#[derive(Debug)]
pub struct SignalPolicy {
    _installed: (),
}

impl SignalPolicy {
    pub fn install() -> Result<Self, ShellError> {
        let interrupt = SigAction::new(
            SigHandler::Handler(handle_sigint),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        let discard_children = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());

        unsafe {
            sigaction(Signal::SIGINT, &interrupt).map_err(ShellError::Signal)?;
            sigaction(Signal::SIGCHLD, &discard_children).map_err(ShellError::Signal)?;
        }
        debug!("信号策略已安装: SIGINT 换行, SIGCHLD 忽略");

        Ok(Self { _installed: () })
    }

    /// 在子进程中恢复默认信号处理，必须在 exec 之前调用，不影响父进程。
    ///
    /// `SIGCHLD` 的忽略状态会跨 exec 保留，这里一并恢复，
    /// 否则新程序自己 wait 子进程时会拿不到退出状态。
    /// Rust 运行时启动时忽略了 `SIGPIPE`，同理也要恢复。
    pub fn reset_in_child(&self) -> Result<(), ShellError> {
        let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
        unsafe {
            sigaction(Signal::SIGINT, &default).map_err(ShellError::Signal)?;
            sigaction(Signal::SIGCHLD, &default).map_err(ShellError::Signal)?;
            sigaction(Signal::SIGPIPE, &default).map_err(ShellError::Signal)?;
        }
        Ok(())
    }
}
