use log::{debug, error, warn};
use std::io::{self, Write};

use crate::shell::builtins::{self, Flow};
use crate::shell::error::ShellError;
use crate::shell::executor::Executor;
use crate::shell::parser::Parser;
use crate::shell::readline::{ReadlineError, ReadlineManager};
use crate::shell::signals::SignalPolicy;
use crate::utils::config::Config;
use crate::utils::path::{current_dir, prompt_text};
use crate::utils::theme::Theme;

pub struct Shell<'a> {
    config: &'a Config,
    theme: Theme,
    readline: ReadlineManager<'a>,
    executor: Executor,
}

impl<'a> Shell<'a> {
    pub fn new(config: &'a Config, theme: Theme) -> Result<Self, ShellError> {
        // 信号策略在进入主循环前安装一次，之后由执行器持有
        let signals = SignalPolicy::install()?;
        Ok(Self {
            config,
            theme,
            readline: ReadlineManager::new(config)?,
            executor: Executor::new(signals),
        })
    }

    pub fn run(&mut self) -> Result<(), ShellError> {
        debug!("初始化 minish...");
        self.readline.load_history();

        let result = self.run_loop();
        self.readline.save_history();

        debug!("退出 minish...");
        result
    }

    fn run_loop(&mut self) -> Result<(), ShellError> {
        loop {
            if let Err(e) = io::stdout().flush() {
                warn!("刷新 stdout 失败: {}", e);
            }
            let prompt = (self.theme.prompt_style)(prompt_text(current_dir().as_deref()));

            match self.readline.readline(&prompt) {
                Ok(line) => {
                    if self.handle_input(&line) == Flow::Exit {
                        debug!("收到 exit 命令");
                        break;
                    }
                }
                Err(ReadlineError::Eof) => {
                    debug!("输入结束");
                    write_line(&mut io::stdout(), "");
                    break;
                }
                Err(ReadlineError::Interrupted) => {
                    warn!("接收到中断信号...");
                }
                Err(err) => {
                    error!("读取输入失败: {}", err);
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }

    fn handle_input(&mut self, line: &str) -> Flow {
        if line.trim().is_empty() {
            return Flow::Continue;
        }
        self.readline.add_history(line);

        let command = Parser::with_max_args(line, self.config.max_args).parse_command();
        debug!("解析结果: {:?}", command);

        if let Some(result) = builtins::try_builtin(&command, &mut io::stdout().lock()) {
            return match result {
                Ok(flow) => flow,
                Err(e) => {
                    self.report_error(&e);
                    Flow::Continue
                }
            };
        }

        match self.executor.execute(&command) {
            Ok(launch) => {
                if let Some(report) = launch.report() {
                    write_line(&mut io::stdout(), &(self.theme.notice_style)(report));
                }
            }
            Err(e) => self.report_error(&e),
        }
        Flow::Continue
    }

    fn report_error(&self, err: &ShellError) {
        error!("{}", err);
        write_line(&mut io::stderr(), &(self.theme.error_style)(err.to_string()));
    }
}

/// 输出一行给用户；终端或管道已关闭时只记日志，主循环照常继续
fn write_line(out: &mut dyn Write, text: &str) -> bool {
    match writeln!(out, "{}", text).and_then(|_| out.flush()) {
        Ok(()) => true,
        Err(e) => {
            warn!("输出失败: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_write_line_survives_closed_output() {
        assert!(!write_line(&mut ClosedPipe, "[Background pid 42]"));
    }

    #[test]
    fn test_write_line() {
        let mut out = Vec::new();
        assert!(write_line(&mut out, "[Background pid 42]"));
        assert_eq!(out, b"[Background pid 42]\n");
    }
}
