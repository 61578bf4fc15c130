//! 集成测试共用的辅助函数：每次运行使用独立的临时目录，
//! 同时作为 `HOME`、工作目录以及历史记录和日志的位置。

#![allow(dead_code)]
#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

pub use assert_cmd::Command;
use assert_cmd::cargo::CommandCargoExt;
use tempfile::TempDir;

pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create scratch directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// 规范化路径，与 shell 内 `getcwd` 的结果一致
    pub fn canonical(&self) -> PathBuf {
        self.dir
            .path()
            .canonicalize()
            .expect("failed to canonicalize scratch directory")
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.file(name)).expect("failed to read scratch file")
    }

    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.file(name), contents).expect("failed to write scratch file");
    }

    pub fn minish(&self) -> Command {
        let mut cmd = Command::cargo_bin("minish").expect("failed to find minish binary");
        for (key, value) in self.env() {
            cmd.env(key, value);
        }
        cmd.current_dir(self.path());
        cmd
    }

    /// 需要与运行中的进程交互时使用标准库的 Command
    pub fn minish_std(&self) -> StdCommand {
        let mut cmd = StdCommand::cargo_bin("minish").expect("failed to find minish binary");
        cmd.envs(self.env());
        cmd.current_dir(self.path());
        cmd
    }

    fn env(&self) -> Vec<(&'static str, String)> {
        let root = self.path().display().to_string();
        vec![
            ("HOME", root.clone()),
            ("MINISH_HISTORY", format!("{}/.minish_history", root)),
            ("MINISH_LOG_DIR", format!("{}/logs", root)),
            ("MINISH_THEME", "plain".to_string()),
        ]
    }
}
