use dotenv::dotenv;
use rustyline::EditMode;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_MAX_ARGS: usize = 64;

pub struct Config {
    pub name: String,
    pub config_dir: PathBuf,
    pub theme: String,
    pub history_file: PathBuf,
    pub editor_mode: String,
    pub logger_level: String,
    pub logger_dir: PathBuf,
    pub logger_stderr: bool,
    pub max_args: usize,
    /// 加载过程中遇到的无效配置，日志初始化后再输出
    pub warnings: Vec<String>,
}

impl Config {
    fn get_config_dir() -> PathBuf {
        if let Ok(home) = env::var("HOME") {
            PathBuf::from(home).join(".config/minish")
        } else {
            PathBuf::from("tmp")
        }
    }

    fn default() -> Self {
        let config_dir = Self::get_config_dir();
        Config {
            name: String::from(env!("CARGO_PKG_NAME")),
            theme: String::from("default"),
            history_file: config_dir.join(".minish_history"),
            editor_mode: String::from("emacs"),
            logger_level: String::from("info"),
            logger_dir: config_dir.join("logs"),
            logger_stderr: false,
            max_args: DEFAULT_MAX_ARGS,
            warnings: Vec::new(),
            config_dir,
        }
    }

    pub fn new() -> Self {
        // 优先加载环境变量
        if cfg!(debug_assertions) {
            dotenv::from_filename(".env.development").ok();
        } else {
            dotenv().ok();
        }

        let mut config = Config::default();
        config.apply_vars(|key| env::var(key).ok());

        // 确保历史文件目录存在
        if let Some(parent) = config.history_file.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                config
                    .warnings
                    .push(format!("无法创建历史记录目录 {}: {}", parent.display(), e));
            }
        }

        config
    }

    /// 按变量名读取覆盖项，`lookup` 返回 None 表示未设置
    fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(theme) = lookup("MINISH_THEME") {
            self.theme = theme;
        }

        if let Some(editor) = lookup("MINISH_EDITOR") {
            self.editor_mode = editor;
        }

        if let Some(history) = lookup("MINISH_HISTORY") {
            self.history_file = expand_path(&history);
        }

        if let Some(level) = lookup("MINISH_LOG_LEVEL") {
            self.logger_level = level;
        }

        if let Some(dir) = lookup("MINISH_LOG_DIR") {
            self.logger_dir = expand_path(&dir);
        }

        if let Some(flag) = lookup("MINISH_LOG_STDERR") {
            self.logger_stderr = matches!(flag.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(max) = lookup("MINISH_MAX_ARGS") {
            match max.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.max_args = n,
                _ => self.warnings.push(format!(
                    "MINISH_MAX_ARGS 无效: {:?}，使用默认值 {}",
                    max, DEFAULT_MAX_ARGS
                )),
            }
        }
    }

    pub fn get_edit_mode(&self) -> EditMode {
        match self.editor_mode.to_lowercase().as_str() {
            "vi" => EditMode::Vi,
            _ => EditMode::Emacs,
        }
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}
