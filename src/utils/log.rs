use crate::utils::config::Config;
use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{self, File};
use std::io::{self, Write};
use std::process;

fn parse_level(level: &str) -> LevelFilter {
    match level {
        level if level.eq_ignore_ascii_case("error") => LevelFilter::Error,
        level if level.eq_ignore_ascii_case("warn") => LevelFilter::Warn,
        level if level.eq_ignore_ascii_case("info") => LevelFilter::Info,
        level if level.eq_ignore_ascii_case("debug") => LevelFilter::Debug,
        level if level.eq_ignore_ascii_case("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn open_log_file(config: &Config) -> io::Result<File> {
    fs::create_dir_all(&config.logger_dir)?;
    let date = Local::now().format("%Y-%m-%d");
    let log_file = config.logger_dir.join(format!("{}_{}.log", config.name, date));
    File::options().create(true).append(true).open(log_file)
}

/// 初始化日志。stdout 留给子进程使用，日志只写文件（可选同时写 stderr）。
pub fn init_logger(config: &Config) {
    let mut level = parse_level(&config.logger_level);

    let mut writers: Vec<Box<dyn Write + Send + Sync>> = Vec::new();
    let mut file_error = None;
    match open_log_file(config) {
        Ok(file) => writers.push(Box::new(file)),
        Err(e) => file_error = Some(e),
    }
    if config.logger_stderr || writers.is_empty() {
        writers.push(Box::new(io::stderr()));
    }
    // 日志文件不可用时只把警告以上输出到 stderr，避免刷屏
    if file_error.is_some() && !config.logger_stderr {
        level = level.min(LevelFilter::Warn);
    }

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[PID:{}][{}] {} - {}",
                process::id(),
                record.level(),
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(MultiWriter { writers })))
        .filter(Some(config.name.as_str()), level)
        .filter(None, LevelFilter::Warn)
        .init();

    if let Some(e) = file_error {
        log::warn!("无法创建日志文件 {}: {}", config.logger_dir.display(), e);
    }
    for warning in &config.warnings {
        log::warn!("{}", warning);
    }
    log::debug!("日志级别设置为: {}", level);
}

struct MultiWriter {
    writers: Vec<Box<dyn Write + Send + Sync>>,
}

impl Write for MultiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for writer in &mut self.writers {
            writer.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for writer in &mut self.writers {
            writer.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("warn"), LevelFilter::Warn);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }

    #[test]
    fn test_multi_writer_fans_out() {
        let mut writers: Vec<Box<dyn Write + Send + Sync>> = Vec::new();
        writers.push(Box::new(Vec::<u8>::new()));
        writers.push(Box::new(io::sink()));
        let mut writer = MultiWriter { writers };
        assert_eq!(writer.write(b"hello").ok(), Some(5));
        assert!(writer.flush().is_ok());
    }
}
