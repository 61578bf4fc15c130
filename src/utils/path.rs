use std::env;

use log::error;

pub fn current_dir() -> Option<String> {
    let current_dir = match env::current_dir() {
        Ok(x) => x,
        Err(e) => {
            error!("minish: PROMPT: env current_dir error: {}", e);
            return None;
        }
    };
    match current_dir.to_str() {
        Some(x) => Some(x.to_string()),
        None => {
            error!("minish: PROMPT: to_str error");
            None
        }
    }
}

/// 提示符文本：`<cwd> mini-shell> `，取不到工作目录时只显示 `mini-shell> `
pub fn prompt_text(cwd: Option<&str>) -> String {
    match cwd {
        Some(dir) => format!("{} mini-shell> ", dir),
        None => String::from("mini-shell> "),
    }
}
