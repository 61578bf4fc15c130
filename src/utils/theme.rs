use colored::Colorize;

pub struct Theme {
    pub prompt_style: Box<dyn Fn(String) -> String>,
    pub error_style: Box<dyn Fn(String) -> String>,
    pub notice_style: Box<dyn Fn(String) -> String>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            prompt_style: Box::new(|s| s.bright_cyan().to_string()),
            error_style: Box::new(|s| s.bright_red().to_string()),
            notice_style: Box::new(|s| s.bright_magenta().to_string()),
        }
    }
}

impl Theme {
    pub fn plain() -> Self {
        Theme {
            prompt_style: Box::new(|s| s),
            error_style: Box::new(|s| s),
            notice_style: Box::new(|s| s),
        }
    }

    pub fn load_theme(theme_name: &str) -> Theme {
        match theme_name {
            "plain" | "none" => Theme::plain(),
            "dark" => Theme {
                prompt_style: Box::new(|s| s.bright_purple().to_string()),
                error_style: Box::new(|s| s.red().to_string()),
                notice_style: Box::new(|s| s.bright_blue().to_string()),
            },
            _ => Theme::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_theme_is_identity() {
        let theme = Theme::load_theme("plain");
        assert_eq!((theme.prompt_style)("x> ".to_string()), "x> ");
        assert_eq!((theme.error_style)("boom".to_string()), "boom");
    }
}
