use std::env;
use std::io::Write;

use log::debug;

use crate::shell::error::ShellError;
use crate::shell::parser::CommandLine;

/// 内建命令执行后主循环的走向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// 在解释器自身进程中执行内建命令，从不 fork。
///
/// 返回 `None` 表示不是内建命令，交给执行器；`Some(Err(..))` 仍算已处理，
/// 由调用方报告错误后继续循环。空命令视为已处理。
pub fn try_builtin(command: &CommandLine, out: &mut dyn Write) -> Option<Result<Flow, ShellError>> {
    let Some(program) = command.program() else {
        return Some(Ok(Flow::Continue));
    };

    let result = match program {
        "cd" | "go" => builtin_cd(command),
        "pwd" => builtin_pwd(out),
        "exit" => return Some(Ok(Flow::Exit)),
        _ => return None,
    };
    debug!("执行内建命令: {:?}", command.primary_args);
    Some(result.map(|_| Flow::Continue))
}

fn builtin_cd(command: &CommandLine) -> Result<(), ShellError> {
    let dir = command
        .primary_args
        .get(1)
        .ok_or_else(|| ShellError::MissingArgument("cd/go".to_string()))?;
    env::set_current_dir(dir).map_err(|source| ShellError::Builtin {
        name: "cd/go".to_string(),
        source,
    })
}

fn builtin_pwd(out: &mut dyn Write) -> Result<(), ShellError> {
    let cwd = env::current_dir().map_err(|source| ShellError::Builtin {
        name: "pwd".to_string(),
        source,
    })?;
    writeln!(out, "{}", cwd.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> CommandLine {
        CommandLine {
            primary_args: args.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn run(args: &[&str]) -> (Option<Result<Flow, ShellError>>, String) {
        let mut out = Vec::new();
        let result = try_builtin(&command(args), &mut out);
        (result, String::from_utf8_lossy(&out).into_owned())
    }

    #[test]
    fn test_empty_command_is_handled() {
        assert!(matches!(run(&[]).0, Some(Ok(Flow::Continue))));
    }

    #[test]
    fn test_external_command_falls_through() {
        assert!(run(&["ls", "-l"]).0.is_none());
        assert!(run(&["cdx"]).0.is_none());
    }

    #[test]
    fn test_exit() {
        assert!(matches!(run(&["exit"]).0, Some(Ok(Flow::Exit))));
    }

    #[test]
    fn test_pwd_prints_current_dir() {
        let (result, out) = run(&["pwd"]);
        assert!(matches!(result, Some(Ok(Flow::Continue))));
        let cwd = env::current_dir().map(|p| p.display().to_string()).unwrap_or_default();
        assert_eq!(out.trim_end(), cwd);
    }

    #[test]
    fn test_cd_missing_argument_keeps_cwd() {
        let before = env::current_dir().ok();
        for name in ["cd", "go"] {
            match run(&[name]).0 {
                Some(Err(e @ ShellError::MissingArgument(_))) => {
                    assert_eq!(e.to_string(), "cd/go: missing argument")
                }
                other => panic!("expected missing argument, got {:?}", other),
            }
        }
        assert_eq!(env::current_dir().ok(), before);
    }

    #[test]
    fn test_cd_nonexistent_keeps_cwd() {
        let before = env::current_dir().ok();
        let result = run(&["go", "/nonexistent/minish/dir"]).0;
        assert!(matches!(result, Some(Err(ShellError::Builtin { .. }))));
        assert_eq!(env::current_dir().ok(), before);
    }
}
