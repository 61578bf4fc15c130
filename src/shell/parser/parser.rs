use log::warn;

use super::ast::CommandLine;
use super::lexer::{Lexer, RedirectOp, Token};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token<'a>,
    max_args: usize,
}

impl<'a> Parser<'a> {
    pub fn with_max_args(input: &'a str, max_args: usize) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
            max_args,
        }
    }

    fn next_token(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    /// 解析整行。不会失败：缺少操作数的重定向被丢弃，超出上限的参数被丢弃。
    pub fn parse_command(&mut self) -> CommandLine {
        let mut command = CommandLine::default();
        // 第一次遇到 `|` 后永久切换到第二个阶段
        let mut second = false;

        loop {
            match self.current_token.clone() {
                Token::EOF => break,
                Token::Pipe => {
                    command.has_pipe = true;
                    second = true;
                }
                Token::Background => command.background = true,
                Token::Redirect(op) => {
                    // 紧随其后的任意词法单元都作为操作数，行尾则丢弃这次重定向
                    self.next_token();
                    match self.current_token.text() {
                        Some(filename) => Self::apply_redirection(&mut command, op, filename),
                        None => break,
                    }
                }
                Token::Word(word) => {
                    let target = if second {
                        &mut command.secondary_args
                    } else {
                        &mut command.primary_args
                    };
                    if target.len() < self.max_args {
                        target.push(word.to_string());
                    } else {
                        warn!("参数超出上限 {}，丢弃: {}", self.max_args, word);
                    }
                }
            }
            self.next_token();
        }

        command
    }

    fn apply_redirection(command: &mut CommandLine, op: RedirectOp, filename: &str) {
        match op {
            RedirectOp::Input => command.input_file = Some(filename.to_string()),
            RedirectOp::Output => {
                command.output_file = Some(filename.to_string());
                command.append = false;
            }
            RedirectOp::Append => {
                command.output_file = Some(filename.to_string());
                command.append = true;
            }
        }
    }
}
