use std::str::SplitWhitespace;

/// 一个以空白分隔的词法单元。运算符只在独立出现时识别，`file>out` 仍是普通单词。
#[derive(Debug, PartialEq, Clone)]
pub enum Token<'a> {
    Word(&'a str),
    Pipe,
    Redirect(RedirectOp),
    Background,
    EOF,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RedirectOp {
    Input,  // <
    Output, // >
    Append, // >>
}

pub struct Lexer<'a> {
    input: SplitWhitespace<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.split_whitespace(),
        }
    }

    pub fn next_token(&mut self) -> Token<'a> {
        match self.input.next() {
            None => Token::EOF,
            Some(word) => classify(word),
        }
    }
}

impl<'a> Token<'a> {
    /// 词法单元的原始文本，EOF 为 None
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Token::Word(word) => Some(*word),
            Token::Pipe => Some("|"),
            Token::Background => Some("&"),
            Token::Redirect(RedirectOp::Input) => Some("<"),
            Token::Redirect(RedirectOp::Output) => Some(">"),
            Token::Redirect(RedirectOp::Append) => Some(">>"),
            Token::EOF => None,
        }
    }
}

fn classify(word: &str) -> Token<'_> {
    match word {
        "|" => Token::Pipe,
        "&" => Token::Background,
        "<" => Token::Redirect(RedirectOp::Input),
        ">" => Token::Redirect(RedirectOp::Output),
        ">>" => Token::Redirect(RedirectOp::Append),
        _ => Token::Word(word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_command() {
        let mut lexer = Lexer::new("ls -l");
        assert_eq!(lexer.next_token(), Token::Word("ls"));
        assert_eq!(lexer.next_token(), Token::Word("-l"));
        assert_eq!(lexer.next_token(), Token::EOF);
        assert_eq!(lexer.next_token(), Token::EOF);
    }

    #[test]
    fn test_pipe() {
        let mut lexer = Lexer::new("ls | grep foo");
        assert_eq!(lexer.next_token(), Token::Word("ls"));
        assert_eq!(lexer.next_token(), Token::Pipe);
        assert_eq!(lexer.next_token(), Token::Word("grep"));
        assert_eq!(lexer.next_token(), Token::Word("foo"));
        assert_eq!(lexer.next_token(), Token::EOF);
    }

    #[test]
    fn test_redirections() {
        let mut lexer = Lexer::new("sort < in.txt >> out.txt &");
        assert_eq!(lexer.next_token(), Token::Word("sort"));
        assert_eq!(lexer.next_token(), Token::Redirect(RedirectOp::Input));
        assert_eq!(lexer.next_token(), Token::Word("in.txt"));
        assert_eq!(lexer.next_token(), Token::Redirect(RedirectOp::Append));
        assert_eq!(lexer.next_token(), Token::Word("out.txt"));
        assert_eq!(lexer.next_token(), Token::Background);
        assert_eq!(lexer.next_token(), Token::EOF);
    }

    #[test]
    fn test_operators_must_stand_alone() {
        let mut lexer = Lexer::new("echo hi>out a|b x&");
        assert_eq!(lexer.next_token(), Token::Word("echo"));
        assert_eq!(lexer.next_token(), Token::Word("hi>out"));
        assert_eq!(lexer.next_token(), Token::Word("a|b"));
        assert_eq!(lexer.next_token(), Token::Word("x&"));
        assert_eq!(lexer.next_token(), Token::EOF);
    }

    #[test]
    fn test_token_text() {
        assert_eq!(Token::Redirect(RedirectOp::Append).text(), Some(">>"));
        assert_eq!(Token::Word("x").text(), Some("x"));
        assert_eq!(Token::EOF.text(), None);
    }

    #[test]
    fn test_mixed_whitespace() {
        let mut lexer = Lexer::new("  echo\t hello \n");
        assert_eq!(lexer.next_token(), Token::Word("echo"));
        assert_eq!(lexer.next_token(), Token::Word("hello"));
        assert_eq!(lexer.next_token(), Token::EOF);
        assert_eq!(Lexer::new(" \t ").next_token(), Token::EOF);
    }
}
