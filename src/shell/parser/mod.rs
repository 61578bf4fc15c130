pub mod ast;
mod lexer;
mod parser;

pub use ast::CommandLine;
pub use parser::Parser;
