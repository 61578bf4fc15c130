mod builtins;
mod error;
mod executor;
mod parser;
mod readline;
mod shell;
mod signals;

pub use shell::Shell;
