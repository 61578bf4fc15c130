mod executor;
mod redirect;
mod wait;

pub use executor::Executor;
