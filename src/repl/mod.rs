//! Interactive editing of a project file, built with the `repl` feature

pub mod interactive;

pub use interactive::run_repl;
