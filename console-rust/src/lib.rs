mod command;
mod console;
pub mod render;
mod settings;

pub use command::{split_line, ConsoleCommand, ConsoleLine};
pub use console::{Console, Step};
pub use settings::Cli;
