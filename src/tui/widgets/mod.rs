//! TUI widget components.

pub mod text_field;

pub use text_field::TextField;
