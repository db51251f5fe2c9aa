//! Main module for report conversion functionality

pub mod block;
pub mod cancel;
pub mod converting;
pub mod cursor;
pub mod error;
pub mod grammar;
pub mod input;
pub mod loader;
pub mod node;
pub mod sections;
pub mod segmenting;
pub mod span;
pub mod testing;
