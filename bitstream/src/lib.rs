pub mod reader;

pub use reader::{BitReader, Error};
