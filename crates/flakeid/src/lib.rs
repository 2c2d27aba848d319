#![doc = include_str!("../README.md")]

mod business;
mod error;
mod generator;
mod id;
mod layout;
mod obfuscation;
mod time;

pub use crate::business::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::layout::*;
pub use crate::obfuscation::*;
pub use crate::time::*;
