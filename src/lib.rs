#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod alias;
pub mod bookmark;
pub mod error;
pub mod keyed_archive;
pub mod util;
