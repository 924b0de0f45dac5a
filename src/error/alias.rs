/*!
 Errors that can happen when decoding Alias records.
*/

use std::{
    array::TryFromSliceError,
    fmt::{Display, Formatter, Result},
};

use crate::error::reader::ReaderError;

/// Errors that can happen when decoding Alias records
#[derive(Debug)]
pub enum AliasError {
    /// A read would end past the end of the buffer: `(attempted end, buffer length)`
    OutOfBounds(usize, usize),
    SliceError(TryFromSliceError),
    /// The version byte names a layout this parser does not know
    UnsupportedVersion(u16),
    /// The field table ended without its `0xFFFF` terminator tag
    MissingTerminator,
    /// Embedded aliases were nested more deeply than the parser will follow
    RecursionLimit(usize),
}

impl Display for AliasError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            AliasError::OutOfBounds(idx, len) => {
                write!(fmt, "Index {idx:x} is outside of range {len:x}!")
            }
            AliasError::SliceError(why) => write!(fmt, "Unable to slice source buffer: {why}"),
            AliasError::UnsupportedVersion(version) => {
                write!(fmt, "Unsupported alias version: {version}")
            }
            AliasError::MissingTerminator => {
                write!(fmt, "Field table ended without a terminator tag!")
            }
            AliasError::RecursionLimit(depth) => {
                write!(fmt, "Embedded alias data nested too deeply: {depth}")
            }
        }
    }
}

impl From<ReaderError> for AliasError {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::OutOfBounds(idx, len) => AliasError::OutOfBounds(idx, len),
            ReaderError::SliceError(why) => AliasError::SliceError(why),
        }
    }
}
