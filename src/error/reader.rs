/*!
 Errors that can happen when reading fixed-width data out of a byte buffer.
*/

use std::{
    array::TryFromSliceError,
    fmt::{Display, Formatter, Result},
};

/// Errors that can happen when reading fixed-width data out of a byte buffer
#[derive(Debug)]
pub enum ReaderError {
    /// A read would end past the end of the buffer: `(attempted end, buffer length)`
    OutOfBounds(usize, usize),
    SliceError(TryFromSliceError),
}

impl Display for ReaderError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            ReaderError::OutOfBounds(idx, len) => {
                write!(fmt, "Index {idx:x} is outside of range {len:x}!")
            }
            ReaderError::SliceError(why) => write!(fmt, "Unable to slice source buffer: {why}"),
        }
    }
}
