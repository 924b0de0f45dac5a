/*!
 Errors that can happen when decoding Bookmark data.
*/

use std::{
    array::TryFromSliceError,
    fmt::{Display, Formatter, Result},
};

use crate::error::reader::ReaderError;

/// Errors that can happen when decoding Bookmark data
#[derive(Debug)]
pub enum BookmarkError {
    /// A read would end past the end of the buffer: `(attempted end, buffer length)`
    OutOfBounds(usize, usize),
    SliceError(TryFromSliceError),
    /// The buffer does not carry a Bookmark magic number
    NotRecognized,
    /// The container holds no table of contents, so no entry can resolve
    EmptyToc,
    /// The table of contents chain revisited an offset it already walked
    TocCycle(usize),
    /// A mandatory field's declared payload runs past the container: `(tag, attempted end, container length)`
    TruncatedMandatoryField(u32, usize, usize),
    /// Item records were nested more deeply than the parser will follow
    RecursionLimit(usize),
}

impl Display for BookmarkError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            BookmarkError::OutOfBounds(idx, len) => {
                write!(fmt, "Index {idx:x} is outside of range {len:x}!")
            }
            BookmarkError::SliceError(why) => write!(fmt, "Unable to slice source buffer: {why}"),
            BookmarkError::NotRecognized => write!(fmt, "Buffer is not bookmark data!"),
            BookmarkError::EmptyToc => write!(fmt, "Bookmark data contains no table of contents!"),
            BookmarkError::TocCycle(offset) => {
                write!(fmt, "Table of contents chain loops back to offset {offset:x}!")
            }
            BookmarkError::TruncatedMandatoryField(tag, end, len) => write!(
                fmt,
                "Mandatory field {tag:#x} runs to {end:x}, past the end of the container at {len:x}!"
            ),
            BookmarkError::RecursionLimit(depth) => {
                write!(fmt, "Bookmark item records nested too deeply: {depth}")
            }
        }
    }
}

impl From<ReaderError> for BookmarkError {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::OutOfBounds(idx, len) => BookmarkError::OutOfBounds(idx, len),
            ReaderError::SliceError(why) => BookmarkError::SliceError(why),
        }
    }
}
