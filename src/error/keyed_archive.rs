/*!
 Errors that can happen when materializing an `NSKeyedArchiver` object graph.
*/

use std::fmt::{Display, Formatter, Result};

/// Errors that can happen when materializing an `NSKeyedArchiver` object graph
#[derive(Debug)]
pub enum KeyedArchiveError {
    /// The dictionary does not have the structure of a keyed archive.
    /// This is a negative classification, not a parse failure; see
    /// [`is_keyed_archive`](crate::keyed_archive::parser::is_keyed_archive).
    NotAnArchive,
    /// `$version` names an archive format this parser does not know
    UnsupportedVersion(u64),
    /// A UID reference does not index a valid `$objects` slot: `(uid, table length)`
    InvalidUid(u64, usize),
}

impl Display for KeyedArchiveError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            KeyedArchiveError::NotAnArchive => {
                write!(fmt, "Dictionary is not an NSKeyedArchiver archive!")
            }
            KeyedArchiveError::UnsupportedVersion(version) => {
                write!(fmt, "Unsupported NSKeyedArchiver version: {version}")
            }
            KeyedArchiveError::InvalidUid(uid, len) => {
                write!(fmt, "UID {uid} does not index the object table of length {len}!")
            }
        }
    }
}
