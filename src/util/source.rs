/*!
 Provenance of a buffer handed to a decoder.

 A [`Source`] is carried for diagnostics only: it shows up in log output and
 is stamped on decoded records, but it never participates in decode logic.
*/

use std::fmt::{Display, Formatter, Result};

/// Where a buffer being decoded was extracted from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Source<'a> {
    /// Path of the file the buffer came from
    pub path: Option<&'a str>,
    /// Index of the value within the original plist structure
    pub index: Option<usize>,
}

impl<'a> Source<'a> {
    pub fn new(path: &'a str, index: usize) -> Self {
        Self {
            path: Some(path),
            index: Some(index),
        }
    }
}

impl Display for Source<'_> {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match (self.path, self.index) {
            (Some(path), Some(index)) => write!(fmt, "{path}[{index}]"),
            (Some(path), None) => write!(fmt, "{path}"),
            (None, Some(index)) => write!(fmt, "[{index}]"),
            (None, None) => write!(fmt, "<unknown source>"),
        }
    }
}
