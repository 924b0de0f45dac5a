/*!
 Contains logic and data structures used to materialize `NSKeyedArchiver`
 object graphs.

 ## Overview

 `NSKeyedArchiver` stores an object graph inside an ordinary Property List:
 a flat `$objects` table holds every archived value, and UID references knit
 the table into a graph that may contain cycles. This module resolves a
 parsed archive dictionary into owned Rust values, decoding the common
 Foundation classes and preserving everything else rather than failing.

 Recognition and resolution are separate phases: [`parser::is_keyed_archive`]
 classifies a candidate dictionary without error, and
 [`parser::ArchiveReader`] materializes one that was recognized.
*/

pub mod models;
pub mod parser;
