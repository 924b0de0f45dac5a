/*!
 Contains logic and data structures used to decode Alias records.

 ## Overview

 An Alias is the legacy macOS structure describing a dynamically-resolvable
 link to a file or directory. It is commonly found embedded in Property
 List values (login items, recent documents, Finder sidebar entries) and
 inside Bookmark data.

 ## Layout

 A record starts with a common 8-byte header whose version field selects
 one of two fixed layouts (version 2 or 3), followed by a table of tagged
 variable-length fields terminated by a sentinel tag. The table can carry a
 complete embedded Alias record, which this parser decodes recursively.
*/

pub mod models;
pub mod parser;
