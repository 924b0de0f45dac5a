/*!
 Contains logic and data structures used to decode Bookmark data.

 ## Overview

 Bookmark data is the extensible successor to the Alias record, produced by
 `CFURLCreateBookmarkData` and stored in login items, sandbox containers,
 recent-document lists, and many other Property List values.

 ## Layout

 A little-endian header locates a data area holding typed item records and
 one or more tables of contents. Each table of contents groups the items
 describing one logical target; a bookmark for a file inside a disk image
 carries one group for the file and one for the image, and this decoder
 yields one record per group. Items embedding Alias payloads are decoded
 recursively.

 Format referenced from
 [Apple's BookmarkData — exposed](https://michaellynn.github.io/2015/10/24/apples-bookmarkdata-exposed/).
*/

pub mod models;
pub mod parser;
