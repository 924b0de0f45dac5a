/*!
 Data structures produced by decoding Bookmark data.
*/

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::alias::models::AliasRecord;

/// A sandbox extension granted to the bookmark's creator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxExtension {
    /// UUID identifying the extension
    pub uuid: String,
    /// Path the extension grants access to
    pub path: String,
}

/// A single typed item payload from the bookmark's data area.
///
/// The high-order byte of an item's 32-bit data type selects the variant;
/// payloads this decoder cannot interpret are preserved as [`ItemData::Bytes`].
#[derive(Debug, Clone, PartialEq)]
pub enum ItemData {
    /// UTF-8 string or CFURL text
    String(String),
    /// Raw bytes, up to the caller to interpret
    Bytes(Vec<u8>),
    /// Signed integer types are coerced into this container
    Integer(i64),
    /// Unsigned integers too large for [`ItemData::Integer`]
    Unsigned(u64),
    /// Single or double precision floats
    Real(f64),
    /// Mac absolute time timestamp
    Date(DateTime<Utc>),
    Bool(bool),
    /// Array of items, stored in the data area as pointers
    Array(Vec<ItemData>),
    /// Dictionary of items, stored in the data area as pointer pairs
    Dict(Vec<(ItemData, ItemData)>),
    Null,
}

impl ItemData {
    /// Coerce a numeric item to a signed integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ItemData::Integer(value) => Some(*value),
            ItemData::Unsigned(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    /// Coerce a numeric item to a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ItemData::Real(value) => Some(*value),
            ItemData::Integer(value) => Some(*value as f64),
            ItemData::Unsigned(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// Text form of a scalar item, used when joining array components
    pub(crate) fn display_text(&self) -> Option<String> {
        match self {
            ItemData::String(text) => Some(text.clone()),
            ItemData::Integer(value) => Some(value.to_string()),
            ItemData::Unsigned(value) => Some(value.to_string()),
            ItemData::Real(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

/// One decoded bookmark target: the items of a single table-of-contents
/// group. Fields the group does not carry are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkRecord {
    /// Position of the source buffer in the structure it was extracted from
    pub source_index: Option<usize>,
    /// Nesting depth recorded in the group's table of contents
    pub toc_depth: u32,
    /// Full URL of the target
    pub url_string: Option<String>,
    /// Path components of the target, joined with `/`
    pub path: Option<String>,
    /// Catalog node IDs along the target's path, joined with `/`
    pub cnid_path: Option<String>,
    /// Descriptions of the target's resource property flags
    pub target_flags: Option<String>,
    /// Name of the target file or directory
    pub target_name: Option<String>,
    /// Catalog node ID of the target
    pub target_cnid: Option<i64>,
    /// Creation date of the target
    pub target_creation_date: Option<DateTime<Utc>>,
    /// Component depths into the volume, rendered as text
    pub volume_info_depths: Option<String>,
    /// Path of the volume the target lives on
    pub volume_path: Option<String>,
    /// URL of the volume
    pub volume_url: Option<String>,
    /// Name of the volume
    pub volume_name: Option<String>,
    /// UUID of the volume
    pub volume_uuid: Option<String>,
    /// Capacity of the volume in bytes
    pub volume_size: Option<i64>,
    /// Creation date of the volume
    pub volume_creation_date: Option<DateTime<Utc>>,
    /// Descriptions of the volume's property flags
    pub volume_flags: Option<String>,
    /// Whether the volume was the boot volume when the bookmark was made
    pub volume_was_boot: Option<bool>,
    /// Depth of the disk image chain when the target lives inside one
    pub disk_image_depth: Option<i64>,
    /// Mount point of the volume
    pub volume_mount_point: Option<String>,
    /// Short name of the user that created the bookmark
    pub user_name: Option<String>,
    /// UID of that user
    pub user_uid: Option<i64>,
    /// Display name of the target
    pub display_name: Option<String>,
    /// When the bookmark itself was created
    pub bookmark_creation_date: Option<DateTime<Utc>>,
    /// Read-write sandbox extension, if granted
    pub sandbox_rw: Option<SandboxExtension>,
    /// Read-only sandbox extension, if granted
    pub sandbox_ro: Option<SandboxExtension>,
    /// Alias records decoded from embedded alias payloads
    pub embedded_aliases: Vec<AliasRecord>,
    /// Payloads of reserved, unknown, or undecodable items, kept verbatim
    pub opaque_fields: BTreeMap<u32, Vec<u8>>,
    /// Diagnostics attached while decoding, e.g. skipped oversized items
    pub notes: Vec<String>,
}

impl BookmarkRecord {
    pub(crate) fn new(source_index: Option<usize>, toc_depth: u32) -> Self {
        Self {
            source_index,
            toc_depth,
            url_string: None,
            path: None,
            cnid_path: None,
            target_flags: None,
            target_name: None,
            target_cnid: None,
            target_creation_date: None,
            volume_info_depths: None,
            volume_path: None,
            volume_url: None,
            volume_name: None,
            volume_uuid: None,
            volume_size: None,
            volume_creation_date: None,
            volume_flags: None,
            volume_was_boot: None,
            disk_image_depth: None,
            volume_mount_point: None,
            user_name: None,
            user_uid: None,
            display_name: None,
            bookmark_creation_date: None,
            sandbox_rw: None,
            sandbox_ro: None,
            embedded_aliases: Vec::new(),
            opaque_fields: BTreeMap::new(),
            notes: Vec::new(),
        }
    }
}
