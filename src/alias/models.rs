/*!
 Data structures produced by decoding Alias records.
*/

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result},
};

use chrono::{DateTime, Utc};

/// Whether an alias points at a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    File,
    Directory,
}

impl TargetKind {
    /// The header stores the kind as a 16-bit field; zero means a file
    pub(crate) fn from_kind_field(kind: u16) -> Self {
        if kind == 0 {
            Self::File
        } else {
            Self::Directory
        }
    }
}

impl Display for TargetKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result {
        match self {
            TargetKind::File => write!(fmt, "file"),
            TargetKind::Directory => write!(fmt, "directory"),
        }
    }
}

/// A decoded Alias record: the fixed header fields merged with the tagged
/// field table that follows them.
///
/// Named fields repeat some header data (names, dates) at higher
/// resolution; where both are present, the named field value wins. Fields
/// the buffer does not carry are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasRecord {
    /// Version of the record layout, 2 or 3
    pub version: u16,
    /// Whether the alias points at a file or a directory
    pub kind: TargetKind,
    /// Name of the volume the target lives on
    pub volume_name: Option<String>,
    /// Creation date of that volume
    pub volume_creation_date: Option<DateTime<Utc>>,
    /// Filesystem signature of the volume, e.g. `H+`
    pub signature: Option<String>,
    /// Description of the filesystem named by the signature
    pub filesystem_description: &'static str,
    /// Disk type field, only present in version 2 records
    pub disk_type: Option<u16>,
    /// Description of the disk type
    pub disk_type_description: Option<&'static str>,
    /// Catalog node ID of the target's parent directory
    pub parent_cnid: Option<u32>,
    /// Catalog node ID of the target itself
    pub target_cnid: Option<u32>,
    /// Name of the target file or directory
    pub target_name: Option<String>,
    /// Creation date of the target
    pub target_creation_date: Option<DateTime<Utc>>,
    /// Creator code of the target, only present in version 2 records
    pub application: Option<String>,
    /// Type code of the target, only present in version 2 records
    pub target_type: Option<String>,
    /// Directory depth from the alias to the common root, version 2 only
    pub alias_to_root_depth: Option<u16>,
    /// Directory depth from the common root to the target, version 2 only
    pub root_to_target_depth: Option<u16>,
    /// Descriptions of the volume attribute flags that are set
    pub volume_flags: Option<String>,
    /// Name of the directory containing the target
    pub folder_name: Option<String>,
    /// Catalog node IDs along the path, joined with `/`
    pub cnid_path: Option<String>,
    /// Colon-separated HFS path to the target
    pub hfs_path: Option<String>,
    /// Name of the volume driver
    pub driver_name: Option<String>,
    /// POSIX path to the target, including the mount point when recorded
    pub path: Option<String>,
    /// POSIX path the volume is mounted at
    pub volume_mount_point: Option<String>,
    /// Field table entries with tags this parser does not know, kept verbatim
    pub unknown_fields: BTreeMap<u16, Vec<u8>>,
    /// Diagnostics attached while decoding, e.g. an embedded alias that failed
    pub notes: Vec<String>,
    /// Position of the source buffer in the structure it was extracted from
    pub source_index: Option<usize>,
}

impl AliasRecord {
    pub(crate) fn new(version: u16, kind: TargetKind) -> Self {
        Self {
            version,
            kind,
            volume_name: None,
            volume_creation_date: None,
            signature: None,
            filesystem_description: "Unknown",
            disk_type: None,
            disk_type_description: None,
            parent_cnid: None,
            target_cnid: None,
            target_name: None,
            target_creation_date: None,
            application: None,
            target_type: None,
            alias_to_root_depth: None,
            root_to_target_depth: None,
            volume_flags: None,
            folder_name: None,
            cnid_path: None,
            hfs_path: None,
            driver_name: None,
            path: None,
            volume_mount_point: None,
            unknown_fields: BTreeMap::new(),
            notes: Vec::new(),
            source_index: None,
        }
    }
}
