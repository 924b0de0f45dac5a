/*!
 Contains logic to decode Bookmark data.

 Format referenced from
 [Apple's BookmarkData — exposed](https://michaellynn.github.io/2015/10/24/apples-bookmarkdata-exposed/)
 and the property flag definitions in
 [`CFURLPriv.h`](https://opensource.apple.com/source/CF/CF-1153.18/CFURLPriv.h.auto.html).
*/

use log::{debug, warn};

use crate::{
    alias::parser::AliasReader,
    bookmark::models::{BookmarkRecord, ItemData, SandboxExtension},
    error::bookmark::BookmarkError,
    util::{dates, flags::describe_flags, reader::BufferReader, source::Source},
};

/// Container magic for bookmark data
const MAGIC_BOOK: &[u8; 4] = b"book";
/// Container magic used by alias files written in the bookmark format
const MAGIC_ALIS: &[u8; 4] = b"alis";

/// Full URL of the target
const TAG_URL_STRING: u32 = 0x1003;
/// Array of target path components. Mandatory: a bookmark whose path cannot
/// be read is rejected as a whole
const TAG_PATH: u32 = 0x1004;
/// Array of catalog node IDs along the target path
const TAG_CNID_PATH: u32 = 0x1005;
/// Resource property flags: three 8-byte integers, flags then flag validity
const TAG_TARGET_FLAGS: u32 = 0x1010;
/// Name of the target
const TAG_TARGET_NAME: u32 = 0x1020;
/// Catalog node ID of the target
const TAG_TARGET_CNID: u32 = 0x1030;
/// Creation date of the target
const TAG_TARGET_CREATION_DATE: u32 = 0x1040;
/// Array of component depths into the volume
const TAG_VOLUME_INFO_DEPTHS: u32 = 0x2000;
/// Path of the volume
const TAG_VOLUME_PATH: u32 = 0x2002;
/// URL of the volume root
const TAG_VOLUME_URL: u32 = 0x2005;
/// Name of the volume
const TAG_VOLUME_NAME: u32 = 0x2010;
/// UUID of the volume
const TAG_VOLUME_UUID: u32 = 0x2011;
/// Capacity of the volume in bytes
const TAG_VOLUME_SIZE: u32 = 0x2012;
/// Creation date of the volume
const TAG_VOLUME_CREATION_DATE: u32 = 0x2013;
/// Volume property flags, same shape as [`TAG_TARGET_FLAGS`]
const TAG_VOLUME_FLAGS: u32 = 0x2020;
/// Present when the volume was the boot volume
const TAG_VOLUME_WAS_BOOT: u32 = 0x2030;
/// Depth of the disk image chain containing the target
const TAG_DISK_IMAGE_DEPTH: u32 = 0x2040;
/// Mount point of the volume
const TAG_VOLUME_MOUNT_POINT: u32 = 0x2050;
/// Short name of the creating user
const TAG_USER_NAME: u32 = 0xc011;
/// UID of the creating user
const TAG_USER_UID: u32 = 0xc012;
/// Display name of the target
const TAG_DISPLAY_NAME: u32 = 0xf017;
/// Creation time of the bookmark itself, in Mac absolute time
const TAG_CREATION_TIME: u32 = 0xf030;
/// Read-write sandbox extension
const TAG_SANDBOX_RW: u32 = 0xf080;
/// Read-only sandbox extension
const TAG_SANDBOX_RO: u32 = 0xf081;
/// A complete Alias record embedded as bytes
const TAG_ALIAS_DATA: u32 = 0xfe00;
/// Producer-defined arbitrary data lives in the high-bit tag range and is
/// passed through opaque, never interpreted
const RESERVED_TAG_BIT: u32 = 0x8000_0000;
/// Tags the format defines but this parser deliberately does not decode:
/// home-relative component count, file-ID format marker, creation options,
/// URL length array, icon data, flattened icon ref, and type binding data
const SKIPPED_TAGS: [u32; 8] = [
    0xc001, 0xd001, 0xd010, 0xe003, 0xf020, 0xf021, 0xf022, 0xf000f,
];

/// The most deeply nested item records this parser will follow
const MAX_ITEM_DEPTH: usize = 16;

/// Resource property flag bits
const RESOURCE_PROPERTY_FLAGS: [(u64, &str); 17] = [
    (0x00000001, "IsRegularFile"),
    (0x00000002, "IsDirectory"),
    (0x00000004, "IsSymbolicLink"),
    (0x00000008, "IsVolume"),
    (0x00000010, "IsPackage"),
    (0x00000020, "IsSystemImmutable"),
    (0x00000040, "IsUserImmutable"),
    (0x00000080, "IsHidden"),
    (0x00000100, "HasHiddenExtension"),
    (0x00000200, "IsApplication"),
    (0x00000400, "IsCompressed"),
    (0x00000800, "CanSetHiddenExtension"),
    (0x00001000, "IsReadable"),
    (0x00002000, "IsWriteable"),
    (0x00004000, "IsExecutable"),
    (0x00008000, "IsAliasFile"),
    (0x00010000, "IsMountTrigger"),
];

/// Volume property flag bits
const VOLUME_PROPERTY_FLAGS: [(u64, &str); 45] = [
    (0x1, "IsLocal"),
    (0x2, "IsAutomount"),
    (0x4, "DontBrowse"),
    (0x8, "IsReadOnly"),
    (0x10, "IsQuarantined"),
    (0x20, "IsEjectable"),
    (0x40, "IsRemovable"),
    (0x80, "IsInternal"),
    (0x100, "IsExternal"),
    (0x200, "IsDiskImage"),
    (0x400, "IsFileVault"),
    (0x800, "IsLocaliDiskMirror"),
    (0x1000, "IsiPod"),
    (0x2000, "IsiDisk"),
    (0x4000, "IsCD"),
    (0x8000, "IsDVD"),
    (0x10000, "IsDeviceFileSystem"),
    (0x100000000, "SupportsPersistentIDs"),
    (0x200000000, "SupportsSearchFS"),
    (0x400000000, "SupportsExchange"),
    (0x1000000000, "SupportsSymbolicLinks"),
    (0x2000000000, "SupportsDenyModes"),
    (0x4000000000, "SupportsCopyFile"),
    (0x8000000000, "SupportsReadDirAttr"),
    (0x10000000000, "SupportsJournaling"),
    (0x20000000000, "SupportsRename"),
    (0x40000000000, "SupportsFastStatFS"),
    (0x80000000000, "SupportsCaseSensitiveNames"),
    (0x100000000000, "SupportsCasePreservedNames"),
    (0x200000000000, "SupportsFLock"),
    (0x400000000000, "HasNoRootDirectoryTimes"),
    (0x800000000000, "SupportsExtendedSecurity"),
    (0x1000000000000, "Supports2TBFileSize"),
    (0x2000000000000, "SupportsHardLinks"),
    (0x4000000000000, "SupportsMandatoryByteRangeLocks"),
    (0x8000000000000, "SupportsPathFromID"),
    (0x20000000000000, "IsJournaling"),
    (0x40000000000000, "SupportsSparseFiles"),
    (0x80000000000000, "SupportsZeroRuns"),
    (0x100000000000000, "SupportsVolumeSizes"),
    (0x200000000000000, "SupportsRemoteEvents"),
    (0x400000000000000, "SupportsHiddenFiles"),
    (0x800000000000000, "SupportsDecmpFSCompression"),
    (0x1000000000000000, "Has64BitObjectIDs"),
    (0x8000000000000000, "PropertyFlagsAll"),
];

/// One table-of-contents group: the items describing a single logical target
#[derive(Debug)]
struct Toc {
    /// Nesting depth recorded in the group header
    depth: u32,
    entries: Vec<TocEntry>,
}

/// One table-of-contents line: a field tag and where its record lives
#[derive(Debug)]
struct TocEntry {
    tag: u32,
    record_offset: usize,
}

/// Decodes Bookmark data out of a byte buffer
#[derive(Debug)]
pub struct BookmarkReader<'a> {
    /// The bookmark container bytes
    buf: &'a [u8],
    /// Where the buffer came from, for diagnostics
    source: Source<'a>,
}

impl<'a> BookmarkReader<'a> {
    pub fn new(buf: &'a [u8], source: Source<'a>) -> Self {
        Self { buf, source }
    }

    /// Decode the container into one record per table-of-contents group
    pub fn parse(&self) -> Result<Vec<BookmarkRecord>, BookmarkError> {
        let mut reader = BufferReader::new(self.buf);
        let magic = reader.read_exact(4)?;
        if magic != MAGIC_BOOK && magic != MAGIC_ALIS {
            return Err(BookmarkError::NotRecognized);
        }
        let declared_size = reader.read_u32_le()? as usize;
        let _version = reader.read_u32_le()?;
        let data_offset = reader.read_u32_le()? as usize;
        // Truncated captures can declare more data than the buffer holds
        let container_end = declared_size.min(self.buf.len());

        let tocs = self.read_toc_chain(data_offset)?;
        if tocs.is_empty() {
            return Err(BookmarkError::EmptyToc);
        }

        let mut records = Vec::with_capacity(tocs.len());
        for toc in &tocs {
            let mut record = BookmarkRecord::new(self.source.index, toc.depth);
            for entry in &toc.entries {
                self.read_item(&mut record, entry, data_offset, container_end)?;
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Walk the chain of tables of contents. The chain terminates at offset
    /// zero; an offset that repeats is a cycle, not a longer chain.
    fn read_toc_chain(&self, data_offset: usize) -> Result<Vec<Toc>, BookmarkError> {
        let mut reader = BufferReader::new(self.buf);
        reader.seek(data_offset)?;
        let mut next = reader.read_u32_le()? as usize;

        let mut seen = Vec::new();
        let mut tocs = Vec::new();
        while next != 0 {
            if seen.contains(&next) {
                return Err(BookmarkError::TocCycle(next));
            }
            seen.push(next);

            reader.seek(
                data_offset
                    .checked_add(next)
                    .ok_or(BookmarkError::OutOfBounds(usize::MAX, self.buf.len()))?,
            )?;
            let _data_length = reader.read_u32_le()?;
            let _record_type = reader.read_u16_le()?;
            let _flags = reader.read_u16_le()?;
            let depth = reader.read_u32_le()?;
            let next_toc = reader.read_u32_le()? as usize;
            let count = reader.read_u32_le()? as usize;

            // Validate the entry count against the buffer before trusting it
            if count.saturating_mul(12) > reader.remaining() {
                return Err(BookmarkError::OutOfBounds(
                    reader.position().saturating_add(count.saturating_mul(12)),
                    self.buf.len(),
                ));
            }
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let tag = reader.read_u32_le()?;
                let record_offset = reader.read_u32_le()? as usize;
                let _item_flags = reader.read_u32_le()?;
                entries.push(TocEntry { tag, record_offset });
            }
            tocs.push(Toc { depth, entries });
            next = next_toc;
        }
        Ok(tocs)
    }

    /// Decode one item and store it on the record. A failing item is skipped
    /// with a note unless it carries the mandatory path field, in which case
    /// the whole bookmark fails.
    fn read_item(
        &self,
        record: &mut BookmarkRecord,
        entry: &TocEntry,
        data_offset: usize,
        container_end: usize,
    ) -> Result<(), BookmarkError> {
        match self.read_item_data(entry.record_offset, data_offset, container_end, 0) {
            Ok((data, payload)) => {
                self.apply_item(record, entry.tag, data, payload);
                Ok(())
            }
            Err(why) => {
                if entry.tag == TAG_PATH {
                    return Err(match why {
                        BookmarkError::OutOfBounds(end, len) => {
                            BookmarkError::TruncatedMandatoryField(entry.tag, end, len)
                        }
                        other => other,
                    });
                }
                warn!(
                    "Skipping bookmark item {:#06x} in {}: {why}",
                    entry.tag, self.source
                );
                record
                    .notes
                    .push(format!("item {:#x} skipped: {why}", entry.tag));
                Ok(())
            }
        }
    }

    /// Read an item record header and decode its payload
    fn read_item_data(
        &self,
        record_offset: usize,
        data_offset: usize,
        container_end: usize,
        depth: usize,
    ) -> Result<(ItemData, &'a [u8]), BookmarkError> {
        let offset = data_offset
            .checked_add(record_offset)
            .ok_or(BookmarkError::OutOfBounds(usize::MAX, self.buf.len()))?;
        let mut reader = BufferReader::new(self.buf);
        reader.seek(offset)?;
        let length = reader.read_u32_le()? as usize;
        let data_type = reader.read_u32_le()?;
        let end = reader
            .position()
            .checked_add(length)
            .ok_or(BookmarkError::OutOfBounds(usize::MAX, self.buf.len()))?;
        if end > container_end {
            return Err(BookmarkError::OutOfBounds(end, container_end));
        }
        let payload = reader.read_exact(length)?;
        Ok((
            self.decode_item(payload, data_type, data_offset, container_end, depth)?,
            payload,
        ))
    }

    /// Decode an item payload according to its data type. Payloads whose
    /// type this parser cannot interpret come back as [`ItemData::Bytes`]
    fn decode_item(
        &self,
        payload: &'a [u8],
        data_type: u32,
        data_offset: usize,
        container_end: usize,
        depth: usize,
    ) -> Result<ItemData, BookmarkError> {
        if depth >= MAX_ITEM_DEPTH {
            return Err(BookmarkError::RecursionLimit(depth));
        }
        let mut value = BufferReader::new(payload);
        Ok(match data_type {
            0x101 => match std::str::from_utf8(payload) {
                Ok(text) => ItemData::String(text.to_string()),
                Err(why) => {
                    warn!("Undecodable string item in {}: {why}", self.source);
                    ItemData::Bytes(payload.to_vec())
                }
            },
            0x201 => ItemData::Bytes(payload.to_vec()),
            // The CFNumberType family; each member fixes a width and sign
            0x301 => ItemData::Integer(i64::from(value.read_u8()? as i8)),
            0x302 => ItemData::Integer(i64::from(value.read_i16_le()?)),
            0x303 => ItemData::Integer(i64::from(value.read_i32_le()?)),
            0x304 => ItemData::Integer(value.read_i64_le()?),
            0x305 | 0x30C => ItemData::Real(f64::from(value.read_f32_le()?)),
            0x306 | 0x30D => ItemData::Real(value.read_f64_le()?),
            0x307 => ItemData::Integer(i64::from(value.read_u8()?)),
            0x308 => ItemData::Integer(i64::from(value.read_u16_le()?)),
            0x309 | 0x30A | 0x30E | 0x30F => ItemData::Integer(i64::from(value.read_u32_le()?)),
            0x30B => {
                let raw = value.read_u64_le()?;
                match i64::try_from(raw) {
                    Ok(signed) => ItemData::Integer(signed),
                    Err(_) => ItemData::Unsigned(raw),
                }
            }
            // Dates are the one big-endian field in the container
            0x400 => match dates::from_mac_absolute_time(value.read_f64_be()?) {
                Some(date) => ItemData::Date(date),
                None => ItemData::Null,
            },
            0x500 => ItemData::Bool(false),
            0x501 => ItemData::Bool(true),
            0x601 => ItemData::Array(self.decode_pointer_array(
                payload,
                data_offset,
                container_end,
                depth,
            )?),
            0x701 => {
                if payload.len() % 8 != 0 {
                    warn!(
                        "Bookmark dict item in {} is not a sequence of pointer pairs",
                        self.source
                    );
                    ItemData::Bytes(payload.to_vec())
                } else {
                    let items =
                        self.decode_pointer_array(payload, data_offset, container_end, depth)?;
                    let mut pairs = Vec::with_capacity(items.len() / 2);
                    let mut iter = items.into_iter();
                    while let (Some(key), Some(item)) = (iter.next(), iter.next()) {
                        pairs.push((key, item));
                    }
                    ItemData::Dict(pairs)
                }
            }
            0x801 => match uuid::Uuid::from_slice(payload) {
                Ok(uuid) => ItemData::String(uuid.to_string()),
                Err(why) => {
                    warn!("Undecodable UUID item in {}: {why}", self.source);
                    ItemData::Bytes(payload.to_vec())
                }
            },
            0x901 => match std::str::from_utf8(payload) {
                Ok(text) => ItemData::String(text.to_string()),
                Err(why) => {
                    warn!("Undecodable URL item in {}: {why}", self.source);
                    ItemData::Bytes(payload.to_vec())
                }
            },
            // A URL split into a (base, relative) pointer pair
            0x902 => {
                let parts =
                    self.decode_pointer_array(payload, data_offset, container_end, depth)?;
                let texts: Vec<String> =
                    parts.iter().filter_map(ItemData::display_text).collect();
                if let [base, relative] = texts.as_slice() {
                    ItemData::String(join_url(base, relative))
                } else {
                    warn!(
                        "Unexpected record count {} in URL array from {}",
                        texts.len(),
                        self.source
                    );
                    ItemData::String(texts.join("/"))
                }
            }
            0xA01 => {
                if !payload.is_empty() {
                    warn!(
                        "Unexpected data length {} for null item in {}",
                        payload.len(),
                        self.source
                    );
                }
                ItemData::Null
            }
            other => {
                warn!(
                    "Unknown bookmark data type {other:#x} in {}",
                    self.source
                );
                ItemData::Bytes(payload.to_vec())
            }
        })
    }

    /// Arrays store their elements as item records elsewhere in the data
    /// area, pointed to by 32-bit offsets
    fn decode_pointer_array(
        &self,
        payload: &[u8],
        data_offset: usize,
        container_end: usize,
        depth: usize,
    ) -> Result<Vec<ItemData>, BookmarkError> {
        let mut items = Vec::with_capacity(payload.len() / 4);
        for chunk in payload.chunks_exact(4) {
            let pointer = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
            let (item, _) =
                self.read_item_data(pointer, data_offset, container_end, depth + 1)?;
            items.push(item);
        }
        Ok(items)
    }

    /// Store one decoded item on the record. The first occurrence of a field
    /// wins; duplicates within a group are noted and dropped.
    fn apply_item(&self, record: &mut BookmarkRecord, tag: u32, data: ItemData, payload: &[u8]) {
        match (tag, data) {
            // Any field may be encoded as null; a null carries no value
            (_, ItemData::Null) => {}
            (TAG_URL_STRING, ItemData::String(text)) => {
                assign(&mut record.url_string, text, tag, &mut record.notes);
            }
            (TAG_PATH, ItemData::Array(items)) => {
                assign(
                    &mut record.path,
                    join_components(&items, "/"),
                    tag,
                    &mut record.notes,
                );
            }
            (TAG_CNID_PATH, ItemData::Array(items)) => {
                assign(
                    &mut record.cnid_path,
                    join_components(&items, "/"),
                    tag,
                    &mut record.notes,
                );
            }
            (TAG_TARGET_FLAGS, ItemData::Bytes(bytes)) if bytes.len() >= 8 => {
                if let Some(text) = describe_flags(u64_le(&bytes), &RESOURCE_PROPERTY_FLAGS) {
                    assign(&mut record.target_flags, text, tag, &mut record.notes);
                }
            }
            (TAG_TARGET_NAME, ItemData::String(text)) => {
                assign(&mut record.target_name, text, tag, &mut record.notes);
            }
            (TAG_TARGET_CNID, number) if number.as_i64().is_some() => {
                assign(
                    &mut record.target_cnid,
                    number.as_i64().unwrap_or_default(),
                    tag,
                    &mut record.notes,
                );
            }
            (TAG_TARGET_CREATION_DATE, ItemData::Date(date)) => {
                assign(&mut record.target_creation_date, date, tag, &mut record.notes);
            }
            (TAG_VOLUME_INFO_DEPTHS, ItemData::Array(items)) => {
                assign(
                    &mut record.volume_info_depths,
                    join_components(&items, ", "),
                    tag,
                    &mut record.notes,
                );
            }
            (TAG_VOLUME_PATH, ItemData::String(text)) => {
                assign(&mut record.volume_path, text, tag, &mut record.notes);
            }
            (TAG_VOLUME_URL, ItemData::String(text)) => {
                assign(&mut record.volume_url, text, tag, &mut record.notes);
            }
            (TAG_VOLUME_NAME, ItemData::String(text)) => {
                assign(&mut record.volume_name, text, tag, &mut record.notes);
            }
            (TAG_VOLUME_UUID, ItemData::String(text)) => {
                assign(&mut record.volume_uuid, text, tag, &mut record.notes);
            }
            (TAG_VOLUME_SIZE, number) if number.as_i64().is_some() => {
                assign(
                    &mut record.volume_size,
                    number.as_i64().unwrap_or_default(),
                    tag,
                    &mut record.notes,
                );
            }
            (TAG_VOLUME_CREATION_DATE, ItemData::Date(date)) => {
                assign(&mut record.volume_creation_date, date, tag, &mut record.notes);
            }
            (TAG_VOLUME_FLAGS, ItemData::Bytes(bytes)) if bytes.len() >= 8 => {
                if let Some(text) = describe_flags(u64_le(&bytes), &VOLUME_PROPERTY_FLAGS) {
                    assign(&mut record.volume_flags, text, tag, &mut record.notes);
                }
            }
            (TAG_VOLUME_WAS_BOOT, ItemData::Bool(value)) => {
                assign(&mut record.volume_was_boot, value, tag, &mut record.notes);
            }
            (TAG_DISK_IMAGE_DEPTH, number) if number.as_i64().is_some() => {
                assign(
                    &mut record.disk_image_depth,
                    number.as_i64().unwrap_or_default(),
                    tag,
                    &mut record.notes,
                );
            }
            (TAG_VOLUME_MOUNT_POINT, ItemData::String(text)) => {
                assign(&mut record.volume_mount_point, text, tag, &mut record.notes);
            }
            (TAG_USER_NAME, ItemData::String(text)) => {
                assign(&mut record.user_name, text, tag, &mut record.notes);
            }
            (TAG_USER_UID, number) if number.as_i64().is_some() => {
                assign(
                    &mut record.user_uid,
                    number.as_i64().unwrap_or_default(),
                    tag,
                    &mut record.notes,
                );
            }
            (TAG_DISPLAY_NAME, ItemData::String(text)) => {
                assign(&mut record.display_name, text, tag, &mut record.notes);
            }
            (TAG_CREATION_TIME, number) if number.as_f64().is_some() => {
                if let Some(date) = dates::from_mac_absolute_time(number.as_f64().unwrap_or_default())
                {
                    assign(
                        &mut record.bookmark_creation_date,
                        date,
                        tag,
                        &mut record.notes,
                    );
                }
            }
            (TAG_SANDBOX_RW, ItemData::Bytes(bytes)) => {
                if let Some(extension) = decode_sandbox(&bytes) {
                    assign(&mut record.sandbox_rw, extension, tag, &mut record.notes);
                }
            }
            (TAG_SANDBOX_RO, ItemData::Bytes(bytes)) => {
                if let Some(extension) = decode_sandbox(&bytes) {
                    assign(&mut record.sandbox_ro, extension, tag, &mut record.notes);
                }
            }
            (TAG_ALIAS_DATA, ItemData::Bytes(bytes)) => self.attach_alias(record, &bytes),
            (tag, _) if tag & RESERVED_TAG_BIT != 0 => {
                // Caller-interpreted producer data; pass it through untouched
                debug!(
                    "Preserving reserved bookmark item {tag:#010x} in {}",
                    self.source
                );
                record.opaque_fields.insert(tag, payload.to_vec());
            }
            (tag, _) if SKIPPED_TAGS.contains(&tag) => {}
            (tag, _) => {
                warn!(
                    "Unhandled bookmark record/data type {tag:#06x} in {}",
                    self.source
                );
                record.opaque_fields.insert(tag, payload.to_vec());
            }
        }
    }

    /// Recognize and decode an embedded Alias payload
    fn attach_alias(&self, record: &mut BookmarkRecord, bytes: &[u8]) {
        if !looks_like_alias(bytes) {
            record
                .notes
                .push("embedded alias payload does not carry an alias version".to_string());
            record.opaque_fields.insert(TAG_ALIAS_DATA, bytes.to_vec());
            return;
        }
        match AliasReader::new(bytes, self.source).parse() {
            Ok(children) => record.embedded_aliases.extend(children),
            Err(why) => {
                warn!(
                    "Could not decode embedded alias in bookmark from {}: {why}",
                    self.source
                );
                record
                    .notes
                    .push(format!("embedded alias failed to decode: {why}"));
                record.opaque_fields.insert(TAG_ALIAS_DATA, bytes.to_vec());
            }
        }
    }
}

/// Store a field value; the first occurrence within a group wins
fn assign<T>(slot: &mut Option<T>, value: T, tag: u32, notes: &mut Vec<String>) {
    if slot.is_some() {
        notes.push(format!("duplicate field {tag:#x} ignored"));
    } else {
        *slot = Some(value);
    }
}

/// Alias records open with four application bytes, a size, and a version
/// this crate knows
fn looks_like_alias(bytes: &[u8]) -> bool {
    bytes.len() >= 8 && matches!(u16::from_be_bytes([bytes[6], bytes[7]]), 2 | 3)
}

/// Join decoded array components, dropping nulls and empty strings
fn join_components(items: &[ItemData], separator: &str) -> String {
    let parts: Vec<String> = items
        .iter()
        .filter_map(ItemData::display_text)
        .filter(|text| !text.is_empty())
        .collect();
    parts.join(separator)
}

/// Join a CFURL stored as a (base, relative) pair
fn join_url(base: &str, relative: &str) -> String {
    if relative.contains("://") {
        return relative.to_string();
    }
    if base.ends_with('/') {
        return format!("{base}{relative}");
    }
    match base.rfind('/') {
        Some(idx) => format!("{}{relative}", &base[..=idx]),
        None => format!("{base}/{relative}"),
    }
}

/// Sandbox extensions are semicolon-separated byte strings; the leading
/// token is a UUID and the trailing token the granted path
fn decode_sandbox(bytes: &[u8]) -> Option<SandboxExtension> {
    let mut parts = bytes.split(|byte| *byte == b';');
    let uuid = parts.next()?;
    let path = parts.last().unwrap_or(uuid);
    let text_end = path
        .iter()
        .rposition(|byte| *byte != 0)
        .map_or(0, |index| index + 1);
    let path = &path[..text_end];
    Some(SandboxExtension {
        uuid: String::from_utf8_lossy(uuid).into_owned(),
        path: String::from_utf8_lossy(path).into_owned(),
    })
}

fn u64_le(bytes: &[u8]) -> u64 {
    u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}
