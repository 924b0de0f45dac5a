/*!
 Contains logic to decode Alias records.

 Layout referenced from Apple's Carbon headers:
   - [`Aliases.h`](https://opensource.apple.com/source/CarbonHeaders/CarbonHeaders-8A428/Aliases.h)
*/

use log::warn;

use crate::{
    alias::models::{AliasRecord, TargetKind},
    error::alias::AliasError,
    util::{dates, flags::describe_flags, reader::BufferReader, source::Source},
};

use chrono::{DateTime, Utc};

/// Name of the directory containing the target
const TAG_FOLDER_NAME: u16 = 0x0000;
/// Sequence of big-endian catalog node IDs along the path
const TAG_CNID_PATH: u16 = 0x0001;
/// Colon-separated HFS path
const TAG_HFS_PATH: u16 = 0x0002;
/// Name of the volume driver
const TAG_DRIVER_NAME: u16 = 0x0006;
/// Target name as an `HFSUniStr255`
const TAG_TARGET_NAME: u16 = 0x000E;
/// Volume name as an `HFSUniStr255`
const TAG_VOLUME_NAME: u16 = 0x000F;
/// Volume creation date as an 8-byte HFS timestamp
const TAG_VOLUME_CREATION_DATE: u16 = 0x0010;
/// Target creation date as an 8-byte HFS timestamp
const TAG_TARGET_CREATION_DATE: u16 = 0x0011;
/// POSIX path to the target
const TAG_PATH: u16 = 0x0012;
/// POSIX path the volume is mounted at
const TAG_VOLUME_MOUNT_POINT: u16 = 0x0013;
/// A complete Alias record embedded as bytes
const TAG_EMBEDDED_ALIAS: u16 = 0x0014;
/// Sentinel tag that terminates the field table
const TAG_TERMINATOR: u16 = 0xFFFF;
/// Tags the format defines but this parser deliberately does not decode:
/// AppleShare zone/server/user, network mount info, dialup info, and the
/// user home prefix length
const IGNORED_TAGS: [u16; 6] = [0x0003, 0x0004, 0x0005, 0x0009, 0x000A, 0x0015];

/// Catalog node ID value marking an absent node, e.g. an alias to a volume
const CNID_NONE: u32 = 0xFFFF_FFFF;
/// Depth value marking an unrecorded depth
const DEPTH_NONE: u16 = 0xFFFF;
/// The most deeply nested embedded alias this parser will follow
const MAX_DEPTH: usize = 16;

/// Filesystem signatures, as reported by `getattrlist` and `statfs`
const SIGNATURES: [(&[u8; 4], &str); 7] = [
    (b"BDcu", "UDF (CD/DVD)"),
    (b"BDIS", "FAT32"),
    (b"BDxF", "exFAT"),
    (b"HX\x00\x00", "HFSX"),
    (b"H+\x00\x00", "HFS+"),
    (b"KG\x00\x00", "FTP"),
    (b"NTcu", "NTFS"),
];

/// Disk types stored in version 2 records. Version 3 samples disagree with
/// this table, but version 3 records do not carry the field anyway.
const DISK_TYPES: [(u16, &str); 6] = [
    (0, "Fixed"),
    (1, "Network"),
    (2, "400KB Floppy"),
    (3, "800KB Floppy"),
    (4, "1.44MB Floppy"),
    (5, "Ejectable"),
];

/// Volume attribute flag bits
const VOLUME_FLAGS: [(u64, &str); 4] = [
    (0x0002, "IsEjectable"),
    (0x0020, "IsBootVolume"),
    (0x0080, "IsAutomounted"),
    (0x0100, "HasPersistentFileIds"),
];

/// Decodes Alias records out of a byte buffer
#[derive(Debug)]
pub struct AliasReader<'a> {
    /// Cursor over the record bytes
    reader: BufferReader<'a>,
    /// Where the buffer came from, for diagnostics
    source: Source<'a>,
    /// How many embedded alias records deep this reader is
    depth: usize,
}

impl<'a> AliasReader<'a> {
    pub fn new(buf: &'a [u8], source: Source<'a>) -> Self {
        Self::with_depth(buf, source, 0)
    }

    fn with_depth(buf: &'a [u8], source: Source<'a>, depth: usize) -> Self {
        Self {
            reader: BufferReader::new(buf),
            source,
            depth,
        }
    }

    /// Decode the buffer into a flat sequence of records: the top-level
    /// record first, followed by any embedded alias records.
    pub fn parse(&mut self) -> Result<Vec<AliasRecord>, AliasError> {
        if self.depth >= MAX_DEPTH {
            return Err(AliasError::RecursionLimit(self.depth));
        }

        let version = self.read_header()?;
        let mut record = match version {
            2 => self.read_header_v2()?,
            3 => self.read_header_v3()?,
            other => return Err(AliasError::UnsupportedVersion(other)),
        };
        record.source_index = self.source.index;

        let embedded = self.read_field_table(&mut record)?;
        join_mount_point(&mut record);

        let mut records = vec![record];
        if let Some(bytes) = embedded {
            match AliasReader::with_depth(bytes, self.source, self.depth + 1).parse() {
                Ok(children) => records.extend(children),
                Err(why) => {
                    warn!("Could not decode embedded alias data in {}: {why}", self.source);
                    records[0]
                        .notes
                        .push(format!("embedded alias failed to decode: {why}"));
                }
            }
        }
        Ok(records)
    }

    /// Common 8-byte header: application info, declared record size, version
    fn read_header(&mut self) -> Result<u16, AliasError> {
        let app_info = self.reader.read_exact(4)?;
        if app_info != [0, 0, 0, 0] {
            warn!(
                "Alias data in {} has unexpected app info {app_info:02x?}",
                self.source
            );
        }
        let record_size = self.reader.read_u16_be()?;
        if usize::from(record_size) != self.reader.len() {
            warn!(
                "Alias data in {} declares {record_size} bytes, buffer holds {}",
                self.source,
                self.reader.len()
            );
        }
        Ok(self.reader.read_u16_be()?)
    }

    /// Version 2 fixed header layout
    fn read_header_v2(&mut self) -> Result<AliasRecord, AliasError> {
        let kind = TargetKind::from_kind_field(self.reader.read_u16_be()?);
        let mut record = AliasRecord::new(2, kind);

        record.volume_name = non_empty(self.reader.read_pascal_string(27)?);
        record.volume_creation_date = dates::from_hfs_seconds(self.reader.read_u32_be()?);
        let signature = self.reader.read_exact(2)?;
        let disk_type = self.reader.read_u16_be()?;
        record.disk_type = Some(disk_type);
        record.disk_type_description = Some(
            DISK_TYPES
                .iter()
                .find(|(value, _)| *value == disk_type)
                .map_or("Unknown", |(_, description)| *description),
        );
        record.parent_cnid = filter_cnid(self.reader.read_u32_be()?);
        record.target_name = non_empty(self.reader.read_pascal_string(63)?);
        record.target_cnid = filter_cnid(self.reader.read_u32_be()?);
        record.target_creation_date = dates::from_hfs_seconds(self.reader.read_u32_be()?);
        record.application = four_cc(self.reader.read_exact(4)?);
        record.target_type = four_cc(self.reader.read_exact(4)?);
        record.alias_to_root_depth = filter_depth(self.reader.read_u16_be()?);
        record.root_to_target_depth = filter_depth(self.reader.read_u16_be()?);
        record.volume_flags = describe_flags(self.reader.read_u32_be()?.into(), &VOLUME_FLAGS);
        let filesystem_id = self.reader.read_exact(2)?;
        self.reader.skip(10)?;

        // The version 2 signature and filesystem ID pair up to the single
        // four-byte field version 3 records carry
        let fsid = [signature[0], signature[1], filesystem_id[0], filesystem_id[1]];
        (record.signature, record.filesystem_description) = fs_signature(fsid);
        Ok(record)
    }

    /// Version 3 fixed header layout
    fn read_header_v3(&mut self) -> Result<AliasRecord, AliasError> {
        let kind = TargetKind::from_kind_field(self.reader.read_u16_be()?);
        let mut record = AliasRecord::new(3, kind);

        record.volume_creation_date = self.read_hfs_date()?;
        let fsid: [u8; 4] = self
            .reader
            .read_exact(4)?
            .try_into()
            .map_err(AliasError::SliceError)?;
        (record.signature, record.filesystem_description) = fs_signature(fsid);
        // Possibly a disk type; the few samples available disagree
        self.reader.skip(2)?;
        record.parent_cnid = filter_cnid(self.reader.read_u32_be()?);
        record.target_cnid = filter_cnid(self.reader.read_u32_be()?);
        record.target_creation_date = self.read_hfs_date()?;
        record.volume_flags = describe_flags(self.reader.read_u32_be()?.into(), &VOLUME_FLAGS);
        self.reader.skip(14)?;
        Ok(record)
    }

    /// Read an 8-byte HFS timestamp from the fixed header
    fn read_hfs_date(&mut self) -> Result<Option<DateTime<Utc>>, AliasError> {
        let high = self.reader.read_u16_be()?;
        let low = self.reader.read_u32_be()?;
        let fraction = self.reader.read_u16_be()?;
        Ok(dates::from_hfs_fraction(high, low, fraction))
    }

    /// Walk the tag/length/value table that follows the fixed header.
    /// Returns the embedded alias payload if the table carries one.
    fn read_field_table(
        &mut self,
        record: &mut AliasRecord,
    ) -> Result<Option<&'a [u8]>, AliasError> {
        let mut embedded = None;
        loop {
            if self.reader.remaining() == 0 {
                return Err(AliasError::MissingTerminator);
            }
            let tag = self.reader.read_u16_be()?;
            if tag == TAG_TERMINATOR {
                break;
            }
            let length = usize::from(self.reader.read_u16_be()?);
            let value = self.reader.read_exact(length)?;
            if length > 0 {
                self.apply_field(record, tag, value, &mut embedded);
            }
            // Odd-length values are followed by one pad byte; reproducing the
            // 2-byte alignment exactly is what keeps the next tag in frame
            if self.reader.position() % 2 == 1 {
                if self.reader.remaining() == 0 {
                    return Err(AliasError::MissingTerminator);
                }
                self.reader.align(2)?;
            }
        }
        Ok(embedded)
    }

    /// Apply a single field table entry to the record. Known tags decode into
    /// typed fields, where a repeated tag overwrites the earlier value;
    /// unknown tags are preserved verbatim. Version 2 and 3 records share one
    /// field dialect.
    fn apply_field(
        &self,
        record: &mut AliasRecord,
        tag: u16,
        value: &'a [u8],
        embedded: &mut Option<&'a [u8]>,
    ) {
        match tag {
            TAG_FOLDER_NAME => record.folder_name = non_empty(decode_utf8(value)),
            TAG_CNID_PATH => {
                if let Some(path) = self.decode_cnid_path(value) {
                    record.cnid_path = Some(path);
                }
            }
            TAG_HFS_PATH => record.hfs_path = non_empty(decode_utf8(value)),
            TAG_DRIVER_NAME => record.driver_name = non_empty(decode_utf8(value)),
            TAG_TARGET_NAME => record.target_name = decode_hfs_unicode(value),
            TAG_VOLUME_NAME => record.volume_name = decode_hfs_unicode(value),
            TAG_VOLUME_CREATION_DATE => {
                // The named date is higher resolution than the header's and wins
                if let Some(date) = decode_hfs_date_field(value) {
                    record.volume_creation_date = date;
                }
            }
            TAG_TARGET_CREATION_DATE => {
                if let Some(date) = decode_hfs_date_field(value) {
                    record.target_creation_date = date;
                }
            }
            TAG_PATH => record.path = non_empty(decode_utf8(value)),
            TAG_VOLUME_MOUNT_POINT => record.volume_mount_point = non_empty(decode_utf8(value)),
            TAG_EMBEDDED_ALIAS => *embedded = Some(value),
            tag if IGNORED_TAGS.contains(&tag) => {}
            unknown => {
                warn!(
                    "Unexpected field tag {unknown:#06x} in alias data for {}",
                    self.source
                );
                record.unknown_fields.insert(unknown, value.to_vec());
            }
        }
    }

    /// A CNID path is a sequence of big-endian 32-bit catalog node IDs
    fn decode_cnid_path(&self, value: &[u8]) -> Option<String> {
        if value.len() % 4 != 0 {
            warn!(
                "Unable to parse CNIDs from alias data in {}: expected a multiple of 4 bytes, got {}",
                self.source,
                value.len()
            );
            return None;
        }
        let cnids: Vec<String> = value
            .chunks_exact(4)
            .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]).to_string())
            .collect();
        Some(cnids.join("/"))
    }
}

/// Decode UTF-8 path data. Version 2 strings embed `:\x00` separators, so
/// NULs are stripped; undecodable bytes fall back to their hex form.
fn decode_utf8(value: &[u8]) -> String {
    match std::str::from_utf8(value) {
        Ok(text) => text.replace('\0', ""),
        Err(_) => hex_string(value),
    }
}

/// Decode an `HFSUniStr255`: a 16-bit character count followed by up to 255
/// UTF-16BE code units
fn decode_hfs_unicode(value: &[u8]) -> Option<String> {
    if value.len() < 2 {
        return None;
    }
    let count = usize::from(u16::from_be_bytes([value[0], value[1]]));
    let units: Vec<u16> = value[2..]
        .chunks_exact(2)
        .take(count)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    Some(String::from_utf16_lossy(&units))
}

/// Decode an 8-byte HFS timestamp carried in a field table entry. The outer
/// `None` marks a malformed entry whose value should not overwrite the header
fn decode_hfs_date_field(value: &[u8]) -> Option<Option<DateTime<Utc>>> {
    if value.len() < 8 {
        return None;
    }
    let high = u16::from_be_bytes([value[0], value[1]]);
    let low = u32::from_be_bytes([value[2], value[3], value[4], value[5]]);
    let fraction = u16::from_be_bytes([value[6], value[7]]);
    Some(dates::from_hfs_fraction(high, low, fraction))
}

/// Decode a four-character creator or type code; unprintable codes fall back
/// to their hex form and absent codes to `None`
fn four_cc(code: &[u8]) -> Option<String> {
    if code.iter().all(|byte| *byte == 0) {
        return None;
    }
    match std::str::from_utf8(code) {
        Ok(text) => Some(text.trim_end_matches('\0').to_string()),
        Err(_) => Some(hex_string(code)),
    }
}

/// Look up the filesystem signature: the displayable signature text and a
/// description of the filesystem it names
fn fs_signature(fsid: [u8; 4]) -> (Option<String>, &'static str) {
    let description = SIGNATURES
        .iter()
        .find(|(signature, _)| **signature == fsid)
        .map_or("Unknown", |(_, description)| *description);
    let text = match std::str::from_utf8(&fsid) {
        Ok(text) => text.replace('\0', ""),
        Err(_) => hex_string(&fsid),
    };
    (non_empty(text), description)
}

/// `0xFFFFFFFF` marks an absent catalog node ID
fn filter_cnid(cnid: u32) -> Option<u32> {
    (cnid != CNID_NONE).then_some(cnid)
}

/// `0xFFFF` marks an unrecorded depth
fn filter_depth(depth: u16) -> Option<u16> {
    (depth != DEPTH_NONE).then_some(depth)
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// The mount point prefixes the recorded path, mirroring how the target
/// would be reached through the mounted volume
fn join_mount_point(record: &mut AliasRecord) {
    if let Some(mount) = &record.volume_mount_point {
        let path = record.path.as_deref().unwrap_or("");
        let mut joined = mount.clone();
        if !mount.ends_with('/') && !path.is_empty() {
            joined.push('/');
        }
        joined.push_str(path);
        record.path = Some(joined);
    }
}

#[cfg(test)]
mod parser_tests {
    use crate::{
        alias::{
            models::TargetKind,
            parser::AliasReader,
        },
        error::alias::AliasError,
        util::{dates::HFS_TO_UNIX_SHIFT, source::Source},
    };
    use chrono::{TimeZone, Utc};

    /// One field table entry, padded to the next 2-byte boundary
    fn field(tag: u16, value: &[u8]) -> Vec<u8> {
        let mut out = vec![];
        out.extend(tag.to_be_bytes());
        out.extend((value.len() as u16).to_be_bytes());
        out.extend(value);
        if value.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    /// An `HFSUniStr255` value: character count plus UTF-16BE code units
    fn hfs_unicode(text: &str) -> Vec<u8> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut out = (units.len() as u16).to_be_bytes().to_vec();
        units
            .iter()
            .for_each(|unit| out.extend(unit.to_be_bytes()));
        out
    }

    /// A Pascal string in a fixed-width field: length byte plus `width` bytes
    fn pascal_field(text: &str, width: usize) -> Vec<u8> {
        let mut out = vec![text.len() as u8];
        out.extend(text.as_bytes());
        out.resize(width + 1, 0);
        out
    }

    fn v2_body(volume: &str, target: &str) -> Vec<u8> {
        let mut body = vec![];
        body.extend(0u16.to_be_bytes()); // kind: file
        body.extend(pascal_field(volume, 27));
        body.extend((HFS_TO_UNIX_SHIFT as u32).to_be_bytes()); // 1970-01-01
        body.extend(b"H+");
        body.extend(0u16.to_be_bytes()); // disk type: fixed
        body.extend(2u32.to_be_bytes()); // parent CNID
        body.extend(pascal_field(target, 63));
        body.extend(0xFFFF_FFFFu32.to_be_bytes()); // target CNID: none
        body.extend((HFS_TO_UNIX_SHIFT as u32 + 60).to_be_bytes());
        body.extend(b"\0\0\0\0"); // no creator code
        body.extend(b"TEXT");
        body.extend(0xFFFFu16.to_be_bytes()); // alias-to-root depth: none
        body.extend(1u16.to_be_bytes());
        body.extend(0x0100u32.to_be_bytes()); // HasPersistentFileIds
        body.extend(b"\0\0"); // filesystem ID
        body.extend([0u8; 10]);
        body
    }

    fn v3_body() -> Vec<u8> {
        let mut body = vec![];
        body.extend(1u16.to_be_bytes()); // kind: directory
        body.extend(0u16.to_be_bytes()); // volume creation: high
        body.extend((HFS_TO_UNIX_SHIFT as u32 + 86_400).to_be_bytes()); // low
        body.extend(0u16.to_be_bytes()); // fraction
        body.extend(b"H+\0\0");
        body.extend([0u8; 2]);
        body.extend(100u32.to_be_bytes()); // parent CNID
        body.extend(200u32.to_be_bytes()); // target CNID
        body.extend([0u8; 8]); // target creation: not set
        body.extend(0u32.to_be_bytes()); // no volume flags
        body.extend([0u8; 14]);
        body
    }

    /// Assemble a complete record: header, fixed body, field table, terminator
    fn assemble(version: u16, body: &[u8], fields: &[Vec<u8>]) -> Vec<u8> {
        let table: Vec<u8> = fields.concat();
        let total = 8 + body.len() + table.len() + 4;
        let mut buf = vec![0u8; 4];
        buf.extend((total as u16).to_be_bytes());
        buf.extend(version.to_be_bytes());
        buf.extend(body);
        buf.extend(table);
        buf.extend([0xFF, 0xFF, 0x00, 0x00]);
        buf
    }

    fn parse(buf: &[u8]) -> Result<Vec<crate::alias::models::AliasRecord>, AliasError> {
        AliasReader::new(buf, Source::default()).parse()
    }

    #[test]
    fn can_parse_v2_header() {
        let buf = assemble(2, &v2_body("Macintosh HD", "file.txt"), &[]);
        let records = parse(&buf).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.version, 2);
        assert_eq!(record.kind, TargetKind::File);
        assert_eq!(record.volume_name.as_deref(), Some("Macintosh HD"));
        assert_eq!(record.target_name.as_deref(), Some("file.txt"));
        assert_eq!(
            record.volume_creation_date.unwrap(),
            Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(record.parent_cnid, Some(2));
        assert_eq!(record.target_cnid, None);
        assert_eq!(record.target_type.as_deref(), Some("TEXT"));
        assert_eq!(record.application, None);
        assert_eq!(record.alias_to_root_depth, None);
        assert_eq!(record.root_to_target_depth, Some(1));
        assert_eq!(record.volume_flags.as_deref(), Some("HasPersistentFileIds"));
        assert_eq!(record.disk_type_description, Some("Fixed"));
        assert_eq!(record.filesystem_description, "HFS+");
        assert_eq!(record.signature.as_deref(), Some("H+"));
    }

    #[test]
    fn can_parse_v3_header() {
        let buf = assemble(3, &v3_body(), &[]);
        let records = parse(&buf).unwrap();

        let record = &records[0];
        assert_eq!(record.version, 3);
        assert_eq!(record.kind, TargetKind::Directory);
        assert_eq!(record.parent_cnid, Some(100));
        assert_eq!(record.target_cnid, Some(200));
        assert_eq!(record.target_creation_date, None);
        assert_eq!(
            record.volume_creation_date.unwrap(),
            Utc.with_ymd_and_hms(1970, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(record.filesystem_description, "HFS+");
        assert_eq!(record.disk_type, None);
    }

    #[test]
    fn named_fields_overwrite_header_values() {
        let fields = vec![
            field(0x000E, &hfs_unicode("renamed.txt")),
            field(0x000F, &hfs_unicode("Backup")),
        ];
        let buf = assemble(2, &v2_body("Macintosh HD", "file.txt"), &fields);
        let records = parse(&buf).unwrap();

        assert_eq!(records[0].target_name.as_deref(), Some("renamed.txt"));
        assert_eq!(records[0].volume_name.as_deref(), Some("Backup"));
    }

    #[test]
    fn odd_length_values_are_padded() {
        let fields = vec![
            field(0x0012, b"Users"),
            field(0x0013, b"/"),
            field(0x0000, b"Users"),
        ];
        let buf = assemble(2, &v2_body("HD", "f"), &fields);
        let records = parse(&buf).unwrap();

        assert_eq!(records[0].path.as_deref(), Some("/Users"));
        assert_eq!(records[0].folder_name.as_deref(), Some("Users"));
    }

    #[test]
    fn repeated_tag_last_value_wins() {
        let fields = vec![field(0x0012, b"first"), field(0x0012, b"second")];
        let buf = assemble(2, &v2_body("HD", "f"), &fields);
        let records = parse(&buf).unwrap();

        assert_eq!(records[0].path.as_deref(), Some("second"));
    }

    #[test]
    fn unknown_tags_are_preserved() {
        let fields = vec![field(0x0042, &[0xAA, 0xBB, 0xCC])];
        let buf = assemble(2, &v2_body("HD", "f"), &fields);
        let records = parse(&buf).unwrap();

        assert_eq!(
            records[0].unknown_fields.get(&0x0042),
            Some(&vec![0xAA, 0xBB, 0xCC])
        );
    }

    #[test]
    fn can_decode_cnid_path() {
        let mut cnids = vec![];
        cnids.extend(2u32.to_be_bytes());
        cnids.extend(1205u32.to_be_bytes());
        let fields = vec![field(0x0001, &cnids)];
        let buf = assemble(2, &v2_body("HD", "f"), &fields);
        let records = parse(&buf).unwrap();

        assert_eq!(records[0].cnid_path.as_deref(), Some("2/1205"));
    }

    #[test]
    fn mount_point_prefixes_path() {
        let fields = vec![
            field(0x0012, b"Users/alice/file.txt"),
            field(0x0013, b"/Volumes/Backup"),
        ];
        let buf = assemble(2, &v2_body("Backup", "file.txt"), &fields);
        let records = parse(&buf).unwrap();

        assert_eq!(
            records[0].path.as_deref(),
            Some("/Volumes/Backup/Users/alice/file.txt")
        );
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let buf = assemble(4, &v2_body("HD", "f"), &[]);

        assert!(matches!(
            parse(&buf),
            Err(AliasError::UnsupportedVersion(4))
        ));
    }

    #[test]
    fn truncated_header_is_out_of_bounds() {
        let buf = assemble(2, &v2_body("HD", "f"), &[]);

        assert!(matches!(
            parse(&buf[..40]),
            Err(AliasError::OutOfBounds(_, _))
        ));
    }

    #[test]
    fn missing_terminator_is_structural() {
        let mut buf = assemble(2, &v2_body("HD", "f"), &[]);
        buf.truncate(buf.len() - 4);

        assert!(matches!(parse(&buf), Err(AliasError::MissingTerminator)));
    }

    #[test]
    fn embedded_alias_yields_flat_sequence() {
        let inner = assemble(
            2,
            &v2_body("Backup", "inner.txt"),
            &[field(0x000E, &hfs_unicode("inner.txt"))],
        );
        let buf = assemble(
            2,
            &v2_body("Macintosh HD", "outer.txt"),
            &[field(0x0014, &inner)],
        );
        let records = parse(&buf).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].target_name.as_deref(), Some("outer.txt"));
        assert_eq!(records[1].target_name.as_deref(), Some("inner.txt"));
    }

    #[test]
    fn embedded_alias_recursion_is_capped() {
        let mut buf = assemble(2, &v2_body("HD", "deepest"), &[]);
        for _ in 0..20 {
            buf = assemble(2, &v2_body("HD", "wrapper"), &[field(0x0014, &buf)]);
        }
        let records = parse(&buf).unwrap();

        assert_eq!(records.len(), 16);
        assert!(!records[15].notes.is_empty());
    }

    #[test]
    fn decoding_is_idempotent() {
        let buf = assemble(
            2,
            &v2_body("Macintosh HD", "file.txt"),
            &[field(0x0012, b"Users/alice/file.txt")],
        );

        assert_eq!(parse(&buf).unwrap(), parse(&buf).unwrap());
    }
}
