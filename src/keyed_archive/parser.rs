/*!
 Contains logic to materialize `NSKeyedArchiver` object graphs.

 Format referenced from
 [NSKeyedArchiver](https://developer.apple.com/documentation/foundation/nskeyedarchiver).
*/

use std::collections::BTreeMap;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use log::warn;
use plist::{Dictionary, Value};
use uuid::Uuid;

use crate::{
    error::keyed_archive::KeyedArchiveError,
    keyed_archive::models::ArchiveValue,
    util::{dates, source::Source},
};

/// The only archive version in the wild
pub const KNOWN_VERSION: u64 = 100_000;

/// Accepted archiver names. `NRKeyedArchiver` is the iOS NanoRegistry
/// archiver, which inherits from `NSKeyedArchiver`
const ARCHIVER_CLASSES: [&str; 2] = ["NSKeyedArchiver", "NRKeyedArchiver"];

/// Classify a candidate dictionary without error: a keyed archive names a
/// known archiver, carries a `$version`, an object table, and a top-level
/// reference mapping. Anything else is simply not an archive.
pub fn is_keyed_archive(plist: &Dictionary) -> bool {
    matches!(
        plist.get("$archiver").and_then(Value::as_string),
        Some(name) if ARCHIVER_CLASSES.contains(&name)
    ) && plist.get("$version").is_some()
        && matches!(plist.get("$objects"), Some(Value::Array(_)))
        && matches!(plist.get("$top"), Some(Value::Dictionary(_)))
}

/// Materializes the object graph of a recognized keyed archive
#[derive(Debug)]
pub struct ArchiveReader<'a> {
    /// The parsed archive dictionary
    plist: &'a Dictionary,
    /// Where the archive came from, for diagnostics
    source: Source<'a>,
}

impl<'a> ArchiveReader<'a> {
    pub fn new(plist: &'a Dictionary, source: Source<'a>) -> Self {
        Self { plist, source }
    }

    /// Resolve every `$top` entry into an owned value. UIDs index the
    /// `$objects` table; re-entering a UID already under resolution yields
    /// an [`ArchiveValue::Ref`] marker instead of recursing forever.
    pub fn parse(&self) -> Result<BTreeMap<String, ArchiveValue>, KeyedArchiveError> {
        if !is_keyed_archive(self.plist) {
            return Err(KeyedArchiveError::NotAnArchive);
        }
        let version = self
            .plist
            .get("$version")
            .and_then(Value::as_unsigned_integer);
        if version != Some(KNOWN_VERSION) {
            return Err(KeyedArchiveError::UnsupportedVersion(
                version.unwrap_or_default(),
            ));
        }

        // The structure checks in is_keyed_archive guarantee both shapes
        let objects = match self.plist.get("$objects") {
            Some(Value::Array(objects)) => objects.as_slice(),
            _ => return Err(KeyedArchiveError::NotAnArchive),
        };
        let top = match self.plist.get("$top") {
            Some(Value::Dictionary(top)) => top,
            _ => return Err(KeyedArchiveError::NotAnArchive),
        };

        let mut resolved = BTreeMap::new();
        let mut active = Vec::new();
        for (name, value) in top.iter() {
            resolved.insert(name.to_string(), self.resolve(objects, value, &mut active)?);
        }
        Ok(resolved)
    }

    /// Resolve a single plist value from the object table
    fn resolve(
        &self,
        objects: &'a [Value],
        value: &'a Value,
        active: &mut Vec<u64>,
    ) -> Result<ArchiveValue, KeyedArchiveError> {
        Ok(match value {
            Value::Uid(uid) => return self.resolve_uid(objects, uid.get(), active),
            Value::String(text) => {
                if text == "$null" {
                    ArchiveValue::Null
                } else {
                    ArchiveValue::String(text.clone())
                }
            }
            Value::Boolean(value) => ArchiveValue::Bool(*value),
            Value::Integer(value) => match value.as_signed() {
                Some(signed) => ArchiveValue::Integer(signed),
                None => ArchiveValue::Unsigned(value.as_unsigned().unwrap_or_default()),
            },
            Value::Real(value) => ArchiveValue::Real(*value),
            Value::Data(bytes) => ArchiveValue::Data(bytes.clone()),
            Value::Date(date) => {
                ArchiveValue::Date(DateTime::<Utc>::from(SystemTime::from(date.clone())))
            }
            Value::Array(members) => {
                let mut items = Vec::with_capacity(members.len());
                for member in members {
                    items.push(self.resolve(objects, member, active)?);
                }
                ArchiveValue::Array(items)
            }
            Value::Dictionary(dict) => return self.resolve_dict(objects, dict, active),
            other => {
                warn!("Unexpected plist value in archive from {}: {other:?}", self.source);
                ArchiveValue::Null
            }
        })
    }

    /// Follow a UID into the object table, breaking cycles with a marker
    fn resolve_uid(
        &self,
        objects: &'a [Value],
        uid: u64,
        active: &mut Vec<u64>,
    ) -> Result<ArchiveValue, KeyedArchiveError> {
        let index = usize::try_from(uid)
            .ok()
            .filter(|index| *index < objects.len())
            .ok_or(KeyedArchiveError::InvalidUid(uid, objects.len()))?;
        if active.contains(&uid) {
            return Ok(ArchiveValue::Ref(uid));
        }
        active.push(uid);
        let resolved = self.resolve(objects, &objects[index], active);
        active.pop();
        resolved
    }

    /// Resolve a dictionary slot: a class definition, an archived class
    /// instance, or a plain mapping
    fn resolve_dict(
        &self,
        objects: &'a [Value],
        dict: &'a Dictionary,
        active: &mut Vec<u64>,
    ) -> Result<ArchiveValue, KeyedArchiveError> {
        if let Some(name) = dict.get("$classname").and_then(Value::as_string) {
            return Ok(ArchiveValue::Class(name.to_string()));
        }
        if let Some(class_value) = dict.get("$class") {
            let class_name = match self.resolve(objects, class_value, active)? {
                ArchiveValue::Class(name) => name,
                other => {
                    warn!(
                        "$class in {} does not reference a class definition: {other:?}",
                        self.source
                    );
                    return self.resolve_unknown(objects, "", dict, active);
                }
            };
            return self.resolve_instance(objects, &class_name, dict, active);
        }
        self.resolve_plain_dict(objects, dict, active)
    }

    /// Resolve a mapping with no archived class attached
    fn resolve_plain_dict(
        &self,
        objects: &'a [Value],
        dict: &'a Dictionary,
        active: &mut Vec<u64>,
    ) -> Result<ArchiveValue, KeyedArchiveError> {
        let mut out = BTreeMap::new();
        for (key, value) in dict.iter() {
            out.insert(key.to_string(), self.resolve(objects, value, active)?);
        }
        Ok(ArchiveValue::Dictionary(out))
    }

    /// Decode an archived instance of a known Foundation class, or preserve
    /// the fields of one this decoder does not know
    fn resolve_instance(
        &self,
        objects: &'a [Value],
        class_name: &str,
        dict: &'a Dictionary,
        active: &mut Vec<u64>,
    ) -> Result<ArchiveValue, KeyedArchiveError> {
        match class_name {
            "NSDictionary" | "NSMutableDictionary" => {
                match (dict.get("NS.keys"), dict.get("NS.objects")) {
                    (Some(Value::Array(keys)), Some(Value::Array(values))) => {
                        if keys.len() != values.len() {
                            warn!(
                                "Archived dictionary in {} has {} keys but {} values",
                                self.source,
                                keys.len(),
                                values.len()
                            );
                        }
                        let mut out = BTreeMap::new();
                        for (key, value) in keys.iter().zip(values.iter()) {
                            let key = key_string(&self.resolve(objects, key, active)?);
                            out.insert(key, self.resolve(objects, value, active)?);
                        }
                        Ok(ArchiveValue::Dictionary(out))
                    }
                    _ => self.resolve_unknown(objects, class_name, dict, active),
                }
            }
            "NSArray" | "NSMutableArray" | "NSSet" | "NSMutableSet" => {
                match dict.get("NS.objects") {
                    Some(Value::Array(members)) => {
                        let mut items = Vec::with_capacity(members.len());
                        for member in members {
                            items.push(self.resolve(objects, member, active)?);
                        }
                        Ok(ArchiveValue::Array(items))
                    }
                    _ => self.resolve_unknown(objects, class_name, dict, active),
                }
            }
            "NSString" | "NSMutableString" => match dict.get("NS.string") {
                Some(value) => self.resolve(objects, value, active),
                None => Ok(ArchiveValue::Null),
            },
            "NSData" | "NSMutableData" => match dict.get("NS.data") {
                // An archive can nest a complete second archive in its data
                Some(Value::Dictionary(nested)) if is_keyed_archive(nested) => {
                    match ArchiveReader::new(nested, self.source).parse() {
                        Ok(map) => Ok(ArchiveValue::Dictionary(map)),
                        Err(why) => {
                            warn!(
                                "Could not resolve archive nested in NSData from {}: {why}",
                                self.source
                            );
                            self.resolve_plain_dict(objects, nested, active)
                        }
                    }
                }
                Some(value) => self.resolve(objects, value, active),
                None => Ok(ArchiveValue::Null),
            },
            "NSDate" => {
                let seconds = dict.get("NS.time").and_then(|value| {
                    value
                        .as_real()
                        .or_else(|| value.as_signed_integer().map(|seconds| seconds as f64))
                });
                Ok(match seconds.and_then(dates::from_mac_absolute_time) {
                    Some(date) => ArchiveValue::Date(date),
                    None => ArchiveValue::Null,
                })
            }
            "NSNull" => Ok(ArchiveValue::Null),
            "NSURL" => {
                let base = text_of(self.resolve_key(objects, dict, "NS.base", active)?);
                let relative = text_of(self.resolve_key(objects, dict, "NS.relative", active)?);
                let parts: Vec<String> = [base, relative]
                    .into_iter()
                    .flatten()
                    .filter(|part| !part.is_empty())
                    .collect();
                Ok(ArchiveValue::String(parts.join("/")))
            }
            "NSUUID" => match dict.get("NS.uuidbytes") {
                Some(Value::Data(bytes)) if bytes.len() == 16 => {
                    match Uuid::from_slice(bytes) {
                        Ok(uuid) => Ok(ArchiveValue::String(uuid.to_string())),
                        Err(_) => Ok(ArchiveValue::Data(bytes.clone())),
                    }
                }
                Some(value) => self.resolve(objects, value, active),
                None => Ok(ArchiveValue::Null),
            },
            "NSAttributedString" | "NSMutableAttributedString" => {
                self.resolve_key(objects, dict, "NSString", active)
            }
            "NSValue" => match dict.get("NS.special").and_then(Value::as_unsigned_integer) {
                // Special type 4 is an NSRange
                Some(4) => {
                    let mut range = BTreeMap::new();
                    range.insert(
                        "length".to_string(),
                        self.resolve_key(objects, dict, "NS.rangeval.length", active)?,
                    );
                    range.insert(
                        "location".to_string(),
                        self.resolve_key(objects, dict, "NS.rangeval.location", active)?,
                    );
                    Ok(ArchiveValue::Dictionary(range))
                }
                Some(other) => {
                    warn!(
                        "Unsupported NSValue special type {other} in archive from {}",
                        self.source
                    );
                    Ok(ArchiveValue::Null)
                }
                None => {
                    warn!(
                        "Unsupported NSConcreteValue in archive from {}",
                        self.source
                    );
                    Ok(ArchiveValue::Null)
                }
            },
            "SFLListItem" => {
                let mut fields = BTreeMap::new();
                for (key, out_name) in [
                    ("URL", "url"),
                    ("bookmark", "bookmark"),
                    ("name", "name"),
                    ("order", "order"),
                    ("uniqueIdentifier", "uuid"),
                ] {
                    fields.insert(
                        out_name.to_string(),
                        self.resolve_key(objects, dict, key, active)?,
                    );
                }
                Ok(ArchiveValue::Dictionary(fields))
            }
            _ => self.resolve_unknown(objects, class_name, dict, active),
        }
    }

    /// Preserve the decoded fields of a class this decoder does not know
    fn resolve_unknown(
        &self,
        objects: &'a [Value],
        class_name: &str,
        dict: &'a Dictionary,
        active: &mut Vec<u64>,
    ) -> Result<ArchiveValue, KeyedArchiveError> {
        if !class_name.is_empty() {
            warn!(
                "Unknown archived class {class_name} in {}; keeping raw fields",
                self.source
            );
        }
        let mut fields = BTreeMap::new();
        for (key, value) in dict.iter() {
            if key == "$class" {
                continue;
            }
            fields.insert(key.to_string(), self.resolve(objects, value, active)?);
        }
        Ok(ArchiveValue::Unresolved {
            class: class_name.to_string(),
            fields,
        })
    }

    /// Resolve a named field of an archived instance, `Null` when absent
    fn resolve_key(
        &self,
        objects: &'a [Value],
        dict: &'a Dictionary,
        key: &str,
        active: &mut Vec<u64>,
    ) -> Result<ArchiveValue, KeyedArchiveError> {
        match dict.get(key) {
            Some(value) => self.resolve(objects, value, active),
            None => Ok(ArchiveValue::Null),
        }
    }
}

/// Dictionary keys materialize as strings; non-string keys use their
/// display form
fn key_string(key: &ArchiveValue) -> String {
    match key {
        ArchiveValue::String(text) => text.clone(),
        ArchiveValue::Integer(value) => value.to_string(),
        ArchiveValue::Unsigned(value) => value.to_string(),
        ArchiveValue::Real(value) => value.to_string(),
        ArchiveValue::Bool(value) => value.to_string(),
        ArchiveValue::Null => "$null".to_string(),
        other => format!("{other:?}"),
    }
}

/// Extract string content, dropping anything else
fn text_of(value: ArchiveValue) -> Option<String> {
    match value {
        ArchiveValue::String(text) => Some(text),
        _ => None,
    }
}

#[cfg(test)]
mod parser_tests {
    use std::collections::BTreeMap;

    use plist::{Dictionary, Uid, Value};

    use crate::{
        error::keyed_archive::KeyedArchiveError,
        keyed_archive::{
            models::ArchiveValue,
            parser::{is_keyed_archive, ArchiveReader},
        },
        util::source::Source,
    };
    use chrono::{TimeZone, Utc};

    fn uid(value: u64) -> Value {
        Value::Uid(Uid::new(value))
    }

    fn class_def(name: &str) -> Value {
        let mut class = Dictionary::new();
        class.insert("$classname".to_string(), Value::String(name.to_string()));
        class.insert(
            "$classes".to_string(),
            Value::Array(vec![
                Value::String(name.to_string()),
                Value::String("NSObject".to_string()),
            ]),
        );
        Value::Dictionary(class)
    }

    fn archive(objects: Vec<Value>, top: Vec<(&str, Value)>) -> Dictionary {
        let mut plist = Dictionary::new();
        plist.insert(
            "$archiver".to_string(),
            Value::String("NSKeyedArchiver".to_string()),
        );
        plist.insert("$version".to_string(), Value::from(100_000u64));
        plist.insert("$objects".to_string(), Value::Array(objects));
        let mut top_dict = Dictionary::new();
        for (name, value) in top {
            top_dict.insert(name.to_string(), value);
        }
        plist.insert("$top".to_string(), Value::Dictionary(top_dict));
        plist
    }

    fn parse(plist: &Dictionary) -> Result<BTreeMap<String, ArchiveValue>, KeyedArchiveError> {
        ArchiveReader::new(plist, Source::default()).parse()
    }

    #[test]
    fn can_recognize_archives() {
        let plist = archive(vec![Value::String("$null".to_string())], vec![]);
        assert!(is_keyed_archive(&plist));

        let mut broken = plist.clone();
        broken.remove("$archiver");
        assert!(!is_keyed_archive(&broken));
        assert!(matches!(
            parse(&broken),
            Err(KeyedArchiveError::NotAnArchive)
        ));
    }

    #[test]
    fn unknown_version_is_unsupported() {
        let mut plist = archive(vec![Value::String("$null".to_string())], vec![]);
        plist.insert("$version".to_string(), Value::from(99_999u64));

        assert!(is_keyed_archive(&plist));
        assert!(matches!(
            parse(&plist),
            Err(KeyedArchiveError::UnsupportedVersion(99_999))
        ));
    }

    #[test]
    fn can_resolve_archived_dictionary() {
        let mut instance = Dictionary::new();
        instance.insert("$class".to_string(), uid(4));
        instance.insert("NS.keys".to_string(), Value::Array(vec![uid(2)]));
        instance.insert("NS.objects".to_string(), Value::Array(vec![uid(3)]));
        let plist = archive(
            vec![
                Value::String("$null".to_string()),
                Value::Dictionary(instance),
                Value::String("name".to_string()),
                Value::String("Alice".to_string()),
                class_def("NSDictionary"),
            ],
            vec![("root", uid(1))],
        );

        let resolved = parse(&plist).unwrap();
        let mut expected = BTreeMap::new();
        expected.insert(
            "name".to_string(),
            ArchiveValue::String("Alice".to_string()),
        );
        assert_eq!(
            resolved.get("root"),
            Some(&ArchiveValue::Dictionary(expected))
        );

        // Same buffer, same graph
        assert_eq!(parse(&plist).unwrap(), resolved);
    }

    #[test]
    fn mutual_references_resolve_with_markers() {
        let mut first = Dictionary::new();
        first.insert("$class".to_string(), uid(3));
        first.insert("NS.objects".to_string(), Value::Array(vec![uid(2)]));
        let mut second = Dictionary::new();
        second.insert("$class".to_string(), uid(3));
        second.insert("NS.objects".to_string(), Value::Array(vec![uid(1)]));
        let plist = archive(
            vec![
                Value::String("$null".to_string()),
                Value::Dictionary(first),
                Value::Dictionary(second),
                class_def("NSArray"),
            ],
            vec![("a", uid(1)), ("b", uid(2))],
        );

        let resolved = parse(&plist).unwrap();
        assert_eq!(
            resolved.get("a"),
            Some(&ArchiveValue::Array(vec![ArchiveValue::Array(vec![
                ArchiveValue::Ref(1)
            ])]))
        );
        assert_eq!(
            resolved.get("b"),
            Some(&ArchiveValue::Array(vec![ArchiveValue::Array(vec![
                ArchiveValue::Ref(2)
            ])]))
        );
    }

    #[test]
    fn null_uid_resolves_to_null() {
        let plist = archive(
            vec![Value::String("$null".to_string())],
            vec![("root", uid(0))],
        );

        assert_eq!(parse(&plist).unwrap().get("root"), Some(&ArchiveValue::Null));
    }

    #[test]
    fn dangling_uid_is_structural() {
        let plist = archive(
            vec![Value::String("$null".to_string())],
            vec![("root", uid(7))],
        );

        assert!(matches!(
            parse(&plist),
            Err(KeyedArchiveError::InvalidUid(7, 1))
        ));
    }

    #[test]
    fn can_resolve_archived_string_and_date() {
        let mut string = Dictionary::new();
        string.insert("$class".to_string(), uid(2));
        string.insert(
            "NS.string".to_string(),
            Value::String("hello".to_string()),
        );
        let mut date = Dictionary::new();
        date.insert("$class".to_string(), uid(4));
        date.insert("NS.time".to_string(), Value::Real(86_400.0));
        let plist = archive(
            vec![
                Value::String("$null".to_string()),
                Value::Dictionary(string),
                class_def("NSMutableString"),
                Value::Dictionary(date),
                class_def("NSDate"),
            ],
            vec![("text", uid(1)), ("stamp", uid(3))],
        );

        let resolved = parse(&plist).unwrap();
        assert_eq!(
            resolved.get("text"),
            Some(&ArchiveValue::String("hello".to_string()))
        );
        assert_eq!(
            resolved.get("stamp"),
            Some(&ArchiveValue::Date(
                Utc.with_ymd_and_hms(2001, 1, 2, 0, 0, 0).unwrap()
            ))
        );
    }

    #[test]
    fn can_resolve_url_and_uuid() {
        let mut url = Dictionary::new();
        url.insert("$class".to_string(), uid(4));
        url.insert("NS.base".to_string(), uid(2));
        url.insert("NS.relative".to_string(), uid(3));
        let mut unique = Dictionary::new();
        unique.insert("$class".to_string(), uid(6));
        unique.insert(
            "NS.uuidbytes".to_string(),
            Value::Data(vec![
                0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC,
                0xDD, 0xEE, 0xFF,
            ]),
        );
        let plist = archive(
            vec![
                Value::String("$null".to_string()),
                Value::Dictionary(url),
                Value::String("file:///Users".to_string()),
                Value::String("alice".to_string()),
                class_def("NSURL"),
                Value::Dictionary(unique),
                class_def("NSUUID"),
            ],
            vec![("url", uid(1)), ("uuid", uid(5))],
        );

        let resolved = parse(&plist).unwrap();
        assert_eq!(
            resolved.get("url"),
            Some(&ArchiveValue::String("file:///Users/alice".to_string()))
        );
        assert_eq!(
            resolved.get("uuid"),
            Some(&ArchiveValue::String(
                "00112233-4455-6677-8899-aabbccddeeff".to_string()
            ))
        );
    }

    #[test]
    fn unknown_class_keeps_raw_fields() {
        let mut instance = Dictionary::new();
        instance.insert("$class".to_string(), uid(2));
        instance.insert("score".to_string(), Value::from(42u64));
        let plist = archive(
            vec![
                Value::String("$null".to_string()),
                Value::Dictionary(instance),
                class_def("GameState"),
            ],
            vec![("root", uid(1))],
        );

        let resolved = parse(&plist).unwrap();
        let mut fields = BTreeMap::new();
        fields.insert("score".to_string(), ArchiveValue::Integer(42));
        assert_eq!(
            resolved.get("root"),
            Some(&ArchiveValue::Unresolved {
                class: "GameState".to_string(),
                fields,
            })
        );
    }

    #[test]
    fn plain_dictionary_resolves_without_class() {
        let mut plain = Dictionary::new();
        plain.insert("inner".to_string(), uid(2));
        let plist = archive(
            vec![
                Value::String("$null".to_string()),
                Value::Dictionary(plain),
                Value::String("value".to_string()),
            ],
            vec![("root", uid(1))],
        );

        let resolved = parse(&plist).unwrap();
        let mut expected = BTreeMap::new();
        expected.insert(
            "inner".to_string(),
            ArchiveValue::String("value".to_string()),
        );
        assert_eq!(
            resolved.get("root"),
            Some(&ArchiveValue::Dictionary(expected))
        );
    }
}
