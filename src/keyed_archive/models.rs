/*!
 Data structures produced by materializing an `NSKeyedArchiver` object graph.
*/

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A value materialized from the archive's flat object table.
///
/// Scalar slots resolve directly; collections resolve their UID references
/// recursively. Values this decoder cannot fully interpret keep their
/// decoded fields in [`ArchiveValue::Unresolved`] instead of failing the
/// archive.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveValue {
    /// The canonical null value (`"$null"`, conventionally UID 0)
    Null,
    Bool(bool),
    /// Signed integer types are coerced into this container
    Integer(i64),
    /// Unsigned integers too large for [`ArchiveValue::Integer`]
    Unsigned(u64),
    Real(f64),
    String(String),
    Data(Vec<u8>),
    Date(DateTime<Utc>),
    Array(Vec<ArchiveValue>),
    /// A mapping; plain plist dictionaries and archived `NSDictionary`
    /// instances both materialize here, keyed by the display form of the key
    Dictionary(BTreeMap<String, ArchiveValue>),
    /// A class definition slot (`$classname`)
    Class(String),
    /// Non-owning back-reference to a UID that is still being resolved,
    /// produced when the graph re-enters itself
    Ref(u64),
    /// An instance of a class this decoder does not recognize, with its
    /// archived fields decoded and preserved
    Unresolved {
        class: String,
        fields: BTreeMap<String, ArchiveValue>,
    },
}
