//! Content-addressed entity identifiers.
//!
//! Every entity the pipeline emits (models, datasets, keywords, licenses,
//! …) is named by [`make_id`]: a SHA-256 digest over a canonical
//! encoding of `{platform, type, id}`, appended to [`ID_PREFIX`].
//!
//! The canonical encoding is sorted-key JSON with `", "` / `": "`
//! separators and every non-ASCII character escaped as `\uXXXX`. The
//! exact bytes matter: identifiers already persisted in the graph were
//! computed from this form, so any change here orphans them.
//!
//! # Example
//!
//! ```rust
//! use mlentory_core::identity::make_id;
//!
//! let id = make_id("Keyword", "dog", Some("OpenML"));
//! assert_eq!(
//!     id,
//!     "https://w3id.org/mlentory/mlentory_graph/\
//!      7e7a179555372f5da039b029951f31caee6da0f7fc74e7bd116bc81467c962fc"
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;
use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use sha2::{Digest, Sha256};

/// Namespace every identifier lives under.
pub const ID_PREFIX: &str = "https://w3id.org/mlentory/mlentory_graph/";

/// Platform tag used when the caller has none.
pub const DEFAULT_PLATFORM: &str = "generic";

/// Build the identifier for `(entity_type, entity_id, platform)`.
///
/// `entity_id` is rendered through its `Display` impl before hashing, so
/// `make_id("Keyword", 42, ..)` and `make_id("Keyword", "42", ..)` agree.
/// A `None` platform hashes as [`DEFAULT_PLATFORM`].
pub fn make_id(entity_type: &str, entity_id: impl Display, platform: Option<&str>) -> String {
    let entity_id = entity_id.to_string();
    let mut fields = BTreeMap::new();
    fields.insert("platform", platform.unwrap_or(DEFAULT_PLATFORM));
    fields.insert("type", entity_type);
    fields.insert("id", entity_id.as_str());

    let digest = Sha256::digest(canonical_bytes(&fields));
    format!("{}{}", ID_PREFIX, hex::encode(digest))
}

/// Strip [`ID_PREFIX`] and return the 64-char digest, if `id` is one of ours.
pub fn digest_of(id: &str) -> Option<&str> {
    let digest = id.strip_prefix(ID_PREFIX)?;
    let well_formed = digest.len() == 64
        && digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    well_formed.then_some(digest)
}

fn canonical_bytes(fields: &BTreeMap<&str, &str>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(96);
    let mut ser = Serializer::with_formatter(&mut buf, CanonicalFormatter);
    fields
        .serialize(&mut ser)
        .expect("serializing a string map into memory cannot fail");
    buf
}

/// JSON formatter reproducing the legacy canonical form.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}
