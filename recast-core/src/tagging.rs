//! Descriptive tags written into the re-encoded MP4.
//!
//! Tags are merged into the file's `ilst` atom: keys in the [`TagSet`]
//! overwrite existing atoms with the same identifier and every other atom is
//! left alone. Freeform (`----:mean:name`) keys carry raw byte payloads as
//! well as text.

use crate::error::{CoreError, CoreResult};

use lofty::config::{ParseOptions, WriteOptions};
use lofty::mp4::{Atom, AtomData, AtomIdent, Ilst, Mp4File};
use lofty::prelude::*;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Reverse-DNS namespace for QuickTime freeform keys.
pub const QUICKTIME_MEAN: &str = "com.apple.quicktime";

/// `©too`, the encoder/tool description atom.
pub const ENCODER_TOOL_ATOM: [u8; 4] = *b"\xa9too";

/// `nclx` color descriptor: primaries, transfer and matrix all BT.709.
pub const BT709_NCLX_PROFILE: [u8; 11] = [
    0x6E, 0x63, 0x6C, 0x78, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00,
];

/// Data type code for atoms with no declared type ("implicit").
const IMPLICIT_DATA_TYPE: u32 = 0;

/// Identifies a tag in the container's metadata.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagKey {
    /// A standard four-character atom such as `©nam` or `©too`.
    Standard([u8; 4]),
    /// A freeform `----` atom identified by namespace and name.
    Freeform { mean: String, name: String },
}

impl TagKey {
    pub fn freeform(mean: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Freeform {
            mean: mean.into(),
            name: name.into(),
        }
    }

    fn to_atom_ident(&self) -> AtomIdent<'static> {
        match self {
            Self::Standard(fourcc) => AtomIdent::Fourcc(*fourcc),
            Self::Freeform { mean, name } => AtomIdent::Freeform {
                mean: Cow::Owned(mean.clone()),
                name: Cow::Owned(name.clone()),
            },
        }
    }
}

impl std::fmt::Display for TagKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard(fourcc) => {
                let text: String = fourcc.iter().map(|&b| char::from(b)).collect();
                write!(f, "{text}")
            }
            Self::Freeform { mean, name } => write!(f, "----:{mean}:{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Text(String),
    Binary(Vec<u8>),
}

impl TagValue {
    fn to_atom_data(&self) -> AtomData {
        match self {
            Self::Text(text) => AtomData::UTF8(text.clone()),
            Self::Binary(bytes) => AtomData::Unknown {
                code: IMPLICIT_DATA_TYPE,
                data: bytes.clone(),
            },
        }
    }
}

/// In-memory view of a file's tags.
pub type TagMap = BTreeMap<TagKey, TagValue>;

/// Ordered set of tags to merge into a file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSet {
    entries: Vec<(TagKey, TagValue)>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, replacing any earlier value for the same key.
    #[must_use]
    pub fn with(mut self, key: TagKey, value: TagValue) -> Self {
        self.entries.retain(|(existing, _)| *existing != key);
        self.entries.push((key, value));
        self
    }

    /// Tags describing a 4:2:2 10-bit HEVC file with a BT.709 color profile.
    pub fn hevc_422_10bit() -> Self {
        Self::new()
            .with(
                TagKey::Standard(ENCODER_TOOL_ATOM),
                TagValue::Text("HEVC h.265 4:2:2 10-bit".to_string()),
            )
            .with(
                TagKey::freeform(QUICKTIME_MEAN, "ChromaSubsampling"),
                TagValue::Text("4:2:2".to_string()),
            )
            .with(
                TagKey::freeform(QUICKTIME_MEAN, "BitsPerComponent"),
                TagValue::Binary(b"10".to_vec()),
            )
            .with(
                TagKey::freeform(QUICKTIME_MEAN, "ColorProfile"),
                TagValue::Binary(BT709_NCLX_PROFILE.to_vec()),
            )
    }

    pub fn iter(&self) -> impl Iterator<Item = &(TagKey, TagValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges into `tags`; keys in this set win, all others are kept.
    pub fn merge_into(&self, tags: &mut TagMap) {
        for (key, value) in &self.entries {
            tags.insert(key.clone(), value.clone());
        }
    }

    /// Merges into an MP4 `ilst`, replacing atoms with matching identifiers.
    pub fn apply_to_ilst(&self, ilst: &mut Ilst) {
        for (key, value) in &self.entries {
            ilst.replace_atom(Atom::new(key.to_atom_ident(), value.to_atom_data()));
        }
    }
}

/// Writes a [`TagSet`] into a file without discarding its other tags.
pub trait Tagger {
    fn tag(&self, path: &Path, tags: &TagSet) -> CoreResult<()>;
}

/// [`Tagger`] for MP4/MOV containers backed by lofty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mp4Tagger;

impl Mp4Tagger {
    fn read_ilst(path: &Path) -> CoreResult<Ilst> {
        let mut file = File::open(path).map_err(|e| tag_error(path, e))?;
        let mp4 = Mp4File::read_from(&mut file, ParseOptions::new().read_properties(false))
            .map_err(|e| tag_error(path, e))?;

        Ok(match mp4.ilst() {
            Some(ilst) => ilst.clone(),
            None => {
                log::debug!("{} has no ilst atom, starting from an empty one", path.display());
                Ilst::default()
            }
        })
    }
}

impl Tagger for Mp4Tagger {
    fn tag(&self, path: &Path, tags: &TagSet) -> CoreResult<()> {
        log::info!("Updating metadata of {}", path.display());

        let mut ilst = Self::read_ilst(path)?;
        let existing = ilst.len();
        tags.apply_to_ilst(&mut ilst);
        log::debug!(
            "Merged {} tag(s) into {} existing atom(s) for {}",
            tags.len(),
            existing,
            path.display()
        );

        ilst.save_to_path(path, WriteOptions::default())
            .map_err(|e| tag_error(path, e))
    }
}

fn tag_error(path: &Path, reason: impl std::fmt::Display) -> CoreError {
    CoreError::Tag {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
