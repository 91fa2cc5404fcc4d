//! Conversion modes and the chain configuration they resolve from.
//!
//! A chain configuration is a JSON document per mode:
//!
//! ```json
//! {
//!   "name": "Simplified Chinese to Traditional Chinese",
//!   "conversion_chain": [
//!     { "dict": { "type": "group", "dicts": [
//!         { "type": "txt", "file": "STPhrases.txt" },
//!         { "type": "txt", "file": "STCharacters.txt" }
//!     ] } }
//!   ]
//! }
//! ```
//!
//! Documents are deserialized into [`ChainConfig`] and validated before any
//! dictionary is built. The crate embeds one document per [`ConversionMode`];
//! [`ConfigSource::Directory`] reads `<mode>.json` from a directory instead.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::{OpenCCError, Result};

/// The closed set of supported conversion modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionMode {
    /// Simplified Chinese to Traditional Chinese
    S2T,
    /// Traditional Chinese to Simplified Chinese
    T2S,
    /// Simplified Chinese to Traditional Chinese (Taiwan Standard)
    S2Tw,
    /// Traditional Chinese (Taiwan Standard) to Simplified Chinese
    Tw2S,
    /// Simplified Chinese to Traditional Chinese (Hong Kong variant)
    S2Hk,
    /// Traditional Chinese (Hong Kong variant) to Simplified Chinese
    Hk2S,
    /// Simplified Chinese to Traditional Chinese (Taiwan Standard) with Taiwanese idiom
    S2Twp,
    /// Traditional Chinese (Taiwan Standard) to Simplified Chinese with Mainland idiom
    Tw2Sp,
    /// Traditional Chinese (OpenCC Standard) to Taiwan Standard
    T2Tw,
    /// Traditional Chinese (Hong Kong variant) to Traditional Chinese
    Hk2T,
    /// Traditional Chinese (OpenCC Standard) to Hong Kong variant
    T2Hk,
    /// Traditional Chinese characters (Kyūjitai) to New Japanese Kanji (Shinjitai)
    T2Jp,
    /// New Japanese Kanji (Shinjitai) to Traditional Chinese characters (Kyūjitai)
    Jp2T,
    /// Traditional Chinese (Taiwan Standard) to Traditional Chinese
    Tw2T,
}

static SUPPORTED_MODES: Lazy<String> = Lazy::new(|| {
    ConversionMode::ALL
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
});

impl ConversionMode {
    pub const ALL: [ConversionMode; 14] = [
        ConversionMode::S2T,
        ConversionMode::T2S,
        ConversionMode::S2Tw,
        ConversionMode::Tw2S,
        ConversionMode::S2Hk,
        ConversionMode::Hk2S,
        ConversionMode::S2Twp,
        ConversionMode::Tw2Sp,
        ConversionMode::T2Tw,
        ConversionMode::Hk2T,
        ConversionMode::T2Hk,
        ConversionMode::T2Jp,
        ConversionMode::Jp2T,
        ConversionMode::Tw2T,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConversionMode::S2T => "s2t",
            ConversionMode::T2S => "t2s",
            ConversionMode::S2Tw => "s2tw",
            ConversionMode::Tw2S => "tw2s",
            ConversionMode::S2Hk => "s2hk",
            ConversionMode::Hk2S => "hk2s",
            ConversionMode::S2Twp => "s2twp",
            ConversionMode::Tw2Sp => "tw2sp",
            ConversionMode::T2Tw => "t2tw",
            ConversionMode::Hk2T => "hk2t",
            ConversionMode::T2Hk => "t2hk",
            ConversionMode::T2Jp => "t2jp",
            ConversionMode::Jp2T => "jp2t",
            ConversionMode::Tw2T => "tw2t",
        }
    }

    /// Comma-separated list of every supported mode name.
    pub fn supported_list() -> &'static str {
        SUPPORTED_MODES.as_str()
    }

    fn builtin_config(self) -> &'static str {
        match self {
            ConversionMode::S2T => include_str!("configs/s2t.json"),
            ConversionMode::T2S => include_str!("configs/t2s.json"),
            ConversionMode::S2Tw => include_str!("configs/s2tw.json"),
            ConversionMode::Tw2S => include_str!("configs/tw2s.json"),
            ConversionMode::S2Hk => include_str!("configs/s2hk.json"),
            ConversionMode::Hk2S => include_str!("configs/hk2s.json"),
            ConversionMode::S2Twp => include_str!("configs/s2twp.json"),
            ConversionMode::Tw2Sp => include_str!("configs/tw2sp.json"),
            ConversionMode::T2Tw => include_str!("configs/t2tw.json"),
            ConversionMode::Hk2T => include_str!("configs/hk2t.json"),
            ConversionMode::T2Hk => include_str!("configs/t2hk.json"),
            ConversionMode::T2Jp => include_str!("configs/t2jp.json"),
            ConversionMode::Jp2T => include_str!("configs/jp2t.json"),
            ConversionMode::Tw2T => include_str!("configs/tw2t.json"),
        }
    }
}

impl FromStr for ConversionMode {
    type Err = OpenCCError;

    fn from_str(s: &str) -> Result<Self> {
        ConversionMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| OpenCCError::UnsupportedMode {
                mode: s.to_string(),
                supported: SUPPORTED_MODES.clone(),
            })
    }
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of the conversion chain: a dictionary resource or a group of nodes.
///
/// In JSON a node is an object tagged by `type`: `"txt"` (or `"text"`, `"leaf"`)
/// with a `file`, or `"group"` with a `dicts` list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawNode")]
pub enum DictNode {
    /// A single dictionary resource, e.g. `STPhrases.txt`.
    Leaf { file: String },

    /// Child nodes merged, in order, into one pipeline stage.
    Group { dicts: Vec<DictNode> },
}

/// Wire shape of a [`DictNode`].
///
/// A plain struct rather than an internally tagged enum, so serde never buffers
/// the subtree and every nesting level is read straight from the JSON stream.
#[derive(Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: String,
    file: Option<String>,
    dicts: Option<Vec<DictNode>>,
}

impl TryFrom<RawNode> for DictNode {
    type Error = String;

    fn try_from(raw: RawNode) -> std::result::Result<Self, String> {
        match raw.kind.as_str() {
            "txt" | "text" | "leaf" => raw
                .file
                .map(|file| DictNode::Leaf { file })
                .ok_or_else(|| "missing field `file`".to_string()),
            "group" => raw
                .dicts
                .map(|dicts| DictNode::Group { dicts })
                .ok_or_else(|| "missing field `dicts`".to_string()),
            other => Err(format!(
                "unknown node type `{other}`, expected `txt` or `group`"
            )),
        }
    }
}

impl DictNode {
    /// Leaf resource identifiers below this node, depth-first, left to right.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Checks that every group is non-empty and every leaf names a resource.
    ///
    /// `path` prefixes the location reported in a `MalformedConfig` error.
    pub fn validate(&self, path: &str) -> Result<()> {
        let mut pending = vec![(self, path.to_string())];

        while let Some((node, path)) = pending.pop() {
            match node {
                DictNode::Leaf { file } => {
                    if file.trim().is_empty() {
                        return Err(OpenCCError::malformed(
                            format!("{path}.file"),
                            "resource identifier must not be blank",
                        ));
                    }
                }
                DictNode::Group { dicts } => {
                    if dicts.is_empty() {
                        return Err(OpenCCError::malformed(
                            format!("{path}.dicts"),
                            "group must contain at least one dictionary",
                        ));
                    }
                    for (i, child) in dicts.iter().enumerate().rev() {
                        pending.push((child, format!("{path}.dicts[{i}]")));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Depth-first iterator over the leaf resources of a [`DictNode`].
pub struct Leaves<'a> {
    stack: Vec<&'a DictNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while let Some(node) = self.stack.pop() {
            match node {
                DictNode::Leaf { file } => return Some(file.as_str()),
                DictNode::Group { dicts } => self.stack.extend(dicts.iter().rev()),
            }
        }
        None
    }
}

/// One entry of `conversion_chain`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainEntry {
    pub dict: DictNode,
}

/// A parsed conversion configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainConfig {
    /// Human-readable description of the mode.
    pub name: String,
    /// Ordered pipeline stages.
    pub conversion_chain: Vec<ChainEntry>,
}

impl ChainConfig {
    /// Parses and validates a JSON document.
    ///
    /// `source` names the document in error messages (usually its file name).
    /// Groups may nest to any depth; the parser grows its stack on demand.
    pub fn from_json(source: &str, json: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();

        let config: ChainConfig =
            serde_path_to_error::deserialize(serde_stacker::Deserializer::new(&mut de))
                .map_err(|err| {
                    let path = match err.path().to_string() {
                        p if p == "." => source.to_string(),
                        p => format!("{source}: {p}"),
                    };
                    OpenCCError::malformed(path, err.into_inner().to_string())
                })?;
        de.end()
            .map_err(|err| OpenCCError::malformed(source, err.to_string()))?;

        config.validate(source)?;
        Ok(config)
    }

    /// Loads the configuration document for `mode` from `source`.
    pub fn load(mode: ConversionMode, source: &ConfigSource) -> Result<Self> {
        match source {
            ConfigSource::Embedded => {
                Self::from_json(&format!("{mode}.json"), mode.builtin_config())
            }
            ConfigSource::Directory(dir) => {
                let path = dir.join(format!("{mode}.json"));
                let json = fs::read_to_string(&path).map_err(|source| OpenCCError::ConfigIo {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_json(&path.display().to_string(), &json)
            }
        }
    }

    pub fn validate(&self, source: &str) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(OpenCCError::malformed(
                format!("{source}: name"),
                "description must not be blank",
            ));
        }
        if self.conversion_chain.is_empty() {
            return Err(OpenCCError::malformed(
                format!("{source}: conversion_chain"),
                "chain must contain at least one stage",
            ));
        }
        for (i, entry) in self.conversion_chain.iter().enumerate() {
            entry
                .dict
                .validate(&format!("{source}: conversion_chain[{i}].dict"))?;
        }
        Ok(())
    }

    /// Every leaf resource of the chain, stage by stage, depth-first.
    pub fn resources(&self) -> Vec<&str> {
        self.conversion_chain
            .iter()
            .flat_map(|entry| entry.dict.leaves())
            .collect()
    }
}

/// Where chain configuration documents come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// The documents compiled into the crate.
    #[default]
    Embedded,
    /// `<mode>.json` files in a directory.
    Directory(PathBuf),
}

/// Explicit resource locations for [`crate::OpenCC::with_options`].
///
/// Nothing here is read from the environment. A relative `dict_dir` or config
/// directory is resolved against the process working directory at construction time,
/// so pass absolute paths when the caller's location is not fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    pub config_source: ConfigSource,
    pub dict_dir: PathBuf,
}

impl ConverterOptions {
    /// Dictionary directory used by [`ConverterOptions::default`], relative to the
    /// working directory.
    pub const DEFAULT_DICT_DIR: &'static str = "dicts";

    pub fn new<P: Into<PathBuf>>(dict_dir: P) -> Self {
        Self {
            config_source: ConfigSource::Embedded,
            dict_dir: dict_dir.into(),
        }
    }

    pub fn with_config_dir<P: Into<PathBuf>>(mut self, config_dir: P) -> Self {
        self.config_source = ConfigSource::Directory(config_dir.into());
        self
    }
}

/// Embedded configurations and `./dicts` ([`ConverterOptions::DEFAULT_DICT_DIR`]),
/// resolved against the current working directory.
impl Default for ConverterOptions {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DICT_DIR)
    }
}
