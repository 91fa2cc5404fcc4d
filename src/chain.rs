//! Chain resolution: a validated [`ChainConfig`] becomes an ordered list of
//! [`StageGroup`]s, each holding freshly built dictionary handles.
//!
//! Every leaf of a stage's node tree is built exactly once, in depth-first,
//! left-to-right order, and the handles are flattened into that stage's group.
//! A resource named twice is built twice. The first build failure aborts the
//! whole resolution.

use std::fmt;

use log::{debug, trace};

use crate::config::{ChainConfig, ConversionMode};
use crate::dictionary_lib::{DictionaryBuilder, PrefixMatcher};
use crate::error::{OpenCCError, Result};

/// One pipeline stage: dictionaries tried in priority order at every position.
///
/// `files` records the resource identifiers the handles were built from, index for
/// index with `dicts`.
pub struct StageGroup {
    files: Vec<String>,
    dicts: Vec<Box<dyn PrefixMatcher>>,
}

impl StageGroup {
    /// Builds a group from `(resource id, handle)` pairs in priority order.
    ///
    /// Returns `None` for an empty iterator: a stage needs at least one dictionary.
    pub fn from_dicts<I>(dicts: I) -> Option<Self>
    where
        I: IntoIterator<Item = (String, Box<dyn PrefixMatcher>)>,
    {
        let (files, dicts): (Vec<_>, Vec<_>) = dicts.into_iter().unzip();
        if dicts.is_empty() {
            return None;
        }
        Some(Self { files, dicts })
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn dicts(&self) -> &[Box<dyn PrefixMatcher>] {
        &self.dicts
    }

    pub fn len(&self) -> usize {
        self.dicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dicts.is_empty()
    }
}

impl fmt::Debug for StageGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageGroup")
            .field("files", &self.files)
            .finish()
    }
}

impl fmt::Display for StageGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.files.join(" "))
    }
}

/// A resolved conversion mode: description plus ordered stages.
///
/// Immutable once built and safe to share between threads; conversion only reads it.
pub struct ConversionProfile {
    mode: ConversionMode,
    description: String,
    stages: Vec<StageGroup>,
}

impl ConversionProfile {
    /// Assembles a profile from already built stages.
    ///
    /// Returns `None` when `stages` is empty: a profile runs at least one stage.
    pub fn new(
        mode: ConversionMode,
        description: impl Into<String>,
        stages: Vec<StageGroup>,
    ) -> Option<Self> {
        if stages.is_empty() {
            return None;
        }
        Some(Self {
            mode,
            description: description.into(),
            stages,
        })
    }

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn stages(&self) -> &[StageGroup] {
        &self.stages
    }

    /// Runs every stage over `input`; see [`crate::pipeline::convert`].
    pub fn convert(&self, input: &str) -> Result<String> {
        crate::pipeline::convert(self, input)
    }
}

impl fmt::Debug for ConversionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionProfile")
            .field("mode", &self.mode)
            .field("description", &self.description)
            .field("stages", &self.stages)
            .finish()
    }
}

impl fmt::Display for ConversionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.mode, self.description)?;
        for (i, stage) in self.stages.iter().enumerate() {
            let sep = if i == 0 { ": " } else { " -> " };
            write!(f, "{sep}{stage}")?;
        }
        Ok(())
    }
}

/// Resolves `config` into a [`ConversionProfile`] for `mode`.
///
/// The configuration is validated first, so no dictionary is built for a
/// malformed tree. `builder` is invoked once per leaf.
///
/// # Errors
/// - [`OpenCCError::MalformedConfig`] for an invalid tree.
/// - [`OpenCCError::DictionaryBuild`] for the first leaf that fails to build.
pub fn resolve(
    mode: ConversionMode,
    config: &ChainConfig,
    builder: &dyn DictionaryBuilder,
) -> Result<ConversionProfile> {
    config.validate(mode.as_str())?;

    let mut stages = Vec::with_capacity(config.conversion_chain.len());
    for entry in &config.conversion_chain {
        let mut files = Vec::new();
        let mut dicts = Vec::new();

        for resource in entry.dict.leaves() {
            trace!("{mode}: building dictionary {resource}");
            let dict = builder
                .build(resource)
                .map_err(|source| OpenCCError::DictionaryBuild {
                    resource: resource.to_string(),
                    source,
                })?;
            files.push(resource.to_string());
            dicts.push(dict);
        }

        stages.push(StageGroup { files, dicts });
    }

    let profile = ConversionProfile::new(mode, config.name.clone(), stages).ok_or_else(|| {
        OpenCCError::malformed(
            format!("{mode}: conversion_chain"),
            "chain must contain at least one stage",
        )
    })?;
    debug!("resolved {profile}");
    Ok(profile)
}
