//! Config-driven OpenCC conversion chains.
//!
//! A conversion mode (`s2t`, `tw2sp`, ...) names a JSON chain configuration. Each
//! entry of the chain is a dictionary node, either a single dictionary resource or a
//! group of nodes, and becomes one pipeline stage. Text is converted stage by stage
//! with greedy longest-prefix replacement.
//!
//! ```no_run
//! use opencc_chain::{ConverterOptions, OpenCC};
//!
//! let opencc = OpenCC::with_options("s2t", &ConverterOptions::new("dicts"))?;
//! assert_eq!(opencc.convert("龙马精神")?, "龍馬精神");
//! # Ok::<(), opencc_chain::OpenCCError>(())
//! ```
//!
//! Dictionary construction and lookup are injected through the
//! [`dictionary_lib::DictionaryBuilder`] and [`dictionary_lib::PrefixMatcher`] traits;
//! see [`OpenCC::with_builder`].

use rayon::prelude::*;

pub mod chain;
pub mod config;
pub mod dictionary_lib;
pub mod error;
pub mod pipeline;

pub use crate::chain::{resolve, ConversionProfile, StageGroup};
pub use crate::config::{ChainConfig, ConfigSource, ConversionMode, ConverterOptions, DictNode};
pub use crate::error::{DictionaryError, OpenCCError, Result};

use crate::dictionary_lib::{DictionaryBuilder, FileDictionaryBuilder};

/// A converter bound to one resolved conversion mode.
pub struct OpenCC {
    profile: ConversionProfile,
    is_parallel: bool,
}

impl OpenCC {
    /// Creates a converter for `config` with [`ConverterOptions::default`]: embedded
    /// chain configurations and dictionaries from `./dicts`.
    ///
    /// The `dicts` directory is resolved against the process working directory. Use
    /// [`OpenCC::with_options`] with an absolute path when that is not where the
    /// dictionaries live.
    pub fn new(config: &str) -> Result<Self> {
        Self::with_options(config, &ConverterOptions::default())
    }

    /// Creates a converter reading dictionary files from `options.dict_dir`.
    pub fn with_options(config: &str, options: &ConverterOptions) -> Result<Self> {
        let builder = FileDictionaryBuilder::new(&options.dict_dir);
        Self::with_builder(config, &options.config_source, &builder)
    }

    /// Creates a converter with an explicit configuration source and dictionary builder.
    ///
    /// # Errors
    /// - [`OpenCCError::UnsupportedMode`] if `config` is not a supported mode name.
    /// - [`OpenCCError::ConfigIo`] / [`OpenCCError::MalformedConfig`] for a bad document.
    /// - [`OpenCCError::DictionaryBuild`] if any dictionary resource fails to build.
    pub fn with_builder(
        config: &str,
        source: &ConfigSource,
        builder: &dyn DictionaryBuilder,
    ) -> Result<Self> {
        let mode: ConversionMode = config.parse()?;
        let chain = ChainConfig::load(mode, source)?;
        let profile = resolve(mode, &chain, builder)?;
        Ok(Self::from_profile(profile))
    }

    /// Wraps an already resolved profile. Parallel batch conversion is on.
    pub fn from_profile(profile: ConversionProfile) -> Self {
        OpenCC {
            profile,
            is_parallel: true,
        }
    }

    /// Converts `input` through every stage of the chain.
    pub fn convert(&self, input: &str) -> Result<String> {
        self.profile.convert(input)
    }

    /// Converts independent inputs, returning outputs in input order.
    ///
    /// With parallelism enabled the inputs are spread over the rayon pool; each input
    /// is still converted sequentially. The error of the first failing input (by
    /// position) is returned.
    pub fn convert_batch<S>(&self, inputs: &[S]) -> Result<Vec<String>>
    where
        S: AsRef<str> + Sync,
    {
        let results: Vec<Result<String>> = if self.is_parallel {
            inputs
                .par_iter()
                .map(|input| self.convert(input.as_ref()))
                .collect()
        } else {
            inputs
                .iter()
                .map(|input| self.convert(input.as_ref()))
                .collect()
        };
        results.into_iter().collect()
    }

    /// The conversion mode this converter was resolved for.
    pub fn mode(&self) -> ConversionMode {
        self.profile.mode()
    }

    /// Human-readable description from the chain configuration (`name`).
    pub fn description(&self) -> &str {
        self.profile.description()
    }

    /// The resolved stages, in pipeline order.
    pub fn profile(&self) -> &ConversionProfile {
        &self.profile
    }

    /// Enables or disables rayon in [`OpenCC::convert_batch`]. Single conversions
    /// are always sequential.
    pub fn set_parallel(&mut self, is_parallel: bool) {
        self.is_parallel = is_parallel;
    }

    /// Whether [`OpenCC::convert_batch`] spreads inputs over the rayon pool.
    pub fn get_parallel(&self) -> bool {
        self.is_parallel
    }
}
