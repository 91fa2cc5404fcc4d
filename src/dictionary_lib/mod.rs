//! Dictionary collaborators used by the conversion chain.
//!
//! The resolver and the pipeline only see two capabilities:
//!
//! - [`DictionaryBuilder`]: builds one dictionary handle per resource identifier
//!   named by a leaf of the chain configuration.
//! - [`PrefixMatcher`]: given the remaining text at a cursor, returns every stored
//!   key that is a prefix of it, together with its replacement candidates.
//!
//! [`PrefixDict`] is the concrete dictionary shipped with the crate. It is built from
//! OpenCC plain-text dictionaries or loaded from a Zstd-compressed CBOR image.
//! [`FileDictionaryBuilder`] resolves resource identifiers against a dictionary
//! directory; [`MemoryDictionaryBuilder`] serves entries held in memory.

mod file_builder;
mod memory;
mod prefix_dict;

pub use crate::error::DictionaryError;
pub use file_builder::FileDictionaryBuilder;
pub use memory::MemoryDictionaryBuilder;
pub use prefix_dict::PrefixDict;

/// One prefix match returned by a [`PrefixMatcher`].
///
/// `key` is the stored key (a prefix of the lookup input) and `candidates` its
/// replacement list, first entry being the preferred replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch<'a> {
    pub key: &'a [char],
    pub candidates: &'a [Box<str>],
}

impl<'a> PrefixMatch<'a> {
    pub fn new(key: &'a [char], candidates: &'a [Box<str>]) -> Self {
        Self { key, candidates }
    }

    /// Length of the matched key in characters.
    #[inline]
    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    /// The preferred replacement, if the candidate list is not empty.
    #[inline]
    pub fn preferred(&self) -> Option<&'a str> {
        self.candidates.first().map(|c| c.as_ref())
    }
}

/// Read-only longest-prefix lookup over one dictionary.
///
/// Implementations must not mutate shared state during lookup; a resolved profile
/// is queried concurrently from several threads.
pub trait PrefixMatcher: Send + Sync {
    /// Returns every stored key that is a prefix of `text`, in any order.
    ///
    /// An empty vector means "no match here" and is not an error.
    fn prefix_match(&self, text: &[char]) -> Result<Vec<PrefixMatch<'_>>, DictionaryError>;
}

/// Builds a dictionary handle from a resource identifier (e.g. `STPhrases.txt`).
pub trait DictionaryBuilder {
    fn build(&self, resource_id: &str) -> Result<Box<dyn PrefixMatcher>, DictionaryError>;
}
