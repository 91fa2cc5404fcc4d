use rustc_hash::FxHashMap;

use super::{DictionaryBuilder, DictionaryError, PrefixDict, PrefixMatcher};

/// Serves dictionary resources held in memory, keyed by resource identifier.
///
/// Every `build` call constructs a fresh [`PrefixDict`] from the stored entries.
///
/// ```
/// use opencc_chain::dictionary_lib::{DictionaryBuilder, MemoryDictionaryBuilder};
///
/// let mut builder = MemoryDictionaryBuilder::new();
/// builder.insert_text("STCharacters.txt", "龙\t龍\n");
///
/// assert!(builder.build("STCharacters.txt").is_ok());
/// assert!(builder.build("STPhrases.txt").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryDictionaryBuilder {
    resources: FxHashMap<String, Vec<(String, Vec<String>)>>,
}

impl MemoryDictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a resource from `(key, candidates)` pairs.
    pub fn insert<I, K, V, C>(&mut self, resource_id: &str, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, C)>,
        C: IntoIterator<Item = V>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries: Vec<(String, Vec<String>)> = entries
            .into_iter()
            .map(|(k, c)| (k.into(), c.into_iter().map(Into::into).collect()))
            .collect();
        self.resources.insert(resource_id.to_string(), entries);
        self
    }

    /// Registers (or replaces) a resource from OpenCC plain-text dictionary content.
    pub fn insert_text(&mut self, resource_id: &str, content: &str) -> &mut Self {
        let dict = PrefixDict::from_text(content);
        let entries: Vec<(String, Vec<String>)> = dict
            .map
            .iter()
            .map(|(k, c)| (k.iter().collect(), c.iter().map(|s| s.to_string()).collect()))
            .collect();
        self.resources.insert(resource_id.to_string(), entries);
        self
    }

    pub fn contains(&self, resource_id: &str) -> bool {
        self.resources.contains_key(resource_id)
    }
}

impl DictionaryBuilder for MemoryDictionaryBuilder {
    fn build(&self, resource_id: &str) -> Result<Box<dyn PrefixMatcher>, DictionaryError> {
        let entries = self
            .resources
            .get(resource_id)
            .ok_or_else(|| DictionaryError::NotFound(resource_id.to_string()))?;
        Ok(Box::new(PrefixDict::build_from_pairs(entries.iter().cloned())))
    }
}
