use std::path::{Path, PathBuf};

use log::trace;

use super::{DictionaryBuilder, DictionaryError, PrefixDict, PrefixMatcher};

/// Builds dictionaries from files in a dictionary directory.
///
/// The resource identifier is a file name relative to the directory; its extension
/// selects the format:
///
/// - `.zstd` / `.zst`: Zstd-compressed CBOR image ([`PrefixDict::load_compressed`])
/// - `.cbor`: plain CBOR image ([`PrefixDict::deserialize_from_cbor`])
/// - anything else: OpenCC plain-text dictionary ([`PrefixDict::from_file`])
#[derive(Debug, Clone)]
pub struct FileDictionaryBuilder {
    dict_dir: PathBuf,
}

impl FileDictionaryBuilder {
    pub fn new<P: Into<PathBuf>>(dict_dir: P) -> Self {
        Self {
            dict_dir: dict_dir.into(),
        }
    }

    pub fn dict_dir(&self) -> &Path {
        &self.dict_dir
    }
}

impl DictionaryBuilder for FileDictionaryBuilder {
    fn build(&self, resource_id: &str) -> Result<Box<dyn PrefixMatcher>, DictionaryError> {
        let path = self.dict_dir.join(resource_id);
        if !path.is_file() {
            return Err(DictionaryError::NotFound(path.display().to_string()));
        }
        trace!("building dictionary from {}", path.display());

        let dict = match path.extension().and_then(|ext| ext.to_str()) {
            Some("zstd") | Some("zst") => PrefixDict::load_compressed(&path)?,
            Some("cbor") => PrefixDict::deserialize_from_cbor(&path)?,
            _ => PrefixDict::from_file(&path)?,
        };
        Ok(Box::new(dict))
    }
}
