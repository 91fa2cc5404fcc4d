//! Prefix dictionary with maximum-length and per-starter metadata.
//!
//! [`PrefixDict`] maps phrase keys (`Box<[char]>`) to an ordered list of replacement
//! candidates and tracks:
//!
//! - the **global maximum / minimum key length** (`max_len`, `min_len`), and
//! - the **per-starter maximum key length** (`starter_cap`).
//!
//! A prefix lookup only probes lengths up to the cap of the first character, so a
//! position whose starter never begins a key costs one hash probe.
//!
//! ## Example
//! ```
//! use opencc_chain::dictionary_lib::{PrefixDict, PrefixMatcher};
//!
//! let dict = PrefixDict::from_text("龙\t龍\n龙马\t龍馬\n");
//! let text: Vec<char> = "龙马精神".chars().collect();
//!
//! let matches = dict.prefix_match(&text).unwrap();
//! assert_eq!(matches.len(), 2);
//! assert_eq!(dict.max_len, 2);
//! ```

use std::collections::hash_map::Entry;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use zstd::{Decoder, Encoder};

use super::{DictionaryError, PrefixMatch, PrefixMatcher};

/// A dictionary mapping phrase keys to ordered replacement candidates.
///
/// Keys are stored as `Box<[char]>` so lookups borrow a `&[char]` window of the
/// input directly, with no intermediate `String`.
///
/// # Invariants
/// - No key is empty and no candidate list is empty.
/// - `starter_cap[c]` ≥ the length of every key starting with `c`.
/// - `min_len <= max_len`, both `0` for an empty dictionary.
///
/// # Serialization
/// All fields are serialized; a CBOR image loads back ready for lookups.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct PrefixDict {
    /// Phrase (as boxed slice of `char`) → replacement candidates, preferred first.
    #[serde(default)]
    pub map: FxHashMap<Box<[char]>, Box<[Box<str>]>>,

    /// Longest key length in characters.
    #[serde(default)]
    pub max_len: usize,

    /// Shortest key length in characters.
    #[serde(default)]
    pub min_len: usize,

    /// Longest key length per starting character.
    #[serde(default)]
    pub starter_cap: FxHashMap<char, u16>,
}

impl PrefixDict {
    /// Builds a dictionary from `(key, candidates)` pairs.
    ///
    /// ### Duplicates
    /// **First-wins**: a later entry for an existing key is dropped. Identical
    /// duplicates are dropped silently, conflicting ones are logged at `warn`.
    ///
    /// ### Rejected entries
    /// Empty keys and entries with no candidates are skipped and logged.
    ///
    /// ### Example
    /// ```
    /// use opencc_chain::dictionary_lib::PrefixDict;
    ///
    /// let dict = PrefixDict::build_from_pairs(vec![
    ///     ("干".to_string(), vec!["幹".to_string(), "乾".to_string()]),
    ///     ("世界".to_string(), vec!["世界".to_string()]),
    /// ]);
    ///
    /// assert_eq!(dict.len(), 2);
    /// assert_eq!(dict.max_len, 2);
    /// assert_eq!(dict.get("干").unwrap()[0].as_ref(), "幹");
    /// ```
    pub fn build_from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        let it = pairs.into_iter();
        let (lower, _) = it.size_hint();

        let mut map: FxHashMap<Box<[char]>, Box<[Box<str>]>> = FxHashMap::default();
        map.reserve(lower);
        let mut starter_cap: FxHashMap<char, u16> = FxHashMap::default();

        let mut global_max = 0usize;
        let mut global_min = usize::MAX;

        for (k, v) in it {
            if k.is_empty() {
                warn!("empty dictionary key ignored");
                continue;
            }
            if v.is_empty() {
                warn!("dictionary key {:?} has no candidates, ignored", k);
                continue;
            }

            let chars: Box<[char]> = k.chars().collect();
            let c0 = chars[0];
            let len = chars.len();
            let candidates: Box<[Box<str>]> = v.into_iter().map(String::into_boxed_str).collect();

            match map.entry(chars) {
                Entry::Vacant(e) => {
                    debug_assert!(
                        len <= u16::MAX as usize,
                        "Entry length {} exceeds u16::MAX for key {:?}",
                        len,
                        k
                    );
                    let len_u16 = u16::try_from(len).unwrap_or(u16::MAX);
                    starter_cap
                        .entry(c0)
                        .and_modify(|m| *m = (*m).max(len_u16))
                        .or_insert(len_u16);

                    global_max = global_max.max(len);
                    global_min = global_min.min(len);
                    e.insert(candidates);
                }
                Entry::Occupied(e) => {
                    if e.get() != &candidates {
                        warn!(
                            "duplicate key ignored (first-wins): key={:?}; kept={:?}, ignored={:?}",
                            k,
                            e.get(),
                            candidates
                        );
                    }
                }
            }
        }

        let min_len = if global_min == usize::MAX { 0 } else { global_min };

        Self {
            map,
            max_len: global_max,
            min_len,
            starter_cap,
        }
    }

    /// Parses an OpenCC plain-text dictionary.
    ///
    /// Each line is `key<TAB>candidate [candidate ...]`. Blank lines and lines
    /// starting with `#` are skipped; a line without any candidate is logged and
    /// skipped.
    pub fn from_text(content: &str) -> Self {
        let mut pairs = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim_start_matches('\u{feff}').trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let key = match fields.next() {
                Some(key) => key,
                None => continue,
            };
            let candidates: Vec<String> = fields.map(str::to_owned).collect();
            if candidates.is_empty() {
                warn!("Invalid line format at line {}: {}", idx + 1, raw);
                continue;
            }
            pairs.push((key.to_owned(), candidates));
        }

        Self::build_from_pairs(pairs)
    }

    /// Reads and parses an OpenCC plain-text dictionary file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| {
            DictionaryError::IoError(format!("Failed to read file {}: {}", path.display(), err))
        })?;

        let dict = Self::from_text(&content);
        debug!(
            "loaded {} entries (max_len={}) from {}",
            dict.len(),
            dict.max_len,
            path.display()
        );
        Ok(dict)
    }

    /// Exact lookup of a key's candidate list.
    pub fn get(&self, key: &str) -> Option<&[Box<str>]> {
        let chars: Vec<char> = key.chars().collect();
        self.map.get(chars.as_slice()).map(|c| &**c)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Serializes the dictionary to a CBOR file.
    pub fn serialize_to_cbor<P: AsRef<Path>>(&self, path: P) -> Result<(), DictionaryError> {
        let cbor_data = serde_cbor::to_vec(self)?;
        fs::write(path, cbor_data)?;
        Ok(())
    }

    /// Deserializes the dictionary from a CBOR file.
    pub fn deserialize_from_cbor<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let cbor_data = fs::read(path)?;
        Ok(serde_cbor::from_slice(&cbor_data)?)
    }

    /// Saves the dictionary to a Zstd-compressed CBOR file on disk.
    pub fn save_compressed<P: AsRef<Path>>(&self, path: P) -> Result<(), DictionaryError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        let mut encoder = Encoder::new(writer, 19)?;
        serde_cbor::to_writer(&mut encoder, self)?;
        let mut writer = encoder.finish()?;
        writer.flush()?;
        Ok(())
    }

    /// Loads the dictionary from a Zstd-compressed CBOR file on disk.
    pub fn load_compressed<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut decoder = Decoder::new(reader)?;
        Ok(serde_cbor::from_reader(&mut decoder)?)
    }
}

impl PrefixMatcher for PrefixDict {
    fn prefix_match(&self, text: &[char]) -> Result<Vec<PrefixMatch<'_>>, DictionaryError> {
        let Some(&c0) = text.first() else {
            return Ok(Vec::new());
        };
        let cap = match self.starter_cap.get(&c0) {
            Some(&cap) => (cap as usize).min(text.len()),
            None => return Ok(Vec::new()),
        };

        let mut matches = Vec::new();
        for len in self.min_len.max(1)..=cap {
            if let Some((key, candidates)) = self.map.get_key_value(&text[..len]) {
                matches.push(PrefixMatch::new(key, candidates));
            }
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn pair(k: &str, v: &[&str]) -> (String, Vec<String>) {
        (k.to_string(), v.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn build_tracks_lengths_and_starters() {
        let dict = PrefixDict::build_from_pairs(vec![
            pair("你好", &["您好"]),
            pair("你", &["您"]),
            pair("世界和平", &["世界和平"]),
        ]);

        assert_eq!(dict.len(), 3);
        assert_eq!(dict.max_len, 4);
        assert_eq!(dict.min_len, 1);
        assert_eq!(dict.starter_cap.get(&'你'), Some(&2));
        assert_eq!(dict.starter_cap.get(&'世'), Some(&4));
    }

    #[test]
    fn empty_dictionary_has_zero_bounds() {
        let dict = PrefixDict::build_from_pairs(Vec::new());
        assert!(dict.is_empty());
        assert_eq!(dict.max_len, 0);
        assert_eq!(dict.min_len, 0);
        assert!(dict.prefix_match(&chars("abc")).unwrap().is_empty());
    }

    #[test]
    fn prefix_match_returns_every_stored_prefix() {
        let dict = PrefixDict::from_text("龙\t龍\n龙马\t龍馬\n龙马精神\t龍馬精神\n马\t馬\n");
        let text = chars("龙马精");

        let mut lens: Vec<usize> = dict
            .prefix_match(&text)
            .unwrap()
            .iter()
            .map(|m| m.key_len())
            .collect();
        lens.sort_unstable();

        // "龙马精神" is longer than the remaining text
        assert_eq!(lens, vec![1, 2]);
    }

    #[test]
    fn prefix_match_misses_unknown_starter() {
        let dict = PrefixDict::from_text("龙\t龍\n");
        assert!(dict.prefix_match(&chars("你好")).unwrap().is_empty());
        assert!(dict.prefix_match(&[]).unwrap().is_empty());
    }

    #[test]
    fn prefix_match_handles_astral_keys() {
        let dict = PrefixDict::from_text("𬴂\t騑\n");
        let matches = dict.prefix_match(&chars("𬴂于")).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].preferred(), Some("騑"));
    }

    #[test]
    fn from_text_skips_comments_and_malformed_lines() {
        let content = "\u{feff}# header\n\n干\t幹 乾 榦\nbroken\n后\t後\n";
        let dict = PrefixDict::from_text(content);

        assert_eq!(dict.len(), 2);
        let candidates: Vec<&str> = dict.get("干").unwrap().iter().map(|c| c.as_ref()).collect();
        assert_eq!(candidates, vec!["幹", "乾", "榦"]);
        assert!(dict.get("broken").is_none());
    }

    #[test]
    fn duplicate_keys_keep_first_value() {
        let dict = PrefixDict::build_from_pairs(vec![
            pair("弁", &["辨"]),
            pair("弁", &["瓣"]),
            pair("弁", &["辨"]),
        ]);
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("弁").unwrap()[0].as_ref(), "辨");
    }

    #[test]
    fn entries_without_candidates_are_rejected() {
        let dict = PrefixDict::build_from_pairs(vec![pair("", &["x"]), pair("a", &[])]);
        assert!(dict.is_empty());
    }

    #[test]
    fn compressed_image_loads_back() {
        let dict = PrefixDict::from_text("汉\t漢\n汉字\t漢字\n𬴂\t騑\n");
        let dir = tempdir().unwrap();
        let path = dir.path().join("STPhrases.zstd");

        dict.save_compressed(&path).unwrap();
        let loaded = PrefixDict::load_compressed(&path).unwrap();

        assert_eq!(loaded.len(), dict.len());
        assert_eq!(loaded.max_len, 2);
        assert_eq!(loaded.starter_cap, dict.starter_cap);
        let matches = loaded.prefix_match(&chars("汉字转换")).unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn cbor_image_loads_back() {
        let dict = PrefixDict::from_text("发\t發 髮\n");
        let dir = tempdir().unwrap();
        let path = dir.path().join("STCharacters.cbor");

        dict.serialize_to_cbor(&path).unwrap();
        let loaded = PrefixDict::deserialize_from_cbor(&path).unwrap();
        assert_eq!(loaded.get("发").unwrap().len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = PrefixDict::from_file(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, DictionaryError::IoError(_)));
    }
}
