//! Stage-by-stage greedy conversion over a [`ConversionProfile`].
//!
//! Within a stage the text is scanned left to right by `char`. At each position the
//! stage's dictionaries are tried in priority order; the **first dictionary that
//! matches at all** decides the token, using its longest matching key. A later
//! dictionary is never consulted at that position, even if it holds a longer key.
//! Positions with no match pass through unchanged.
//!
//! ```
//! use opencc_chain::dictionary_lib::{DictionaryBuilder, MemoryDictionaryBuilder};
//! use opencc_chain::{ConversionMode, ConversionProfile, StageGroup};
//!
//! let mut builder = MemoryDictionaryBuilder::new();
//! builder.insert("first", [("X", ["Y"])]);
//! builder.insert("second", [("XY", ["Z"])]);
//!
//! let stage = StageGroup::from_dicts(vec![
//!     ("first".to_string(), builder.build("first").unwrap()),
//!     ("second".to_string(), builder.build("second").unwrap()),
//! ])
//! .unwrap();
//! let profile = ConversionProfile::new(ConversionMode::S2T, "demo", vec![stage]).unwrap();
//!
//! // "X" from the first dictionary wins over the longer "XY" from the second.
//! assert_eq!(profile.convert("XY").unwrap(), "YY");
//! ```

use crate::chain::{ConversionProfile, StageGroup};
use crate::dictionary_lib::{DictionaryError, PrefixMatcher};
use crate::error::{OpenCCError, Result};

/// Converts `input` through every stage of `profile`, in order.
///
/// The output of one stage is the input of the next. Fails only when a dictionary
/// lookup fails; no partial output is returned.
pub fn convert(profile: &ConversionProfile, input: &str) -> Result<String> {
    let mut text = input.to_string();
    for stage in profile.stages() {
        text = convert_stage(stage, &text)?;
    }
    Ok(text)
}

/// Runs one stage of maximal-munch replacement over `input`.
pub fn convert_stage(stage: &StageGroup, input: &str) -> Result<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len());

    let mut pos = 0;
    while pos < chars.len() {
        match first_dictionary_match(stage.dicts(), &chars[pos..])? {
            Some((len, replacement)) => {
                output.push_str(replacement);
                pos += len;
            }
            None => {
                output.push(chars[pos]);
                pos += 1;
            }
        }
    }

    Ok(output)
}

/// Longest key of the first dictionary (in priority order) with any match at the
/// start of `text`, as `(key length, preferred replacement)`.
fn first_dictionary_match<'a>(
    dicts: &'a [Box<dyn PrefixMatcher>],
    text: &[char],
) -> Result<Option<(usize, &'a str)>> {
    for dict in dicts {
        let matches = dict.prefix_match(text).map_err(OpenCCError::Lookup)?;
        let Some(best) = matches
            .into_iter()
            .filter(|m| m.key_len() > 0)
            .max_by_key(|m| m.key_len())
        else {
            continue;
        };

        if best.key_len() > text.len() {
            return Err(OpenCCError::Lookup(DictionaryError::LookupFailed(format!(
                "match of {} chars exceeds the {} remaining",
                best.key_len(),
                text.len()
            ))));
        }
        let replacement = best.preferred().ok_or_else(|| {
            OpenCCError::Lookup(DictionaryError::LookupFailed(format!(
                "no replacement candidates for key {:?}",
                best.key.iter().collect::<String>()
            )))
        })?;

        return Ok(Some((best.key_len(), replacement)));
    }
    Ok(None)
}
