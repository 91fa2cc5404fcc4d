use opencc_chain::dictionary_lib::{
    DictionaryBuilder, MemoryDictionaryBuilder, PrefixDict, PrefixMatch, PrefixMatcher,
};
use opencc_chain::{
    ChainConfig, ConfigSource, ConversionMode, ConverterOptions, DictionaryError, OpenCC,
    OpenCCError,
};

/// Builds an empty dictionary for any resource identifier.
struct EmptyBuilder;

impl DictionaryBuilder for EmptyBuilder {
    fn build(&self, _resource_id: &str) -> Result<Box<dyn PrefixMatcher>, DictionaryError> {
        Ok(Box::new(PrefixDict::default()))
    }
}

/// Fails every lookup.
struct OfflineMatcher;

impl PrefixMatcher for OfflineMatcher {
    fn prefix_match(&self, _text: &[char]) -> Result<Vec<PrefixMatch<'_>>, DictionaryError> {
        Err(DictionaryError::LookupFailed("dictionary service offline".to_string()))
    }
}

struct OfflineBuilder;

impl DictionaryBuilder for OfflineBuilder {
    fn build(&self, _resource_id: &str) -> Result<Box<dyn PrefixMatcher>, DictionaryError> {
        Ok(Box::new(OfflineMatcher))
    }
}

fn embedded(mode: &str, builder: &dyn DictionaryBuilder) -> Result<OpenCC, OpenCCError> {
    OpenCC::with_builder(mode, &ConfigSource::Embedded, builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn every_supported_mode_resolves() {
        for mode in ConversionMode::ALL {
            let opencc = embedded(mode.as_str(), &EmptyBuilder).unwrap();
            assert_eq!(opencc.mode(), mode);
            assert!(!opencc.profile().stages().is_empty(), "{mode}");
            assert!(opencc.profile().stages().iter().all(|s| !s.is_empty()), "{mode}");
        }
    }

    #[test]
    fn stage_counts_follow_builtin_chains() {
        let stages = |mode: &str| embedded(mode, &EmptyBuilder).unwrap().profile().stages().len();

        assert_eq!(stages("s2t"), 1);
        assert_eq!(stages("tw2s"), 2);
        assert_eq!(stages("s2twp"), 3);
        assert_eq!(stages("tw2sp"), 2);
        assert_eq!(stages("jp2t"), 1);
    }

    #[test]
    fn unsupported_and_blank_modes_fail() {
        for mode in ["", " ", "s2x", "zh-cn", "S2T"] {
            let err = embedded(mode, &EmptyBuilder).err().unwrap();
            match err {
                OpenCCError::UnsupportedMode { supported, .. } => {
                    for name in ["s2t", "tw2sp", "jp2t", "tw2t"] {
                        assert!(supported.contains(name), "{supported}");
                    }
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn text_without_dictionary_entries_is_unchanged() {
        let opencc = embedded("s2twp", &EmptyBuilder).unwrap();
        for text in ["", "你好，世界！", "plain ascii\r\n", "𠀀𡃁 emoji 🀄"] {
            assert_eq!(opencc.convert(text).unwrap(), text);
        }
    }

    #[test]
    fn lookup_failure_propagates_from_convert() {
        let opencc = embedded("t2s", &OfflineBuilder).unwrap();

        let err = opencc.convert("漢字").unwrap_err();
        assert!(matches!(err, OpenCCError::Lookup(DictionaryError::LookupFailed(_))));
        assert!(err.to_string().contains("offline"), "{err}");

        let err = opencc.convert_batch(&["", "漢字"]).unwrap_err();
        assert!(matches!(err, OpenCCError::Lookup(_)));
    }

    #[test]
    fn multi_stage_mode_with_memory_dictionaries() {
        let mut builder = MemoryDictionaryBuilder::new();
        builder
            .insert_text("STPhrases.txt", "鼠标\t鼠標\n")
            .insert_text("STCharacters.txt", "标\t標 摽\n软\t軟\n件\t件\n")
            .insert_text("TWPhrases.txt", "鼠標\t滑鼠\n軟件\t軟體\n")
            .insert_text("TWVariants.txt", "裏\t裡\n");
        let opencc = embedded("s2twp", &builder).unwrap();

        assert_eq!(opencc.convert("鼠标和软件").unwrap(), "滑鼠和軟體");
        assert_eq!(
            opencc.profile().to_string(),
            "s2twp (Simplified Chinese to Traditional Chinese (Taiwan Standard) with Taiwanese idiom): \
             [STPhrases.txt STCharacters.txt] -> [TWPhrases.txt] -> [TWVariants.txt]"
        );
    }

    #[test]
    fn file_backed_converter_end_to_end() {
        let dicts = tempdir().unwrap();
        let configs = tempdir().unwrap();

        fs::write(
            dicts.path().join("STPhrases.txt"),
            "# phrases\n龙马精神\t龍馬精神\n头发\t頭髮\n",
        )
        .unwrap();
        PrefixDict::from_text("龙\t龍\n马\t馬\n发\t發 髮\n头\t頭\n")
            .save_compressed(dicts.path().join("STCharacters.zstd"))
            .unwrap();
        fs::write(
            configs.path().join("s2t.json"),
            r#"{
                "name": "s2t from disk",
                "conversion_chain": [{ "dict": { "type": "group", "dicts": [
                    { "type": "txt", "file": "STPhrases.txt" },
                    { "type": "txt", "file": "STCharacters.zstd" }
                ] } }]
            }"#,
        )
        .unwrap();

        let options = ConverterOptions::new(dicts.path()).with_config_dir(configs.path());
        let opencc = OpenCC::with_options("s2t", &options).unwrap();

        assert_eq!(opencc.description(), "s2t from disk");
        assert_eq!(opencc.convert("龙马精神，头发，发").unwrap(), "龍馬精神，頭髮，發");
    }

    #[test]
    fn missing_dictionary_directory_fails_construction() {
        let dicts = tempdir().unwrap();
        let options = ConverterOptions::new(dicts.path().join("nowhere"));

        let err = OpenCC::with_options("t2jp", &options).err().unwrap();
        match err {
            OpenCCError::DictionaryBuild { resource, source } => {
                assert_eq!(resource, "JPVariants.txt");
                assert!(matches!(source, DictionaryError::NotFound(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn malformed_config_directory_document() {
        let configs = tempdir().unwrap();
        fs::write(
            configs.path().join("t2s.json"),
            r#"{ "name": "t2s", "conversion_chain": [{ "dict": { "type": "group", "dicts": [] } }] }"#,
        )
        .unwrap();
        let source = ConfigSource::Directory(configs.path().to_path_buf());

        let err = OpenCC::with_builder("t2s", &source, &EmptyBuilder).err().unwrap();
        match err {
            OpenCCError::MalformedConfig { path, .. } => {
                assert!(path.ends_with("conversion_chain[0].dict.dicts"), "{path}")
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = ChainConfig::load(ConversionMode::S2T, &source).unwrap_err();
        assert!(matches!(err, OpenCCError::ConfigIo { .. }));
    }

    #[test]
    fn batch_matches_single_conversion() {
        let mut builder = MemoryDictionaryBuilder::new();
        builder
            .insert("TSPhrases.txt", [("頭髮", ["头发"])])
            .insert_text("TSCharacters.txt", "漢\t汉\n字\t字\n頭\t头\n髮\t发\n");
        let mut opencc = embedded("t2s", &builder).unwrap();

        let inputs: Vec<String> = (0..64).map(|i| format!("{i}:漢字頭髮")).collect();
        let single: Vec<String> = inputs.iter().map(|s| opencc.convert(s).unwrap()).collect();

        assert_eq!(opencc.convert_batch(&inputs).unwrap(), single);
        opencc.set_parallel(false);
        assert_eq!(opencc.convert_batch(&inputs).unwrap(), single);
        assert_eq!(single[7], "7:汉字头发");
    }
}
