use clap::{Arg, Command};
use log::info;
use opencc_chain::dictionary_lib::PrefixDict;
use std::fs;
use std::path::{Path, PathBuf};

/// Plain-text dictionaries (`*.txt`) directly inside `dir`, sorted by file name.
fn text_dictionaries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m"; // Bold Blue
    const RESET: &str = "\x1B[0m"; // Reset color

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = Command::new("Dictionary Generator")
        .about(format!(
            "{BLUE}Dict Generator: compiles OpenCC text dictionaries into CBOR images{RESET}"
        ))
        .after_help(
            "Examples:\n\
         \n\
         dict-generate --input dicts --output dicts-bin\n\
         dict-generate --format cbor\n\
         \n\
         STPhrases.txt becomes STPhrases.zstd (or STPhrases.cbor); point a chain\n\
         configuration leaf at the new file name to load the compiled image.\n"
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("format")
                .default_value("zstd")
                .value_parser(["zstd", "cbor"])
                .help("Dictionary format: [zstd|cbor]"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("dir")
                .default_value("dicts")
                .help("Directory holding OpenCC text dictionaries (*.txt)."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("dir")
                .help("Write compiled dictionaries to <dir>. Defaults to the input directory."),
        )
        .get_matches();

    let input_dir = Path::new(
        matches
            .get_one::<String>("input")
            .map_or("dicts", String::as_str),
    );
    if !input_dir.is_dir() {
        eprintln!(
            "{BLUE}Dictionary directory '{}' not found.{RESET}\n\
         Please place OpenCC dictionary files (*.txt) under this folder.",
            input_dir.display()
        );
        return Ok(());
    }
    let output_dir = matches
        .get_one::<String>("output")
        .map_or(input_dir, |s| Path::new(s.as_str()));
    fs::create_dir_all(output_dir)?;

    let dict_format = matches
        .get_one::<String>("format")
        .map_or("zstd", String::as_str);

    let sources = text_dictionaries(input_dir)?;
    if sources.is_empty() {
        eprintln!("{BLUE}No *.txt dictionaries in {}{RESET}", input_dir.display());
        return Ok(());
    }

    for source in &sources {
        let dict = PrefixDict::from_file(source)?;
        let target = output_dir
            .join(source.file_name().ok_or("dictionary path has no file name")?)
            .with_extension(dict_format);

        match dict_format {
            "cbor" => dict.serialize_to_cbor(&target)?,
            _ => dict.save_compressed(&target)?,
        }
        info!(
            "{} -> {} ({} entries, max_len {})",
            source.display(),
            target.display(),
            dict.len(),
            dict.max_len
        );
    }

    eprintln!(
        "{BLUE}{} dictionaries saved in {} format at: {}{RESET}",
        sources.len(),
        dict_format.to_uppercase(),
        output_dir.display()
    );

    Ok(())
}
