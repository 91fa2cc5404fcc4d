use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};
use std::time::Instant;

use clap::{Arg, Command};
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use log::debug;

use opencc_chain::{ConversionMode, ConverterOptions, OpenCC};

fn read_input(input: &mut dyn Read, is_console: bool) -> Result<Vec<u8>, io::Error> {
    let mut buffer = Vec::new();

    if is_console {
        // Console input arrives in chunks until EOF
        let mut chunk = [0; 1024];
        loop {
            let bytes_read = input.read(&mut chunk)?;
            if bytes_read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..bytes_read]);
        }
    } else {
        input.read_to_end(&mut buffer)?;
    }

    Ok(buffer)
}

fn lookup_encoding(label: &str, direction: &str) -> Result<&'static Encoding, io::Error> {
    Encoding::for_label(label.as_bytes()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Unsupported {direction} encoding: {label}"),
        )
    })
}

fn decode_input(buffer: &[u8], in_enc: &str) -> Result<String, io::Error> {
    match in_enc {
        "UTF-8" => Ok(String::from_utf8_lossy(buffer).into_owned()),
        _ => {
            let encoding = lookup_encoding(in_enc, "input")?;
            let mut decoder = DecodeReaderBytesBuilder::new()
                .encoding(Some(encoding))
                .build(buffer);
            let mut decoded = String::new();
            decoder.read_to_string(&mut decoded)?;
            Ok(decoded)
        }
    }
}

fn encode_and_write_output(
    output_str: &str,
    out_enc: &str,
    output: &mut dyn Write,
) -> Result<(), io::Error> {
    match out_enc {
        "UTF-8" => output.write_all(output_str.as_bytes()),
        _ => {
            let encoding = lookup_encoding(out_enc, "output")?;
            let (encoded_bytes, _, _) = encoding.encode(output_str);
            output.write_all(&encoded_bytes)
        }
    }
}

fn remove_utf8_bom(input: &mut Vec<u8>) {
    // UTF-8 BOM: EF BB BF
    if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
        input.drain(0..3);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const BLUE: &str = "\x1B[1;34m";
    const RESET: &str = "\x1B[0m";

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = Command::new("OpenCC Rust")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("file")
                .help("Read original text from <file>."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .help("Write converted text to <file>."),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("conversion")
                .value_parser(ConversionMode::ALL.map(ConversionMode::as_str))
                .help("Conversion mode")
                .required(true),
        )
        .arg(
            Arg::new("dict_dir")
                .long("dict-dir")
                .value_name("dir")
                .default_value(ConverterOptions::DEFAULT_DICT_DIR)
                .help("Directory holding the dictionary resources named by the chain."),
        )
        .arg(
            Arg::new("config_dir")
                .long("config-dir")
                .value_name("dir")
                .help("Read <mode>.json chain configurations from <dir> instead of the built-in ones."),
        )
        .arg(
            Arg::new("in_enc")
                .long("in-enc")
                .value_name("encoding")
                .default_value("UTF-8")
                .help("Encoding for input: UTF-8|GB2312|GBK|gb18030|BIG5"),
        )
        .arg(
            Arg::new("out_enc")
                .long("out-enc")
                .value_name("encoding")
                .default_value("UTF-8")
                .help("Encoding for output: UTF-8|GB2312|GBK|gb18030|BIG5"),
        )
        .about(format!(
            "{BLUE}OpenCC Rust: Command Line Open Chinese Converter{RESET}"
        ))
        .get_matches();

    let input_file = matches.get_one::<String>("input");
    let output_file = matches.get_one::<String>("output");
    let config = matches
        .get_one::<String>("config")
        .ok_or("missing --config")?;
    let in_enc = matches
        .get_one::<String>("in_enc")
        .map_or("UTF-8", String::as_str);
    let out_enc = matches
        .get_one::<String>("out_enc")
        .map_or("UTF-8", String::as_str);

    let mut options = ConverterOptions::new(
        matches
            .get_one::<String>("dict_dir")
            .map_or(ConverterOptions::DEFAULT_DICT_DIR, String::as_str),
    );
    if let Some(config_dir) = matches.get_one::<String>("config_dir") {
        options = options.with_config_dir(config_dir);
    }

    // Resolve the chain before touching the input so a bad mode or dictionary fails fast
    let start = Instant::now();
    let opencc = OpenCC::with_options(config, &options)?;
    debug!("profile {} ready in {:?}", opencc.profile(), start.elapsed());

    let mut input: Box<dyn Read> = match input_file {
        Some(file_name) => Box::new(BufReader::new(File::open(file_name)?)),
        None => {
            if io::stdin().is_terminal() {
                eprintln!("{BLUE}Input text to convert, <ctrl-z> or <ctrl-d> to submit:{RESET}");
            }
            Box::new(io::stdin())
        }
    };

    let is_console = input_file.is_none();
    let mut buffer = read_input(&mut *input, is_console)?;

    if in_enc == "UTF-8" {
        remove_utf8_bom(&mut buffer);
    }

    let input_str = decode_input(&buffer, in_enc)?;
    let output_str = opencc.convert(&input_str)?;

    let mut output = BufWriter::new(match output_file {
        Some(file_name) => Box::new(File::create(file_name)?) as Box<dyn Write>,
        None => Box::new(io::stdout()) as Box<dyn Write>,
    });
    encode_and_write_output(&output_str, out_enc, &mut output)?;
    output.flush()?;

    let source = input_file.map_or("<stdin>", String::as_str);
    let target = output_file.map_or("stdout", String::as_str);
    eprintln!(
        "{BLUE}Conversion completed ({config}): {source} -> {target} in {:.2?}{RESET}",
        start.elapsed()
    );

    Ok(())
}
