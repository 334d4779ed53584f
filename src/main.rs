use clap::{Parser, ValueEnum};
use log::info;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use luacvt::{Format, detect_format, load, save};

/// Command-line arguments parser
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Convert Lua 5.0/5.1 bytecode to and from the engine's Lua container",
    long_about = "Reads a Lua or engine bytecode file and converts it to the paired format. \
                  The source format is detected automatically: Lua 5.0 files become engine 5.0 \
                  files and vice versa, Lua 5.1 files become engine 5.1 files and vice versa."
)]
struct Arguments {
    /// Path to the bytecode file to convert
    #[clap(
        help = "Lua or engine bytecode file to read.",
        value_name = "SRC",
        value_hint = clap::ValueHint::FilePath
    )]
    source: PathBuf,

    /// Path of the converted file
    #[clap(
        help = "File to write. Without it the decoded function tree is printed instead.",
        value_name = "DEST",
        value_hint = clap::ValueHint::FilePath
    )]
    destination: Option<PathBuf>,

    /// Output format override
    #[clap(
        long = "to",
        value_enum,
        requires = "destination",
        value_name = "FORMAT",
        help = "Write this format instead of the paired one. Must keep the Lua version."
    )]
    to: Option<OutputFormat>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Lua50,
    Lua51,
    Engine50,
    Engine51,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Lua50 => Format::LUA50,
            OutputFormat::Lua51 => Format::LUA51,
            OutputFormat::Engine50 => Format::ENGINE50,
            OutputFormat::Engine51 => Format::ENGINE51,
        }
    }
}

/// Prints the message and exits with a failure status
fn fail(message: impl Display) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Arguments::parse();
    let source = args.source.display();

    info!("Reading file: {}", source);

    let mut input = File::open(&args.source)
        .map(BufReader::new)
        .unwrap_or_else(|err| fail(format!("Unable to open input file \"{source}\": {err}")));

    let format = match detect_format(&mut input) {
        Ok(Some(format)) => format,
        Ok(None) => fail("Input file is not recognized as a supported Lua file"),
        Err(err) => fail(format!("Unable to read input file \"{source}\": {err}")),
    };
    info!("Detected format: {}", format);

    let chunk = load(input, format)
        .unwrap_or_else(|err| fail(format!("Error reading \"{source}\": {err}")));
    info!("Loaded {} function records", chunk.function.count());

    let Some(destination) = args.destination else {
        println!("Format: {}", format);
        println!("Function Prototype: {:#?}", chunk.function);
        return;
    };
    let target = match args.to.map(Format::from) {
        Some(target) if !format.convertible_to(target) => fail(format!(
            "Cannot convert {format} to {target}: only the container can change, not the Lua version"
        )),
        Some(target) => target,
        None => format.counterpart(),
    };

    let destination_name = destination.display();

    // Nothing touches DEST until the whole dump is encoded
    let mut output = Vec::new();
    save(&mut output, &chunk, target)
        .unwrap_or_else(|err| fail(format!("Error writing \"{destination_name}\": {err}")));
    fs::write(&destination, output).unwrap_or_else(|err| {
        fail(format!("Unable to write output file \"{destination_name}\": {err}"))
    });

    info!("Wrote {} file: {}", target, destination_name);
}
