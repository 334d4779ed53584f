//! Converts compiled Lua 5.0/5.1 bytecode dumps to and from the game
//! engine's container format, which stamps every function record with a
//! sequence number.
//!
//! Reading is done with `nom` over a fully buffered dump; writing goes
//! through [`writer::Writer`]. Both sides share the [`bytecode`] data model.

pub mod bytecode;
pub mod error;
pub mod parser;
pub mod writer;

pub use bytecode::{
    Chunk, Constant, ConstantTag, Format, Function, Header, Local, LuaString, MAX_NESTING,
    NumberSize, Version,
};
pub use error::{Error, Result};

use log::debug;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Peeks at the start of a stream to find its format. `None` if unrecognized.
///
/// The read position is restored before returning, so the stream can be
/// handed to [`load`] as is.
pub fn detect_format<R: Read + Seek>(input: &mut R) -> io::Result<Option<Format>> {
    let start = input.stream_position()?;

    let mut probe = Vec::with_capacity(parser::DETECT_LEN);
    let read = input
        .by_ref()
        .take(parser::DETECT_LEN as u64)
        .read_to_end(&mut probe);
    input.seek(SeekFrom::Start(start))?;
    read?;

    let format = parser::detect(&probe);
    debug!("Detected format: {:?}", format);

    Ok(format)
}

/// Reads a whole dump in `format` from the stream's current position
pub fn load<R: Read>(mut input: R, format: Format) -> Result<Chunk> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;

    parser::parse_chunk(&bytes, format)
}

/// Writes `chunk` as a dump in `format`
pub fn save<W: Write>(output: W, chunk: &Chunk, format: Format) -> Result<()> {
    writer::write_chunk(output, chunk, format)
}

/// Detects the input format and writes the chunk in its paired format.
///
/// Returns the `(source, target)` formats.
pub fn convert<R: Read + Seek, W: Write>(mut input: R, output: W) -> Result<(Format, Format)> {
    let source = detect_format(&mut input)?.ok_or(Error::Unrecognized)?;
    let target = source.counterpart();

    let chunk = load(input, source)?;
    save(output, &chunk, target)?;
    debug!("Converted {} to {}", source, target);

    Ok((source, target))
}
