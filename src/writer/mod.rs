pub mod function;
pub mod header;
pub mod primitives;

pub use function::write_function;
pub use header::write_header;
pub use primitives::Writer;

use crate::bytecode::{Chunk, Format, Header, Version};
use crate::error::Result;
use log::debug;
use std::io::Write;

/// Main entry point for writing a chunk in the given format.
/// The header is this tool's canonical one for `format`.
pub fn write_chunk<W: Write>(output: W, chunk: &Chunk, format: Format) -> Result<()> {
    let header = Header::canonical(format);
    debug!("Writing header: {:?}", header);

    let mut writer = Writer::new(output, header.size_number);
    write_header(&mut writer, &header)?;

    let mut next_sequence = 1;
    let sequence = format.engine.then_some(&mut next_sequence);
    write_function(&mut writer, &chunk.function, format.version, sequence)?;
    writer.flush()?;

    debug!(
        "Wrote {} function records as {}",
        chunk.function.count(),
        format
    );

    Ok(())
}

/// Writes a Lua 5.0 dump, plain or engine container
pub fn write_lua50<W: Write>(output: W, chunk: &Chunk, engine: bool) -> Result<()> {
    write_chunk(output, chunk, Format::new(Version::Lua50, engine))
}

/// Writes a Lua 5.1 dump, plain or engine container
pub fn write_lua51<W: Write>(output: W, chunk: &Chunk, engine: bool) -> Result<()> {
    write_chunk(output, chunk, Format::new(Version::Lua51, engine))
}
