pub mod detect;
pub mod function;
pub mod header;
pub mod primitives;

pub use detect::{DETECT_LEN, detect};
pub use function::parse_function;
pub use header::{parse_lua50_header, parse_lua51_header};

use crate::bytecode::{Chunk, Format, Version};
use crate::error::{Error, PResult, Result};
use log::warn;

fn parse_dump(input: &[u8], format: Format) -> PResult<'_, Chunk> {
    let (input, header) = match format.version {
        Version::Lua50 => parse_lua50_header(input, format.engine)?,
        Version::Lua51 => parse_lua51_header(input, format.engine)?,
    };
    let (input, function) = parse_function(input, &header)?;

    Ok((input, Chunk { function }))
}

/// Main entry point for parsing a bytecode dump in a known format
pub fn parse_chunk(input: &[u8], format: Format) -> Result<Chunk> {
    let (rest, chunk) = parse_dump(input, format).map_err(|err| Error::from_parse(input, err))?;

    if !rest.is_empty() {
        warn!(
            "Ignoring {} trailing bytes after the top-level function",
            rest.len()
        );
    }

    Ok(chunk)
}

/// Parses a Lua 5.0 dump, plain or engine container
pub fn parse_lua50(input: &[u8], engine: bool) -> Result<Chunk> {
    parse_chunk(input, Format::new(Version::Lua50, engine))
}

/// Parses a Lua 5.1 dump, plain or engine container
pub fn parse_lua51(input: &[u8], engine: bool) -> Result<Chunk> {
    parse_chunk(input, Format::new(Version::Lua51, engine))
}
