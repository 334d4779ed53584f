use super::primitives::parse_byte;
use crate::bytecode::{
    ENGINE_FORMAT, ENGINE_SIGNATURE, Format, LUA_SIGNATURE, LUA50_VERSION, LUA51_VERSION,
    OFFICIAL_FORMAT,
};
use crate::error::PResult;
use nom::{Parser, bytes::complete::take};

/// Most bytes the classification ever looks at: signature, version, format
pub const DETECT_LEN: usize = 6;

/// Classifies a dump by its leading bytes. `None` when unrecognized.
///
/// | signature  | version | format | result     |
/// |------------|---------|--------|------------|
/// | `\x1BLua`  | 0x50    |        | `LUA50`    |
/// | `\x1BLua`  | 0x51    | 0      | `LUA51`    |
/// | `\x1BLua`  | 0x51    | `p`    | `ENGINE51` |
/// | `\x1BLup`  | 0x51    |        | `ENGINE50` |
pub fn detect(input: &[u8]) -> Option<Format> {
    let parsed: PResult<'_, (&[u8], u8)> = (take(4usize), parse_byte).parse(input);
    let (input, (signature, version)) = parsed.ok()?;

    match (signature, version) {
        (LUA_SIGNATURE, LUA50_VERSION) => Some(Format::LUA50),
        (LUA_SIGNATURE, LUA51_VERSION) => match parse_byte(input).ok()?.1 {
            OFFICIAL_FORMAT => Some(Format::LUA51),
            ENGINE_FORMAT => Some(Format::ENGINE51),
            _ => None,
        },
        (ENGINE_SIGNATURE, LUA51_VERSION) => Some(Format::ENGINE50),
        _ => None,
    }
}
