use super::primitives::parse_byte;
use crate::bytecode::{
    ENGINE_FORMAT, ENGINE_SIGNATURE, Format, Header, LITTLE_ENDIAN, LUA_SIGNATURE, LUA50_VERSION,
    LUA51_VERSION, NumberSize, OFFICIAL_FORMAT, SIZE_A, SIZE_B, SIZE_C, SIZE_INSTRUCTION,
    SIZE_INT, SIZE_OP, SIZE_SIZE_T, TEST_NUMBER, Version,
};
use crate::error::PResult;
use log::debug;
use nom::{
    Parser,
    bytes::complete::take,
    combinator::{map_res, verify},
    error::context,
    number::complete::le_u64,
};

/// 5.0 dumps only support 8-byte numbers
const LUA50_SIZE_NUMBER: u8 = 8;

/// Parsing functions module
mod parsers {
    use super::*;

    pub fn parse_signature<'a>(expected: &'static [u8], input: &'a [u8]) -> PResult<'a, &'a [u8]> {
        context(
            "invalid signature",
            verify(take(expected.len()), move |sig: &[u8]| sig == expected),
        )
        .parse(input)
    }

    /// Parses a byte that must hold exactly one value
    pub fn parse_fixed<'a>(name: &'static str, expected: u8, input: &'a [u8]) -> PResult<'a, u8> {
        context(name, verify(parse_byte, move |&v| v == expected)).parse(input)
    }

    pub fn parse_number_size(input: &[u8]) -> PResult<'_, NumberSize> {
        context(
            "invalid number size",
            map_res(parse_byte, |b: u8| NumberSize::try_from(b)),
        )
        .parse(input)
    }

    pub fn parse_test_number(input: &[u8]) -> PResult<'_, u64> {
        context("invalid test number", verify(le_u64, |&v| v == TEST_NUMBER)).parse(input)
    }

    /// Word sizes shared by both header layouts
    pub fn parse_word_sizes(input: &[u8]) -> PResult<'_, ()> {
        let (input, _) = parse_fixed("unsupported endianness", LITTLE_ENDIAN, input)?;
        let (input, _) = parse_fixed("invalid int size", SIZE_INT, input)?;
        let (input, _) = parse_fixed("invalid size_t size", SIZE_SIZE_T, input)?;
        let (input, _) = parse_fixed("invalid instruction size", SIZE_INSTRUCTION, input)?;
        Ok((input, ()))
    }
}

use parsers::*;

/// Parse a 5.0 header. The engine container swaps the signature and
/// stamps 0x51 as the version byte.
pub fn parse_lua50_header(input: &[u8], engine: bool) -> PResult<'_, Header> {
    let (signature, version) = if engine {
        (ENGINE_SIGNATURE, LUA51_VERSION)
    } else {
        (LUA_SIGNATURE, LUA50_VERSION)
    };

    let (input, _) = parse_signature(signature, input)?;
    let (input, _) = parse_fixed("invalid Lua version", version, input)?;
    let (input, _) = parse_word_sizes(input)?;
    let (input, _) = parse_fixed("invalid opcode size", SIZE_OP, input)?;
    let (input, _) = parse_fixed("invalid A operand size", SIZE_A, input)?;
    let (input, _) = parse_fixed("invalid B operand size", SIZE_B, input)?;
    let (input, _) = parse_fixed("invalid C operand size", SIZE_C, input)?;
    let (input, _) = parse_fixed("invalid number size", LUA50_SIZE_NUMBER, input)?;
    let (input, _) = parse_test_number(input)?;

    let header = Header {
        format: Format::new(Version::Lua50, engine),
        size_number: NumberSize::Eight,
    };

    debug!("Parsed header: {:?}", header);

    Ok((input, header))
}

/// Parse a 5.1 header. The engine container is marked by the format byte.
pub fn parse_lua51_header(input: &[u8], engine: bool) -> PResult<'_, Header> {
    let format = if engine { ENGINE_FORMAT } else { OFFICIAL_FORMAT };

    let (input, _) = parse_signature(LUA_SIGNATURE, input)?;
    let (input, _) = parse_fixed("invalid Lua version", LUA51_VERSION, input)?;
    let (input, _) = parse_fixed("unsupported format", format, input)?;
    let (input, _) = parse_word_sizes(input)?;
    let (input, size_number) = parse_number_size(input)?;
    let (input, _) = parse_fixed("unsupported integral numbers", 0, input)?;

    let header = Header {
        format: Format::new(Version::Lua51, engine),
        size_number,
    };

    debug!("Parsed header: {:?}", header);

    Ok((input, header))
}
