use super::primitives::Writer;
use crate::bytecode::{
    ENGINE_FORMAT, ENGINE_SIGNATURE, Header, LITTLE_ENDIAN, LUA_SIGNATURE, LUA50_VERSION,
    LUA51_VERSION, OFFICIAL_FORMAT, SIZE_A, SIZE_B, SIZE_C, SIZE_INSTRUCTION, SIZE_INT, SIZE_OP,
    SIZE_SIZE_T, TEST_NUMBER, Version,
};
use std::io::{self, Write};

fn write_word_sizes<W: Write>(writer: &mut Writer<W>) -> io::Result<()> {
    writer.write_bytes(&[LITTLE_ENDIAN, SIZE_INT, SIZE_SIZE_T, SIZE_INSTRUCTION])
}

/// Writes a header synthesized from `header`, never copied from an input file
pub fn write_header<W: Write>(writer: &mut Writer<W>, header: &Header) -> io::Result<()> {
    let engine = header.format.engine;
    let size_number = u8::from(header.size_number);

    match header.format.version {
        Version::Lua50 => {
            if engine {
                writer.write_bytes(ENGINE_SIGNATURE)?;
                writer.write_byte(LUA51_VERSION)?;
            } else {
                writer.write_bytes(LUA_SIGNATURE)?;
                writer.write_byte(LUA50_VERSION)?;
            }
            write_word_sizes(writer)?;
            writer.write_bytes(&[SIZE_OP, SIZE_A, SIZE_B, SIZE_C, size_number])?;
            writer.write_u64(TEST_NUMBER)
        }
        Version::Lua51 => {
            writer.write_bytes(LUA_SIGNATURE)?;
            writer.write_byte(LUA51_VERSION)?;
            writer.write_byte(if engine { ENGINE_FORMAT } else { OFFICIAL_FORMAT })?;
            write_word_sizes(writer)?;
            writer.write_byte(size_number)?;
            // integral flag: numbers are floating point
            writer.write_byte(0)
        }
    }
}
