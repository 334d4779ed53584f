use crate::bytecode::{Constant, LuaString, NumberSize};
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

/// Little-endian primitive writer; the number width is fixed per stream
pub struct Writer<W: Write> {
    output: W,
    size_number: NumberSize,
}

impl<W: Write> Writer<W> {
    pub fn new(output: W, size_number: NumberSize) -> Self {
        Self {
            output,
            size_number,
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.write_all(bytes)
    }

    pub fn write_byte(&mut self, value: u8) -> io::Result<()> {
        self.output.write_u8(value)
    }

    pub fn write_integer(&mut self, value: i32) -> io::Result<()> {
        self.output.write_i32::<LittleEndian>(value)
    }

    pub fn write_u64(&mut self, value: u64) -> io::Result<()> {
        self.output.write_u64::<LittleEndian>(value)
    }

    pub fn write_instruction(&mut self, value: u32) -> io::Result<()> {
        self.output.write_u32::<LittleEndian>(value)
    }

    /// Writes an element or byte count, which must fit a signed 32-bit field
    pub fn write_count(&mut self, len: usize) -> io::Result<()> {
        let len = i32::try_from(len).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("length {len} does not fit in a 32-bit count"),
            )
        })?;
        self.write_integer(len)
    }

    /// Writes a number narrowed to the stream's width
    pub fn write_number(&mut self, value: f64) -> io::Result<()> {
        match self.size_number {
            NumberSize::Four => self.output.write_f32::<LittleEndian>(value as f32),
            NumberSize::Eight => self.output.write_f64::<LittleEndian>(value),
        }
    }

    /// Writes a string as length (terminator included), bytes, terminator
    pub fn write_string(&mut self, s: &LuaString) -> io::Result<()> {
        self.write_count(s.len() + 1)?;
        self.write_bytes(s.as_bytes())?;
        self.write_byte(0)
    }

    /// Function names store the empty string as a bare zero length
    pub fn write_name(&mut self, name: &LuaString) -> io::Result<()> {
        if name.is_empty() {
            self.write_integer(0)
        } else {
            self.write_string(name)
        }
    }

    pub fn write_constant(&mut self, constant: &Constant) -> io::Result<()> {
        self.write_byte(constant.tag().into())?;
        match constant {
            Constant::Nil => Ok(()),
            Constant::Boolean(b) => self.write_byte(u8::from(*b)),
            Constant::Number(n) => self.write_number(*n),
            Constant::String(s) => self.write_string(s),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}
