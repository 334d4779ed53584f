/*
  Data model shared by the reader and the writer
*/

use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

//////////////////////////////// Formats ////////////////////////////////

/// Script-language version of a bytecode dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    Lua50,
    Lua51,
}

/// One of the four supported container variants: a script-language version
/// crossed with the engine-container flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Format {
    pub version: Version,
    /// Engine container: extra per-function sequence number and a distinct
    /// signature (5.0) or format byte (5.1)
    pub engine: bool,
}

impl Format {
    pub const LUA50: Format = Format::new(Version::Lua50, false);
    pub const LUA51: Format = Format::new(Version::Lua51, false);
    pub const ENGINE50: Format = Format::new(Version::Lua50, true);
    pub const ENGINE51: Format = Format::new(Version::Lua51, true);

    pub const fn new(version: Version, engine: bool) -> Self {
        Self { version, engine }
    }

    /// The paired output format a converter writes for this input format
    pub const fn counterpart(self) -> Self {
        Self::new(self.version, !self.engine)
    }

    /// Whether a dump in this format can be rewritten as `other`.
    /// Only the container may change, never the script version.
    pub const fn convertible_to(self, other: Format) -> bool {
        matches!(
            (self.version, other.version),
            (Version::Lua50, Version::Lua50) | (Version::Lua51, Version::Lua51)
        )
    }

    pub const fn name(self) -> &'static str {
        match (self.version, self.engine) {
            (Version::Lua50, false) => "lua50",
            (Version::Lua51, false) => "lua51",
            (Version::Lua50, true) => "engine50",
            (Version::Lua51, true) => "engine51",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// On-disk width of a number constant, fixed per stream by the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum NumberSize {
    Four = 4,
    Eight = 8,
}

//////////////////////////////// Header layout ////////////////////////////////

pub(crate) const LUA_SIGNATURE: &[u8] = b"\x1BLua";
pub(crate) const ENGINE_SIGNATURE: &[u8] = b"\x1BLup";
pub(crate) const LUA50_VERSION: u8 = 0x50;
pub(crate) const LUA51_VERSION: u8 = 0x51;
pub(crate) const OFFICIAL_FORMAT: u8 = 0;
pub(crate) const ENGINE_FORMAT: u8 = b'p';
pub(crate) const LITTLE_ENDIAN: u8 = 1;
pub(crate) const SIZE_INT: u8 = 4;
pub(crate) const SIZE_SIZE_T: u8 = 4;
pub(crate) const SIZE_INSTRUCTION: u8 = 4;
// lopcodes.h field widths, stored by 5.0 headers only
pub(crate) const SIZE_OP: u8 = 6;
pub(crate) const SIZE_A: u8 = 8;
pub(crate) const SIZE_B: u8 = 9;
pub(crate) const SIZE_C: u8 = 9;
/// 5.0 test number: the bit pattern of 3.14159265358979e7
pub(crate) const TEST_NUMBER: u64 = 0x417D_F5E7_6893_09B6;

/// Deepest function nesting read or written, the top-level function being
/// level 1. Lua compilers stop well before this (`LUAI_MAXCCALLS`).
pub const MAX_NESTING: usize = 200;

/// Header fields that drive how the rest of a dump is coded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub format: Format,
    pub size_number: NumberSize,
}

impl Header {
    /// Header written for `format`, independent of whatever was read
    pub const fn canonical(format: Format) -> Self {
        let size_number = match format.version {
            Version::Lua50 => NumberSize::Eight,
            Version::Lua51 => NumberSize::Four,
        };
        Self {
            format,
            size_number,
        }
    }
}

//////////////////////////////// Structs ////////////////////////////////

/// Byte string as stored in the dump. Not necessarily UTF-8.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct LuaString(pub Vec<u8>);

impl LuaString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for LuaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for LuaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl From<&str> for LuaString {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<&[u8]> for LuaString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for LuaString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Tag byte preceding each entry of the constant pool (lua.h type codes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ConstantTag {
    Nil = 0,
    Boolean = 1,
    Number = 3,
    String = 4,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Nil,
    Boolean(bool),
    Number(f64),
    String(LuaString),
}

impl Constant {
    pub fn tag(&self) -> ConstantTag {
        match self {
            Constant::Nil => ConstantTag::Nil,
            Constant::Boolean(_) => ConstantTag::Boolean,
            Constant::Number(_) => ConstantTag::Number,
            Constant::String(_) => ConstantTag::String,
        }
    }
}

/// Local variable debug record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Local {
    pub name: LuaString,
    pub start_pc: i32, // First instruction where the variable is active
    pub end_pc: i32,   // First instruction where the variable is dead
}

/// A function prototype and, recursively, the prototypes nested in it
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: LuaString,
    pub line_defined: i32,
    /// Not stored by 5.0 dumps; reads back as -1 there
    pub last_line_defined: i32,
    pub num_upvalues: u8,
    pub num_params: u8,
    pub is_vararg: u8,
    pub max_stack_size: u8,
    pub lines: Vec<i32>, // Source line per instruction
    pub locals: Vec<Local>,
    pub upvalues: Vec<LuaString>,
    pub constants: Vec<Constant>,
    pub functions: Vec<Function>,
    pub instructions: Vec<u32>, // Opaque 32-bit instructions
}

impl Default for Function {
    fn default() -> Self {
        Self {
            name: LuaString::new(),
            line_defined: 0,
            last_line_defined: -1,
            num_upvalues: 0,
            num_params: 0,
            is_vararg: 0,
            max_stack_size: 0,
            lines: Vec::new(),
            locals: Vec::new(),
            upvalues: Vec::new(),
            constants: Vec::new(),
            functions: Vec::new(),
            instructions: Vec::new(),
        }
    }
}

impl Function {
    /// Number of function records in this subtree, this one included
    pub fn count(&self) -> usize {
        1 + self.functions.iter().map(Function::count).sum::<usize>()
    }
}

/// A whole compiled chunk: the top-level function and everything below it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    pub function: Function,
}
