use super::primitives::{
    parse_byte, parse_constant, parse_instruction, parse_integer, parse_section, parse_string,
};
use crate::bytecode::{Constant, Function, Header, Local, LuaString, MAX_NESTING, Version};
use crate::error::{PResult, ParseError};
use log::trace;
use nom::{Parser, error::ErrorKind};

/// Parsing functions module
mod parsers {
    use super::*;

    /// Variable-length sections of a function record
    pub struct Body {
        pub lines: Vec<i32>,
        pub locals: Vec<Local>,
        pub upvalues: Vec<LuaString>,
        pub constants: Vec<Constant>,
        pub functions: Vec<Function>,
        pub instructions: Vec<u32>,
    }

    /// Parse a local variable
    pub fn parse_local(input: &[u8]) -> PResult<'_, Local> {
        let (input, name) = parse_string(input)?;
        let (input, start_pc) = parse_integer(input)?;
        let (input, end_pc) = parse_integer(input)?;

        Ok((
            input,
            Local {
                name,
                start_pc,
                end_pc,
            },
        ))
    }

    /// Parse debug information (line info, locals, upvalue names)
    pub fn parse_debug_info(input: &[u8]) -> PResult<'_, (Vec<i32>, Vec<Local>, Vec<LuaString>)> {
        let (input, lines) = parse_section(input, parse_integer)?;
        let (input, locals) = parse_section(input, parse_local)?;
        let (input, upvalues) = parse_section(input, parse_string)?;

        Ok((input, (lines, locals, upvalues)))
    }

    /// 5.0 order: debug info, constants, nested functions, code
    pub fn parse_lua50_body<'a>(
        input: &'a [u8],
        header: &Header,
        level: usize,
    ) -> PResult<'a, Body> {
        let (input, (lines, locals, upvalues)) = parse_debug_info(input)?;
        let (input, constants) = parse_section(input, |i| parse_constant(i, header))?;
        let (input, functions) =
            parse_section(input, |i| parse_nested_function(i, header, level + 1))?;
        let (input, instructions) = parse_section(input, parse_instruction)?;

        Ok((
            input,
            Body {
                lines,
                locals,
                upvalues,
                constants,
                functions,
                instructions,
            },
        ))
    }

    /// 5.1 order: code, constants, nested functions, debug info
    pub fn parse_lua51_body<'a>(
        input: &'a [u8],
        header: &Header,
        level: usize,
    ) -> PResult<'a, Body> {
        let (input, instructions) = parse_section(input, parse_instruction)?;
        let (input, constants) = parse_section(input, |i| parse_constant(i, header))?;
        let (input, functions) =
            parse_section(input, |i| parse_nested_function(i, header, level + 1))?;
        let (input, (lines, locals, upvalues)) = parse_debug_info(input)?;

        Ok((
            input,
            Body {
                lines,
                locals,
                upvalues,
                constants,
                functions,
                instructions,
            },
        ))
    }
}

use parsers::*;

/// Parse a function prototype and everything nested in it
pub fn parse_function<'a>(input: &'a [u8], header: &Header) -> PResult<'a, Function> {
    parse_nested_function(input, header, 1)
}

/// Parse a function record found at nesting `level`
fn parse_nested_function<'a>(
    input: &'a [u8],
    header: &Header,
    level: usize,
) -> PResult<'a, Function> {
    if level > MAX_NESTING {
        return Err(nom::Err::Failure(ParseError {
            input,
            kind: ErrorKind::TooLarge,
            context: Some("function nesting too deep"),
        }));
    }
    let version = header.format.version;

    let (input, name) = parse_string(input)?;
    let (input, line_defined) = parse_integer(input)?;
    let (input, last_line_defined) = match version {
        Version::Lua50 => (input, -1),
        Version::Lua51 => parse_integer(input)?,
    };
    // Engine sequence number, regenerated on write
    let (input, sequence) = if header.format.engine {
        let (input, sequence) = parse_integer(input)?;
        (input, Some(sequence))
    } else {
        (input, None)
    };
    let (input, (num_upvalues, num_params, is_vararg, max_stack_size)) =
        (parse_byte, parse_byte, parse_byte, parse_byte).parse(input)?;

    let (input, body) = match version {
        Version::Lua50 => parse_lua50_body(input, header, level)?,
        Version::Lua51 => parse_lua51_body(input, header, level)?,
    };

    let function = Function {
        name,
        line_defined,
        last_line_defined,
        num_upvalues,
        num_params,
        is_vararg,
        max_stack_size,
        lines: body.lines,
        locals: body.locals,
        upvalues: body.upvalues,
        constants: body.constants,
        functions: body.functions,
        instructions: body.instructions,
    };

    trace!(
        "Parsed function {:?} (line {}, sequence {:?}): {} instructions, {} constants, {} functions",
        function.name,
        function.line_defined,
        sequence,
        function.instructions.len(),
        function.constants.len(),
        function.functions.len()
    );

    Ok((input, function))
}
