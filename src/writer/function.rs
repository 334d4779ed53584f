use super::primitives::Writer;
use crate::bytecode::{Function, Local, MAX_NESTING, Version};
use log::trace;
use std::io::{self, Write};

/// Writes a count followed by each element
fn write_section<W, T, F>(writer: &mut Writer<W>, items: &[T], mut write: F) -> io::Result<()>
where
    W: Write,
    F: FnMut(&mut Writer<W>, &T) -> io::Result<()>,
{
    writer.write_count(items.len())?;
    for item in items {
        write(writer, item)?;
    }
    Ok(())
}

fn write_local<W: Write>(writer: &mut Writer<W>, local: &Local) -> io::Result<()> {
    writer.write_string(&local.name)?;
    writer.write_integer(local.start_pc)?;
    writer.write_integer(local.end_pc)
}

fn write_debug_info<W: Write>(writer: &mut Writer<W>, function: &Function) -> io::Result<()> {
    write_section(writer, &function.lines, |w, line| w.write_integer(*line))?;
    write_section(writer, &function.locals, write_local)?;
    write_section(writer, &function.upvalues, |w, name| w.write_string(name))
}

fn write_code<W: Write>(writer: &mut Writer<W>, function: &Function) -> io::Result<()> {
    write_section(writer, &function.instructions, |w, i| w.write_instruction(*i))
}

fn write_constants<W: Write>(writer: &mut Writer<W>, function: &Function) -> io::Result<()> {
    write_section(writer, &function.constants, |w, k| w.write_constant(k))
}

fn write_functions<W: Write>(
    writer: &mut Writer<W>,
    function: &Function,
    version: Version,
    mut sequence: Option<&mut i32>,
    level: usize,
) -> io::Result<()> {
    write_section(writer, &function.functions, |w, child| {
        write_nested_function(w, child, version, sequence.as_deref_mut(), level + 1)
    })
}

/// Writes a function record and, recursively, its nested functions.
///
/// `sequence` is present only for the engine container. It holds the next
/// number to stamp; every record takes one in pre-order, so a whole chunk is
/// numbered 1, 2, 3, ... regardless of nesting.
///
/// Trees nested deeper than [`MAX_NESTING`] are refused, as the reader
/// would reject them.
pub fn write_function<W: Write>(
    writer: &mut Writer<W>,
    function: &Function,
    version: Version,
    sequence: Option<&mut i32>,
) -> io::Result<()> {
    write_nested_function(writer, function, version, sequence, 1)
}

fn write_nested_function<W: Write>(
    writer: &mut Writer<W>,
    function: &Function,
    version: Version,
    mut sequence: Option<&mut i32>,
    level: usize,
) -> io::Result<()> {
    if level > MAX_NESTING {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "function nesting too deep",
        ));
    }
    writer.write_name(&function.name)?;
    writer.write_integer(function.line_defined)?;
    if version == Version::Lua51 {
        writer.write_integer(function.last_line_defined)?;
    }
    if let Some(next) = sequence.as_deref_mut() {
        trace!("Writing function {:?} as sequence {}", function.name, next);
        writer.write_integer(*next)?;
        *next += 1;
    }
    writer.write_bytes(&[
        function.num_upvalues,
        function.num_params,
        function.is_vararg,
        function.max_stack_size,
    ])?;

    match version {
        Version::Lua50 => {
            write_debug_info(writer, function)?;
            write_constants(writer, function)?;
            write_functions(writer, function, version, sequence, level)?;
            write_code(writer, function)
        }
        Version::Lua51 => {
            write_code(writer, function)?;
            write_constants(writer, function)?;
            write_functions(writer, function, version, sequence, level)?;
            write_debug_info(writer, function)
        }
    }
}
