#![allow(dead_code)]

use luacvt::writer::{Writer, write_header};
use luacvt::{Chunk, Constant, Format, Function, Header, Local, LuaString};

pub fn local(name: &str, start_pc: i32, end_pc: i32) -> Local {
    Local {
        name: name.into(),
        start_pc,
        end_pc,
    }
}

/// A chunk exercising every field: nested functions, all constant kinds,
/// non-UTF-8 strings and debug tables. Numbers are exact in single
/// precision so 5.1 output (4-byte numbers) keeps them.
pub fn sample_chunk() -> Chunk {
    let helper = Function {
        name: LuaString::new(),
        line_defined: 3,
        last_line_defined: 6,
        num_upvalues: 1,
        num_params: 2,
        is_vararg: 0,
        max_stack_size: 4,
        lines: vec![4, 4, 5, 6],
        locals: vec![local("a", 0, 4), local("b", 0, 4)],
        upvalues: vec!["counter".into()],
        constants: vec![Constant::Number(1.0), Constant::Nil],
        functions: vec![],
        instructions: vec![0x0000_0044, 0x0100_4012, 0x0000_001E, 0x0080_001E],
    };

    let inner = Function {
        line_defined: 9,
        last_line_defined: 9,
        max_stack_size: 2,
        lines: vec![9],
        instructions: vec![0x0080_001E],
        ..Function::default()
    };

    let outer = Function {
        line_defined: 8,
        last_line_defined: 10,
        num_params: 1,
        is_vararg: 3,
        max_stack_size: 2,
        lines: vec![9, 9, 10],
        locals: vec![local("self", 0, 3)],
        constants: vec![Constant::String(LuaString::from(&[0xC9u8, b't', b'\xE9'][..]))],
        functions: vec![inner],
        instructions: vec![0x0000_0024, 0x0000_001E, 0x0080_001E],
        ..Function::default()
    };

    Chunk {
        function: Function {
            name: "@scripts/main.lua".into(),
            line_defined: 0,
            last_line_defined: 0,
            num_upvalues: 0,
            num_params: 0,
            is_vararg: 2,
            max_stack_size: 5,
            lines: vec![1, 2, 2, 6, 10, 11],
            locals: vec![local("counter", 1, 6)],
            upvalues: vec![],
            constants: vec![
                Constant::Number(0.5),
                Constant::String("print".into()),
                Constant::String("".into()),
                Constant::Boolean(true),
                Constant::Boolean(false),
                Constant::Nil,
            ],
            functions: vec![helper, outer],
            instructions: vec![
                0x0000_0001,
                0x0000_0024,
                0x0000_4064,
                0x0000_0085,
                0x0100_401C,
                0x0080_001E,
            ],
        },
    }
}

/// The same chunk as a 5.0 read sees it: no last line defined
pub fn without_last_line(mut function: Function) -> Function {
    function.last_line_defined = -1;
    function.functions = function
        .functions
        .into_iter()
        .map(without_last_line)
        .collect();
    function
}

fn push_int(bytes: &mut Vec<u8>, v: i32) {
    bytes.extend_from_slice(&v.to_le_bytes());
}

/// Everything of a 5.1 record up to and including its child count
fn push_lua51_head(bytes: &mut Vec<u8>, children: i32) {
    push_int(bytes, 0); // name
    push_int(bytes, 0); // line defined
    push_int(bytes, 0); // last line defined
    bytes.extend_from_slice(&[0, 0, 0, 2]);
    push_int(bytes, 0); // code
    push_int(bytes, 0); // constants
    push_int(bytes, children);
}

/// A plain 5.1 dump of `depth` records each holding one child, around an
/// empty innermost record. Built by hand since the writer refuses trees
/// this deep.
pub fn lua51_chain(depth: usize) -> Vec<u8> {
    let header = Header::canonical(Format::LUA51);
    let mut out = Writer::new(Vec::new(), header.size_number);
    write_header(&mut out, &header).unwrap();
    let mut bytes = out.into_inner();

    for _ in 0..depth {
        push_lua51_head(&mut bytes, 1);
    }
    push_lua51_head(&mut bytes, 0);
    for _ in 0..=depth {
        push_int(&mut bytes, 0); // lines
        push_int(&mut bytes, 0); // locals
        push_int(&mut bytes, 0); // upvalues
    }
    bytes
}

/// Runs `test` on a thread with a main-thread sized stack (8 MiB), which
/// the deepest allowed nesting is sized for
pub fn with_main_stack<F: FnOnce() + Send + 'static>(test: F) {
    std::thread::Builder::new()
        .stack_size(8 << 20)
        .spawn(test)
        .unwrap()
        .join()
        .unwrap();
}
