use crate::bytecode::{Constant, ConstantTag, Header, LuaString, NumberSize};
use crate::error::PResult;
use nom::{
    Parser,
    bytes::complete::take,
    combinator::{map, map_res, verify},
    error::context,
    multi::count,
    number::complete::{le_f32, le_f64, le_i32, le_u32, u8},
};

/// Parses a single unsigned byte
pub fn parse_byte(input: &[u8]) -> PResult<'_, u8> {
    u8(input)
}

/// Parses a little-endian 32-bit integer
pub fn parse_integer(input: &[u8]) -> PResult<'_, i32> {
    le_i32(input)
}

/// Parses a single instruction (4 bytes, little-endian), kept opaque
pub fn parse_instruction(input: &[u8]) -> PResult<'_, u32> {
    le_u32(input)
}

/// Parses a 32-bit element or byte count. Negative counts are corrupt.
pub fn parse_count(input: &[u8]) -> PResult<'_, usize> {
    context("negative length", map_res(parse_integer, |n: i32| usize::try_from(n))).parse(input)
}

/// Parses a length-prefixed string with null terminator.
/// The length includes the terminator; zero means an empty string with no payload.
pub fn parse_string(input: &[u8]) -> PResult<'_, LuaString> {
    let (input, len) = parse_count(input)?;
    if len == 0 {
        return Ok((input, LuaString::new()));
    }

    let (input, bytes) = take(len - 1).parse(input)?;
    let (input, _) =
        context("missing string terminator", verify(parse_byte, |&b| b == 0)).parse(input)?;

    Ok((input, LuaString::from(bytes)))
}

/// Parses a number in the width the header selected, widened to f64
pub fn parse_number<'a>(input: &'a [u8], header: &Header) -> PResult<'a, f64> {
    match header.size_number {
        NumberSize::Four => map(le_f32, f64::from).parse(input),
        NumberSize::Eight => le_f64(input),
    }
}

/// Parses a constant value from the bytecode
pub fn parse_constant<'a>(input: &'a [u8], header: &Header) -> PResult<'a, Constant> {
    let (input, tag) = context(
        "unknown constant type",
        map_res(parse_byte, |b: u8| ConstantTag::try_from(b)),
    )
    .parse(input)?;

    match tag {
        ConstantTag::Nil => Ok((input, Constant::Nil)),
        ConstantTag::Boolean => map(parse_byte, |v| Constant::Boolean(v != 0)).parse(input),
        ConstantTag::Number => map(|i| parse_number(i, header), Constant::Number).parse(input),
        ConstantTag::String => map(parse_string, Constant::String).parse(input),
    }
}

/// Parses a section: an element count followed by that many elements
pub fn parse_section<'a, T, F>(input: &'a [u8], parser: F) -> PResult<'a, Vec<T>>
where
    F: FnMut(&'a [u8]) -> PResult<'a, T>,
{
    let (input, len) = parse_count(input)?;
    count(parser, len).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Format;
    use crate::error::Error;
    use nom::error::ErrorKind;

    const HEADER4: Header = Header {
        format: Format::LUA51,
        size_number: NumberSize::Four,
    };
    const HEADER8: Header = Header {
        format: Format::LUA50,
        size_number: NumberSize::Eight,
    };

    #[test]
    fn integer_is_little_endian() {
        let (rest, v) = parse_integer(&[0x78, 0x56, 0x34, 0x12, 0xAA]).unwrap();
        assert_eq!(v, 0x1234_5678);
        assert_eq!(rest, &[0xAA]);

        let (_, v) = parse_integer(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(v, -1);
    }

    #[test]
    fn string_strips_terminator() {
        let input = [4, 0, 0, 0, b'f', b'o', b'o', 0, 9];
        let (rest, s) = parse_string(&input).unwrap();
        assert_eq!(s.as_bytes(), b"foo");
        assert_eq!(rest, &[9]);
    }

    #[test]
    fn zero_length_string_has_no_payload() {
        let input = [0, 0, 0, 0, 7];
        let (rest, s) = parse_string(&input).unwrap();
        assert!(s.is_empty());
        assert_eq!(rest, &[7]);
    }

    #[test]
    fn empty_string_with_terminator() {
        let input = [1, 0, 0, 0, 0];
        let (rest, s) = parse_string(&input).unwrap();
        assert!(s.is_empty());
        assert!(rest.is_empty());
    }

    #[test]
    fn string_keeps_non_utf8_bytes() {
        let input = [3, 0, 0, 0, 0xE9, 0xFF, 0];
        let (_, s) = parse_string(&input).unwrap();
        assert_eq!(s.as_bytes(), &[0xE9, 0xFF]);
    }

    #[test]
    fn string_without_terminator_is_rejected() {
        let input = [2, 0, 0, 0, b'a', b'b'];
        let err = parse_string(&input).unwrap_err();
        let err = Error::from_parse(&input, err);
        assert!(err.is_malformed(), "{err}");
    }

    #[test]
    fn truncated_string_is_eof() {
        let input = [10, 0, 0, 0, b'a'];
        match parse_string(&input) {
            Err(nom::Err::Error(e)) => assert_eq!(e.kind, ErrorKind::Eof),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn negative_count_is_rejected() {
        let input = [0xFF, 0xFF, 0xFF, 0xFF];
        let err = Error::from_parse(&input, parse_count(&input).unwrap_err());
        assert!(err.is_malformed());
    }

    #[test]
    fn number_width_follows_header() {
        let single = 1.5f32.to_le_bytes();
        let (rest, v) = parse_number(&single, &HEADER4).unwrap();
        assert_eq!(v, 1.5);
        assert!(rest.is_empty());

        let double = 0.1f64.to_le_bytes();
        let (rest, v) = parse_number(&double, &HEADER8).unwrap();
        assert_eq!(v, 0.1);
        assert!(rest.is_empty());
    }

    #[test]
    fn constants_by_tag() {
        assert_eq!(parse_constant(&[0], &HEADER8).unwrap().1, Constant::Nil);
        assert_eq!(
            parse_constant(&[1, 1], &HEADER8).unwrap().1,
            Constant::Boolean(true)
        );
        assert_eq!(
            parse_constant(&[1, 0], &HEADER8).unwrap().1,
            Constant::Boolean(false)
        );

        let mut number = vec![3];
        number.extend_from_slice(&2.0f32.to_le_bytes());
        assert_eq!(
            parse_constant(&number, &HEADER4).unwrap().1,
            Constant::Number(2.0)
        );

        let string = [4, 3, 0, 0, 0, b'h', b'i', 0];
        assert_eq!(
            parse_constant(&string, &HEADER4).unwrap().1,
            Constant::String("hi".into())
        );
    }

    #[test]
    fn unknown_constant_tag_is_rejected() {
        let input = [2, 0, 0, 0, 0];
        let err = Error::from_parse(&input, parse_constant(&input, &HEADER8).unwrap_err());
        match err {
            Error::Malformed { offset, reason } => {
                assert_eq!(offset, 0);
                assert_eq!(reason, "unknown constant type");
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn section_reads_count_then_elements() {
        let input = [2, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 0xEE];
        let (rest, values) = parse_section(&input, parse_integer).unwrap();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(rest, &[0xEE]);
    }
}
