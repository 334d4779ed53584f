use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError as NomParseError};
use std::io;
use thiserror::Error;

/// Failure of a whole load or save. There is no partial result.
#[derive(Debug, Error)]
pub enum Error {
    /// Short read, rejected write, or an underlying stream failure
    #[error("unable to read or write file: {0}")]
    Io(#[from] io::Error),

    /// Header mismatch, unknown constant tag or an impossible count
    #[error("bad or corrupted file at offset {offset:#x}: {reason}")]
    Malformed { offset: usize, reason: String },

    /// The stream does not start with any known header
    #[error("not recognized as a supported Lua file")]
    Unrecognized,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Converts a parser failure into a crate error, locating it in `source`
    pub(crate) fn from_parse(source: &[u8], err: nom::Err<ParseError<'_>>) -> Self {
        let err = match err {
            nom::Err::Incomplete(_) => return Self::eof(source.len()),
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
        };
        let offset = source.len().saturating_sub(err.input.len());

        match err.kind {
            ErrorKind::Eof | ErrorKind::Complete => Self::eof(offset),
            kind => Error::Malformed {
                offset,
                reason: err.context.unwrap_or(kind.description()).to_string(),
            },
        }
    }

    fn eof(offset: usize) -> Self {
        Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("unexpected end of file at offset {offset:#x}"),
        ))
    }
}

/// nom error carrying the innermost context label of the failing field
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError<'a> {
    pub input: &'a [u8],
    pub kind: ErrorKind,
    pub context: Option<&'static str>,
}

pub type PResult<'a, T> = nom::IResult<&'a [u8], T, ParseError<'a>>;

impl<'a> NomParseError<&'a [u8]> for ParseError<'a> {
    fn from_error_kind(input: &'a [u8], kind: ErrorKind) -> Self {
        Self {
            input,
            kind,
            context: None,
        }
    }

    fn append(_input: &'a [u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a> ContextError<&'a [u8]> for ParseError<'a> {
    fn add_context(_input: &'a [u8], ctx: &'static str, mut other: Self) -> Self {
        other.context.get_or_insert(ctx);
        other
    }
}

impl<'a, E> FromExternalError<&'a [u8], E> for ParseError<'a> {
    fn from_external_error(input: &'a [u8], kind: ErrorKind, _e: E) -> Self {
        Self::from_error_kind(input, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_maps_to_io() {
        let source = [0u8; 8];
        let err = ParseError::from_error_kind(&source[6..], ErrorKind::Eof);
        let err = Error::from_parse(&source, nom::Err::Error(err));
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn verify_maps_to_malformed_with_offset_and_context() {
        let source = [0u8; 8];
        let err = ParseError::from_error_kind(&source[5..], ErrorKind::Verify);
        let err = ParseError::add_context(&source[5..], "invalid number size", err);
        let err = Error::from_parse(&source, nom::Err::Failure(err));
        match err {
            Error::Malformed { offset, reason } => {
                assert_eq!(offset, 5);
                assert_eq!(reason, "invalid number size");
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn innermost_context_wins() {
        let source = [0u8; 2];
        let err = ParseError::from_error_kind(&source[..], ErrorKind::Verify);
        let err = ParseError::add_context(&source[..], "inner", err);
        let err = ParseError::add_context(&source[..], "outer", err);
        assert_eq!(err.context, Some("inner"));
    }
}
