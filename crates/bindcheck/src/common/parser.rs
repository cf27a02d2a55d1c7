use std::fmt::{Debug, Display, Formatter};

use nom::combinator::all_consuming;
use nom::error::{ErrorKind, ParseError};
use nom::{IResult, Parser};

/// Failure of a vendor output parser: what was expected and where.
#[derive(Debug, PartialEq)]
pub struct ParserError<I> {
    pub input: I,
    pub kind: ErrorKind,
}

impl<I> ParseError<I> for ParserError<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        ParserError { input, kind }
    }

    // Keep the innermost failure, it points closest to the offending text.
    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I: Debug> Display for ParserError<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected {:?} at {:?}", self.kind, self.input)
    }
}

pub type NomResult<'a, Ret> = IResult<&'a str, Ret, ParserError<&'a str>>;

/// Runs `parser` and fails unless the whole input was consumed.
pub fn consume_all<'a, O, P>(parser: P, input: &'a str) -> anyhow::Result<O>
where
    P: Parser<&'a str, O, ParserError<&'a str>>,
{
    match all_consuming(parser).parse(input) {
        Ok((_, output)) => Ok(output),
        Err(nom::Err::Error(error) | nom::Err::Failure(error)) => Err(anyhow::anyhow!("{error}")),
        Err(nom::Err::Incomplete(_)) => Err(anyhow::anyhow!("incomplete input {input:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::consume_all;
    use nom::bytes::complete::tag;

    #[test]
    fn test_consume_all() {
        assert_eq!(consume_all(tag("GPU"), "GPU").unwrap(), "GPU");
    }

    #[test]
    fn test_consume_all_trailing_input() {
        let error = consume_all(tag("GPU"), "GPU-1").unwrap_err();
        assert_eq!(error.to_string(), "expected Eof at \"-1\"");
    }

    #[test]
    fn test_consume_all_mismatch() {
        let error = consume_all(tag("MIG"), "GPU-1").unwrap_err();
        assert_eq!(error.to_string(), "expected Tag at \"GPU-1\"");
    }
}
