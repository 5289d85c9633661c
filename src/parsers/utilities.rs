//! Utility parsers. The SAS format is line based but, apart from names, any
//! whitespace separates tokens, so most parsers skip leading whitespace.

use nom::{
    bytes::complete::tag,
    character::complete::{i32 as nom_i32, multispace0, not_line_ending, u64 as nom_u64},
    combinator::{map, verify},
    multi::length_count,
    sequence::{delimited, preceded},
};

use crate::parsers::{ParseError, ParseResult, Span};

/// A combinator that takes a parser `inner` and produces a parser that also
/// consumes leading whitespace, returning the output of `inner`.
pub fn leading_whitespace<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    preceded(multispace0, inner)
}

/// Parses a fixed token such as `begin_state`.
pub fn keyword<'a>(name: &'static str) -> impl FnMut(Span<'a>) -> ParseResult<'a, Span<'a>> {
    leading_whitespace(tag(name))
}

/// A combinator that wraps `inner` in a `begin`/`end` keyword pair.
pub fn section<'a, F, O>(
    begin: &'static str,
    inner: F,
    end: &'static str,
) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    delimited(keyword(begin), inner, keyword(end))
}

/// A combinator for the format's `count item*` lists.
pub fn counted<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, Vec<O>>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    length_count(parse_usize, inner)
}

/// Parses a non-negative integer.
pub fn parse_usize(input: Span) -> ParseResult<usize> {
    map(leading_whitespace(nom_u64), |value| value as usize)(input)
}

/// Parses a possibly negative integer.
pub fn parse_int(input: Span) -> ParseResult<i32> {
    leading_whitespace(nom_i32)(input)
}

/// Parses the rest of the next non-empty line, used for variable, value and
/// operator names which may contain spaces.
pub fn parse_line(input: Span) -> ParseResult<String> {
    map(
        verify(leading_whitespace(not_line_ending), |line: &Span| {
            !line.fragment().trim().is_empty()
        }),
        |line: Span| line.fragment().trim_end().to_string(),
    )(input)
}

/// Renders the furthest error position of a failed parse as `line:column`.
pub fn describe_error(error: &nom::Err<ParseError>) -> String {
    match error {
        nom::Err::Incomplete(_) => "unexpected end of input".to_string(),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            match e
                .errors
                .iter()
                .max_by_key(|(span, _)| span.location_offset())
            {
                Some((span, kind)) => format!(
                    "{:?} at line {}, column {}",
                    kind,
                    span.location_line(),
                    span.get_utf8_column()
                ),
                None => "unknown error".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::Match;

    #[test]
    fn parse_usize_skips_whitespace() {
        assert!(parse_usize(Span::new("\n  42")).is_exactly(42));
        assert!(parse_usize(Span::new("-1")).is_err());
    }

    #[test]
    fn parse_int_accepts_negative() {
        assert!(parse_int(Span::new(" -1")).is_exactly(-1));
    }

    #[test]
    fn parse_line_keeps_spaces() {
        let (remainder, line) = parse_line(Span::new("\nAtom on(a, b)\n5")).unwrap();
        assert_eq!(line, "Atom on(a, b)");
        assert!(parse_usize(remainder).is_exactly(5));
    }

    #[test]
    fn counted_reads_exact_number() {
        let mut parser = counted(parse_usize);
        let (remainder, values) = parser(Span::new("2\n7\n8\n9")).unwrap();
        assert_eq!(values, vec![7, 8]);
        assert_eq!(remainder.fragment().trim(), "9");
    }

    #[test]
    fn section_requires_both_keywords() {
        let mut parser = section("begin_metric", parse_usize, "end_metric");
        assert!(parser(Span::new("begin_metric\n1\nend_metric")).is_exactly(1));
        assert!(parser(Span::new("begin_metric\n1\n")).is_err());
    }

    #[test]
    fn describe_error_reports_line() {
        let error = parse_usize(Span::new("\n\nx")).unwrap_err();
        assert!(describe_error(&error).contains("line 3"));
    }
}
