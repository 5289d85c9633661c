//! Provides a parser for `var value` pairs.

use crate::parsed_types::SasFact;
use crate::parsers::{parse_usize, ParseResult, Span};
use nom::combinator::map;
use nom::sequence::pair;

/// Parses a fact, i.e. `<var> <value>`.
///
/// ## Example
/// ```
/// # use sasplan::parsers::{parse_fact, preamble::*};
/// # use sasplan::parsed_types::SasFact;
/// assert!(parse_fact("3 1").is_value(SasFact::new(3, 1)));
/// assert!(parse_fact("3").is_err());
/// ```
pub fn parse_fact<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, SasFact> {
    map(pair(parse_usize, parse_usize), |(var, value)| {
        SasFact::new(var, value)
    })(input.into())
}

impl crate::parsers::Parser for SasFact {
    type Item = SasFact;

    /// See [`parse_fact`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_fact(input)
    }
}
