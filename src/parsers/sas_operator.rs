//! Provides a parser for operator blocks.

use crate::parsed_types::SasOperator;
use crate::parsers::{
    counted, parse_effect, parse_fact, parse_int, parse_line, section, ParseResult, Span,
};
use nom::combinator::map;
use nom::sequence::tuple;

/// Parses an operator block.
///
/// ## Example
/// ```
/// # use sasplan::parsers::{parse_operator, preamble::*};
/// let input = "begin_operator
/// pick-up a
/// 1
/// 1 0
/// 2
/// 0 0 0 1
/// 0 2 -1 0
/// 1
/// end_operator";
/// let (_, op) = parse_operator(input).unwrap();
/// assert_eq!(op.name(), "pick-up a");
/// assert_eq!(op.prevail().len(), 1);
/// assert_eq!(op.effects().len(), 2);
/// assert_eq!(op.cost(), 1);
/// ```
pub fn parse_operator<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, SasOperator> {
    map(
        section(
            "begin_operator",
            tuple((
                parse_line,
                counted(parse_fact),
                counted(parse_effect),
                parse_int,
            )),
            "end_operator",
        ),
        |(name, prevail, effects, cost)| SasOperator::new(name, prevail, effects, cost),
    )(input.into())
}

impl crate::parsers::Parser for SasOperator {
    type Item = SasOperator;

    /// See [`parse_operator`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_operator(input)
    }
}
