//! Provides a parser for operator effect lines.

use crate::parsed_types::SasEffect;
use crate::parsers::{counted, parse_fact, parse_int, parse_usize, ParseResult, Span};
use nom::combinator::{map, map_opt};
use nom::sequence::tuple;

/// Parses an effect, i.e. `<ncond> (<var> <value>)* <var> <pre> <post>` where
/// a `pre` of `-1` means the effect has no precondition on its variable.
///
/// ## Example
/// ```
/// # use sasplan::parsers::{parse_effect, preamble::*};
/// # use sasplan::parsed_types::{SasEffect, SasFact};
/// assert!(parse_effect("0 2 -1 1").is_value(SasEffect::new(vec![], 2, None, 1)));
/// assert!(parse_effect("1 0 1 2 0 1").is_value(SasEffect::new(
///     vec![SasFact::new(0, 1)],
///     2,
///     Some(0),
///     1
/// )));
/// ```
pub fn parse_effect<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, SasEffect> {
    map(
        tuple((counted(parse_fact), parse_usize, parse_pre, parse_usize)),
        |(conditions, var, pre, post)| SasEffect::new(conditions, var, pre, post),
    )(input.into())
}

fn parse_pre(input: Span) -> ParseResult<Option<usize>> {
    map_opt(parse_int, |pre| match pre {
        -1 => Some(None),
        pre if pre >= 0 => Some(Some(pre as usize)),
        _ => None,
    })(input)
}

impl crate::parsers::Parser for SasEffect {
    type Item = SasEffect;

    /// See [`parse_effect`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_effect(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_other_negative_pre() {
        assert!(parse_effect("0 2 -2 1").is_err());
    }
}
