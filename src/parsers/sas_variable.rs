//! Provides a parser for variable blocks.

use crate::parsed_types::SasVariable;
use crate::parsers::{counted, parse_int, parse_line, section, ParseResult, Span};
use nom::combinator::map;
use nom::sequence::tuple;

/// Parses a variable block. The domain size is implied by the number of value
/// names.
///
/// ## Example
/// ```
/// # use sasplan::parsers::{parse_variable, preamble::*};
/// let input = "begin_variable
/// var0
/// -1
/// 2
/// Atom handempty()
/// NegatedAtom handempty()
/// end_variable";
/// let (_, variable) = parse_variable(input).unwrap();
/// assert_eq!(variable.name(), "var0");
/// assert_eq!(variable.axiom_layer(), -1);
/// assert_eq!(variable.domain_size(), 2);
/// assert_eq!(variable.value_names()[1], "NegatedAtom handempty()");
/// ```
pub fn parse_variable<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, SasVariable> {
    map(
        section(
            "begin_variable",
            tuple((parse_line, parse_int, counted(parse_line))),
            "end_variable",
        ),
        |(name, axiom_layer, value_names)| SasVariable::new(name, axiom_layer, value_names),
    )(input.into())
}

impl crate::parsers::Parser for SasVariable {
    type Item = SasVariable;

    /// See [`parse_variable`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_variable(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_name_fails() {
        let input = "begin_variable\nvar0\n-1\n3\na\nb\nend_variable";
        // `end_variable` is swallowed as the third value name
        assert!(parse_variable(input).is_err());
    }

    #[test]
    fn derived_variable_keeps_layer() {
        let input = "begin_variable\nvar7\n0\n2\nAtom x\nNegatedAtom x\nend_variable";
        let (_, variable) = parse_variable(input).unwrap();
        assert_eq!(variable.axiom_layer(), 0);
    }
}
