//! Parsers for the small fixed sections of a SAS file.

use crate::parsed_types::SasFact;
use crate::parsers::{counted, parse_fact, parse_usize, section, ParseResult, Span};
use nom::combinator::map;
use nom::multi::many0;

/// Parses `begin_version <n> end_version`.
pub fn parse_version<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, u32> {
    map(
        section("begin_version", parse_usize, "end_version"),
        |version| version as u32,
    )(input.into())
}

/// Parses `begin_metric <0|1> end_metric`, returning whether operator costs
/// are used.
pub fn parse_metric<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, bool> {
    map(
        section("begin_metric", parse_usize, "end_metric"),
        |metric| metric != 0,
    )(input.into())
}

/// Parses a mutex group, i.e. a counted list of facts of which at most one
/// holds in any reachable state.
///
/// ## Example
/// ```
/// # use sasplan::parsers::{parse_mutex_group, preamble::*};
/// # use sasplan::parsed_types::SasFact;
/// let input = "begin_mutex_group\n2\n0 0\n1 1\nend_mutex_group";
/// assert!(parse_mutex_group(input).is_value(vec![SasFact::new(0, 0), SasFact::new(1, 1)]));
/// ```
pub fn parse_mutex_group<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Vec<SasFact>> {
    section("begin_mutex_group", counted(parse_fact), "end_mutex_group")(input.into())
}

/// Parses the initial state, one value per variable. The number of values is
/// checked against the variables when building the task.
pub fn parse_initial_state<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Vec<usize>> {
    section("begin_state", many0(parse_usize), "end_state")(input.into())
}

/// Parses the goal, a counted list of facts.
pub fn parse_goal<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Vec<SasFact>> {
    section("begin_goal", counted(parse_fact), "end_goal")(input.into())
}
