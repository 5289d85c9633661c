//! Parsers for the SAS text format written by the Fast Downward translator.
//! Only the syntax is checked here, see
//! [`Task::from_text`](crate::search::Task::from_text) for validation.

mod sas_effect;
mod sas_fact;
mod sas_operator;
mod sas_task;
mod sas_variable;
mod sections;
mod test_helpers;
mod utilities;

#[cfg(test)]
pub(crate) use test_helpers::Match;
pub use test_helpers::UnwrapValue;

pub trait Parser {
    type Item;

    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item>;

    fn parse_span(input: Span) -> ParseResult<Self::Item> {
        Self::parse(input)
    }

    /// Parse a string slice into the desired type. Discards any remaining
    /// input.
    fn from_str(input: &str) -> Result<Self::Item, nom::Err<ParseError>> {
        let (_, value) = Self::parse(input)?;
        Ok(value)
    }
}

pub type Span<'a> = nom_locate::LocatedSpan<&'a str>;

pub type ParseError<'a> = nom_greedyerror::GreedyError<Span<'a>, nom::error::ErrorKind>;

pub type ParseResult<'a, T, E = ParseError<'a>> = nom::IResult<Span<'a>, T, E>;

/// Re-exports commonly used types.
pub mod preamble {
    pub use crate::parsers::test_helpers::UnwrapValue;
    pub use crate::parsers::Parser;
    pub use crate::parsers::{ParseError, ParseResult, Span};
}

// Parsers
pub use sas_effect::parse_effect;
pub use sas_fact::parse_fact;
pub use sas_operator::parse_operator;
pub use sas_task::parse_sas_task;
pub use sas_variable::parse_variable;
pub use sections::{
    parse_goal, parse_initial_state, parse_metric, parse_mutex_group, parse_version,
};

pub(crate) use utilities::{counted, describe_error, parse_int, parse_line, parse_usize, section};
