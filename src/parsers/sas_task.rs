//! Provides a parser for complete SAS files.

use crate::parsed_types::SasTask;
use crate::parsers::{
    counted, parse_goal, parse_initial_state, parse_metric, parse_mutex_group, parse_operator,
    parse_usize, parse_variable, parse_version, ParseResult, Span,
};
use nom::character::complete::multispace0;
use nom::combinator::map;
use nom::sequence::{terminated, tuple};

/// Parses a SAS file up to and including the axiom count. Axiom blocks are
/// left in the remaining input, the task model rejects them.
///
/// ## Example
/// ```
/// # use sasplan::parsers::{parse_sas_task, preamble::*};
/// let input = "begin_version
/// 3
/// end_version
/// begin_metric
/// 0
/// end_metric
/// 1
/// begin_variable
/// var0
/// -1
/// 2
/// Atom at(a)
/// Atom at(b)
/// end_variable
/// 0
/// begin_state
/// 0
/// end_state
/// begin_goal
/// 1
/// 0 1
/// end_goal
/// 1
/// begin_operator
/// move a b
/// 0
/// 1
/// 0 0 0 1
/// 1
/// end_operator
/// 0
/// ";
/// let (remainder, task) = parse_sas_task(input).unwrap();
/// assert!(remainder.is_empty());
/// assert_eq!(task.version(), 3);
/// assert!(!task.use_metric());
/// assert_eq!(task.variables().len(), 1);
/// assert_eq!(task.initial_state(), &vec![0]);
/// assert_eq!(task.operators()[0].name(), "move a b");
/// assert_eq!(task.num_axioms(), 0);
/// ```
pub fn parse_sas_task<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, SasTask> {
    map(
        terminated(
            tuple((
                parse_version,
                parse_metric,
                counted(parse_variable),
                counted(parse_mutex_group),
                parse_initial_state,
                parse_goal,
                counted(parse_operator),
                parse_usize,
            )),
            multispace0,
        ),
        |(version, use_metric, variables, mutex_groups, initial_state, goal, operators, num_axioms)| {
            SasTask::new(
                version,
                use_metric,
                variables,
                mutex_groups,
                initial_state,
                goal,
                operators,
                num_axioms,
            )
        },
    )(input.into())
}

impl crate::parsers::Parser for SasTask {
    type Item = SasTask;

    /// See [`parse_sas_task`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_sas_task(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::Parser;
    use crate::test_utils::*;

    #[test]
    fn parses_blocks_task() {
        let task = SasTask::from_str(BLOCKS_SAS_TEXT).unwrap();
        assert_eq!(task.variables().len(), 3);
        assert_eq!(task.operators().len(), 2);
        assert_eq!(task.goal().len(), 1);
        assert!(task.mutex_groups().is_empty());
    }

    #[test]
    fn parses_mutex_groups_and_conditional_effects() {
        let task = SasTask::from_str(SWITCH_SAS_TEXT).unwrap();
        assert_eq!(task.mutex_groups().len(), 1);
        assert!(task
            .operators()
            .iter()
            .any(|op| op.effects().iter().any(|eff| !eff.conditions().is_empty())));
    }

    #[test]
    fn truncated_file_fails() {
        let truncated = &BLOCKS_SAS_TEXT[..BLOCKS_SAS_TEXT.len() / 2];
        assert!(SasTask::from_str(truncated).is_err());
    }
}
