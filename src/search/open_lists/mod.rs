//! Open lists of the search engines. Entries are ordered by keys that
//! [`KeyEvaluator`]s compute from the g-value and heuristic values of an
//! [`EvaluationContext`].

mod alternation_open_list;
mod bucket_open_list;
mod open_list;
mod tie_breaking_open_list;

pub use alternation_open_list::{AlternationOpenList, DEFAULT_BOOST};
pub use bucket_open_list::BucketOpenList;
pub use open_list::{EvaluationContext, KeyEvaluator, OpenList};
pub use tie_breaking_open_list::TieBreakingOpenList;
