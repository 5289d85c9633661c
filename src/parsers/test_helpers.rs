//! Assertion helpers for parser results.

use crate::parsers::ParseResult;

/// Checks the value of a successful parse, ignoring the remaining input.
pub trait UnwrapValue<T> {
    fn is_value(&self, value: T) -> bool;
}

impl<T: PartialEq> UnwrapValue<T> for ParseResult<'_, T> {
    fn is_value(&self, value: T) -> bool {
        match self {
            Ok((_, parsed)) => *parsed == value,
            Err(_) => false,
        }
    }
}

/// Checks the value of a successful parse that consumed the whole input.
#[cfg(test)]
pub trait Match<T> {
    fn is_exactly(&self, value: T) -> bool;
}

#[cfg(test)]
impl<T: PartialEq> Match<T> for ParseResult<'_, T> {
    fn is_exactly(&self, value: T) -> bool {
        match self {
            Ok((remainder, parsed)) => remainder.fragment().is_empty() && *parsed == value,
            Err(_) => false,
        }
    }
}
