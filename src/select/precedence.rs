//! Precedence resolution over ordered priority lists.

use crate::catalog::names::NameSet;

/// Return the highest-priority entry of `order` that is present in `held`.
///
/// `order` runs from lowest to highest priority, so the result is the last entry of `order`
/// whose key is held. Used for rank resolution and for every badge tier.
pub fn highest_in<'a, T, F>(order: &'a [T], key: F, held: &NameSet) -> Option<&'a T>
where
    F: Fn(&T) -> &str,
{
    order.iter().rev().find(|entry| held.contains(key(entry)))
}

/// [`highest_in`] specialised to plain name lists.
pub fn highest_name_in<'a>(order: &'a [String], held: &NameSet) -> Option<&'a str> {
    highest_in(order, |s| s.as_str(), held).map(String::as_str)
}

#[cfg(test)]
#[path = "../../tests/unit/select/precedence.rs"]
mod tests;
