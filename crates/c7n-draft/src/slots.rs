//! Ordered slot sequences with a single trailing placeholder.
//!
//! Clause lists and policy lists share one shape: `Vec<Option<T>>` where
//! `None` is an open placeholder. After any transition the sequence is
//! non-empty, holds no interior `None`, and holds at most one trailing `None`.
//! Every function returns a fresh sequence.

use c7n_catalog::Labelled;

/// A fresh sequence holding one placeholder.
pub fn placeholder<T>() -> Vec<Option<T>> {
    vec![None]
}

/// False while the last slot is still an open placeholder.
pub fn can_add<T>(slots: &[Option<T>]) -> bool {
    !matches!(slots.last(), Some(None))
}

/// Append a placeholder unless one is already open.
pub fn add<T: Clone>(slots: &[Option<T>]) -> Vec<Option<T>> {
    let mut next = slots.to_vec();
    if can_add(slots) {
        next.push(None);
    }
    next
}

/// Replace the slot at `index`; `None` deletes it.
///
/// Out-of-range indices leave the sequence unchanged.
pub fn set_at<T: Clone>(slots: &[Option<T>], index: usize, item: Option<T>) -> Vec<Option<T>> {
    let Some(item) = item else {
        return delete_at(slots, index);
    };
    let mut next = slots.to_vec();
    if let Some(slot) = next.get_mut(index) {
        *slot = Some(item);
    }
    next
}

/// Delete the slot at `index`.
///
/// The slot is spliced out. A placeholder that was trailing stays trailing,
/// and a sequence left empty collapses to a single placeholder.
pub fn delete_at<T: Clone>(slots: &[Option<T>], index: usize) -> Vec<Option<T>> {
    if index >= slots.len() {
        return slots.to_vec();
    }
    let mut next = slots.to_vec();
    next.remove(index);
    normalize(next)
}

/// Drop interior placeholders, keeping one trailing placeholder if present.
pub fn normalize<T>(slots: Vec<Option<T>>) -> Vec<Option<T>> {
    let trailing = matches!(slots.last(), Some(None));
    let mut next: Vec<Option<T>> = slots.into_iter().filter(Option::is_some).collect();
    if trailing || next.is_empty() {
        next.push(None);
    }
    next
}

/// An option shown to the user, possibly greyed out.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice<T> {
    pub option: T,
    /// False when a sibling slot already holds an option with this label.
    pub selectable: bool,
}

/// Mark every option whose label is in `chosen` as non-selectable.
///
/// Nothing is hidden; the list keeps its order and length.
pub fn mark_chosen<T: Labelled + Clone>(options: &[T], chosen: &[&str]) -> Vec<Choice<T>> {
    options
        .iter()
        .map(|option| Choice {
            selectable: !chosen.contains(&option.label()),
            option: option.clone(),
        })
        .collect()
}
