//! Pure ordering operations over positioned sequences.
//!
//! Every function here takes its inputs by reference and returns new
//! vectors, so callers can hand in snapshots and decide afterwards
//! whether to commit the result.

use crate::error::{BoardwalkError, Result};
use std::fmt::Display;

/// An element carrying a dense zero-based rank within its parent
pub trait Positioned {
    fn position(&self) -> usize;
    fn set_position(&mut self, position: usize);
}

/// A positioned element that belongs to a parent collection
pub trait Nested: Positioned {
    /// Entity name used in error messages
    const KIND: &'static str;

    type Id: Copy + PartialEq + Display;
    type ParentId: Copy + PartialEq;

    fn id(&self) -> Self::Id;
    fn parent_id(&self) -> Self::ParentId;
    fn set_parent_id(&mut self, parent: Self::ParentId);
}

/// Moves the element at `from` to `to`, keeping the relative order of the rest.
///
/// `to` is clamped to the last index. An out-of-range `from` or `from == to`
/// returns the sequence unchanged.
pub fn reorder<T: Clone>(sequence: &[T], from: usize, to: usize) -> Vec<T> {
    let mut result = sequence.to_vec();
    if from >= result.len() {
        return result;
    }

    let to = to.min(result.len() - 1);
    if from == to {
        return result;
    }

    let element = result.remove(from);
    result.insert(to, element);
    result
}

/// Assigns `position = index` to every element in sequence order
pub fn renumber<T: Positioned>(mut sequence: Vec<T>) -> Vec<T> {
    for (index, element) in sequence.iter_mut().enumerate() {
        element.set_position(index);
    }
    sequence
}

/// True when positions are exactly `0..len` in sequence order
pub fn is_dense<T: Positioned>(sequence: &[T]) -> bool {
    sequence
        .iter()
        .enumerate()
        .all(|(index, element)| element.position() == index)
}

/// Removes `id` from `source` and inserts it into `dest` at `dest_index`
/// (clamped to `dest.len()`), re-parenting it to `dest_owner`.
///
/// Neither returned sequence is renumbered. Fails with `NotFound` when the
/// element is not in `source`; the inputs are borrowed and never modified.
pub fn move_across<T: Nested + Clone>(
    source: &[T],
    dest: &[T],
    id: T::Id,
    dest_owner: T::ParentId,
    dest_index: usize,
) -> Result<(Vec<T>, Vec<T>)> {
    let index = source
        .iter()
        .position(|element| element.id() == id)
        .ok_or_else(|| BoardwalkError::not_found(T::KIND, id))?;

    let mut new_source = source.to_vec();
    let mut moved = new_source.remove(index);
    moved.set_parent_id(dest_owner);

    let mut new_dest = dest.to_vec();
    let dest_index = dest_index.min(new_dest.len());
    new_dest.insert(dest_index, moved);

    Ok((new_source, new_dest))
}
