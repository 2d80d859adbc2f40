//! Display-order arithmetic for drag-and-drop reordering of menu sections
//! and items. Pure functions over in-memory lists.

/// Move the element at `from` so that it ends up at index `to`, shifting the
/// elements in between by one. `to` past the end means "last".
pub fn move_to<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), errors::OrderingError> {
    if from >= items.len() {
        return Err(errors::OrderingError::IndexOutOfRange {
            index: from,
            len: items.len(),
        });
    }
    let element = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, element);
    Ok(())
}

/// Pair each element with its contiguous display order, starting at 1.
pub fn assign_display_orders<T>(items: impl IntoIterator<Item = T>) -> Vec<(T, i64)> {
    items.into_iter().zip(1_i64..).collect()
}

/// Find the index of the element whose key equals `target`.
pub fn position_of<T, K, F>(items: &[T], target: &K, key: F) -> Option<usize>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    items.iter().position(|item| key(item) == *target)
}

pub mod errors {
    use thiserror::Error;

    #[derive(Error, Debug, PartialEq, Eq)]
    pub enum OrderingError {
        #[error("Index {index} out of range for list of length {len}")]
        IndexOutOfRange { index: usize, len: usize },
    }
}
