//! Capped list insertion.
//!
//! All bounded lists are most-recent-first: new items go to the front and the
//! excess is cut from the tail.

use std::collections::VecDeque;

/// Insert `item` first, removing an existing equal entry, then truncate.
pub fn push_front_capped<T: PartialEq>(list: &mut Vec<T>, item: T, cap: usize) {
    if let Some(pos) = list.iter().position(|existing| *existing == item) {
        list.remove(pos);
    }
    list.insert(0, item);
    list.truncate(cap);
}

/// Append `item` at the tail (older history) if there is room and it is new.
///
/// Returns `true` when the item was added.
pub fn push_back_capped<T: PartialEq>(list: &mut Vec<T>, item: T, cap: usize) -> bool {
    if list.len() >= cap || list.contains(&item) {
        return false;
    }
    list.push(item);
    true
}

/// `VecDeque` variant of [`push_front_capped`] without de-duplication.
pub(crate) fn push_front_deque<T>(list: &mut VecDeque<T>, item: T, cap: usize) {
    list.push_front(item);
    list.truncate(cap);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_front_truncates_tail() {
        let mut list = vec![2, 1];
        push_front_capped(&mut list, 3, 2);
        assert_eq!(list, vec![3, 2]);
    }

    #[test]
    fn test_push_front_moves_duplicate() {
        let mut list = vec![3, 2, 1];
        push_front_capped(&mut list, 1, 5);
        assert_eq!(list, vec![1, 3, 2]);
    }

    #[test]
    fn test_push_back_respects_cap() {
        let mut list = vec![1];
        assert!(push_back_capped(&mut list, 0, 2));
        assert!(!push_back_capped(&mut list, -1, 2));
        assert_eq!(list, vec![1, 0]);
    }

    #[test]
    fn test_zero_cap_keeps_nothing() {
        let mut list: Vec<u8> = Vec::new();
        push_front_capped(&mut list, 1, 0);
        assert!(list.is_empty());
    }

    #[test]
    fn test_deque_variant() {
        let mut list = VecDeque::from(vec![2, 1]);
        push_front_deque(&mut list, 3, 2);
        assert_eq!(list, VecDeque::from(vec![3, 2]));
    }
}
