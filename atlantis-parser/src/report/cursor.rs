//! Bounded look-back cursor
//!
//!     Section handlers walk the block stream with a cursor that remembers the last `H`
//!     blocks it produced. `advance` either replays an already buffered block or pulls a new
//!     one from the source, evicting the oldest when the window is full. `back` steps to the
//!     previous buffered block. This gives handlers a cheap way to peek at the next block and
//!     undo the peek when it belongs to somebody else.
//!
//!     At most `H - 1` consecutive `advance` calls can be undone. Going back past the window
//!     fails and leaves the head where it was.
//!
//!     The source is fallible so that read errors and cancellation surface as soon as the
//!     handler asks for the block that triggered them.

use std::collections::VecDeque;

/// Smallest useful window: the current block, one to step back to and one peeked ahead.
pub const MIN_HISTORY: usize = 3;

/// Forward and backward iterator over a fallible item source.
pub struct Cursor<T, E, I>
where
    I: Iterator<Item = Result<T, E>>,
{
    source: I,
    history: VecDeque<T>,
    capacity: usize,
    head: Option<usize>,
    exhausted: bool,
}

impl<T, E, I> Cursor<T, E, I>
where
    I: Iterator<Item = Result<T, E>>,
{
    /// Create a cursor keeping up to `capacity` items (never fewer than [MIN_HISTORY]).
    pub fn new(source: I, capacity: usize) -> Self {
        let capacity = capacity.max(MIN_HISTORY);
        Self {
            source,
            history: VecDeque::with_capacity(capacity),
            capacity,
            head: None,
            exhausted: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Move to the next item. Returns `Ok(false)` once the source is exhausted, in which
    /// case the head does not move.
    pub fn advance(&mut self) -> Result<bool, E> {
        if self.next_index() >= self.history.len() && !self.pull()? {
            return Ok(false);
        }
        self.head = Some(self.next_index());
        Ok(true)
    }

    /// Step back to the previous buffered item. Returns false, without moving, when no
    /// earlier item is retained.
    pub fn back(&mut self) -> bool {
        match self.head {
            Some(head) if head > 0 => {
                self.head = Some(head - 1);
                true
            }
            _ => false,
        }
    }

    /// The item under the head, if `advance` has succeeded at least once.
    pub fn current(&self) -> Option<&T> {
        self.head.and_then(|head| self.history.get(head))
    }

    /// Look at the item after the head without moving.
    pub fn peek(&mut self) -> Result<Option<&T>, E> {
        if self.next_index() >= self.history.len() && !self.pull()? {
            return Ok(None);
        }
        Ok(self.history.get(self.next_index()))
    }

    fn next_index(&self) -> usize {
        self.head.map_or(0, |head| head + 1)
    }

    /// Buffer one more item from the source without moving the head.
    fn pull(&mut self) -> Result<bool, E> {
        if self.exhausted {
            return Ok(false);
        }
        match self.source.next() {
            Some(Ok(item)) => {
                self.history.push_back(item);
                if self.history.len() > self.capacity {
                    self.history.pop_front();
                    if let Some(head) = self.head.as_mut() {
                        *head = head.saturating_sub(1);
                    }
                }
                Ok(true)
            }
            Some(Err(err)) => Err(err),
            None => {
                self.exhausted = true;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn cursor(
        items: Vec<u32>,
        capacity: usize,
    ) -> Cursor<u32, Infallible, impl Iterator<Item = Result<u32, Infallible>>> {
        Cursor::new(items.into_iter().map(Ok), capacity)
    }

    #[test]
    fn test_advance_and_back() {
        let mut c = cursor(vec![1, 2, 3], 4);
        assert_eq!(c.current(), None);
        assert!(c.advance().unwrap());
        assert!(c.advance().unwrap());
        assert_eq!(c.current(), Some(&2));
        assert!(c.back());
        assert_eq!(c.current(), Some(&1));
        assert!(!c.back());
        assert_eq!(c.current(), Some(&1));
        assert!(c.advance().unwrap());
        assert!(c.advance().unwrap());
        assert_eq!(c.current(), Some(&3));
        assert!(!c.advance().unwrap());
        assert_eq!(c.current(), Some(&3));
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut c = cursor(vec![1, 2, 3, 4, 5], 3);
        for _ in 0..5 {
            c.advance().unwrap();
        }
        assert!(c.back());
        assert!(c.back());
        assert_eq!(c.current(), Some(&3));
        assert!(!c.back());
        assert_eq!(c.current(), Some(&3));
    }

    #[test]
    fn test_peek_does_not_move() {
        let mut c = cursor(vec![1, 2], 3);
        c.advance().unwrap();
        assert_eq!(c.peek().unwrap(), Some(&2));
        assert_eq!(c.current(), Some(&1));
        c.advance().unwrap();
        assert_eq!(c.peek().unwrap(), None);
        assert_eq!(c.current(), Some(&2));
    }

    #[test]
    fn test_peek_before_first_advance() {
        let mut c = cursor(vec![7], 3);
        assert_eq!(c.peek().unwrap(), Some(&7));
        assert_eq!(c.current(), None);
        assert!(c.advance().unwrap());
        assert_eq!(c.current(), Some(&7));
    }

    #[test]
    fn test_peek_then_back_within_minimum_window() {
        let mut c = cursor(vec![1, 2, 3], 0);
        c.advance().unwrap();
        c.advance().unwrap();
        assert_eq!(c.peek().unwrap(), Some(&3));
        assert!(c.back());
        assert_eq!(c.current(), Some(&1));
    }

    #[test]
    fn test_capacity_has_a_floor() {
        let c = cursor(vec![], 0);
        assert_eq!(c.capacity(), MIN_HISTORY);
    }

    #[test]
    fn test_source_errors_surface() {
        let items: Vec<Result<u32, &str>> = vec![Ok(1), Err("cancelled")];
        let mut c = Cursor::new(items.into_iter(), 4);
        assert_eq!(c.advance(), Ok(true));
        assert_eq!(c.advance(), Err("cancelled"));
        assert_eq!(c.current(), Some(&1));
    }
}
