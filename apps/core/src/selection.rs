#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Keyboard selection that survives incremental typing.
///
/// Invariant: `index < len` of the current result set, or `0` when it is
/// empty. Every transition takes the new length so it can re-establish it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    index: usize,
    previous_query: Option<String>,
}

impl Selection {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn previous_query(&self) -> Option<&str> {
        self.previous_query.as_deref()
    }

    /// Applies a wholesale result set replacement answering `query`.
    pub fn on_replaced(&mut self, query: &str, new_len: usize) -> usize {
        self.index = index_after_replace(self.previous_query.as_deref(), query, self.index, new_len);
        self.previous_query = Some(query.to_string());
        self.index
    }

    pub fn navigate(&mut self, direction: Direction, len: usize) -> usize {
        self.index = next_index(self.index, len, direction);
        self.index
    }

    /// Back to the initial state, forgetting the continuation anchor.
    pub fn reset(&mut self) {
        self.index = 0;
        self.previous_query = None;
    }

    /// Empties the selection while keeping the anchor, e.g. when a search
    /// fails and the result set is cleared.
    pub fn clear_results(&mut self) {
        self.index = 0;
    }
}

pub fn is_continuation(previous: &str, next: &str) -> bool {
    next.len() >= previous.len() && next.starts_with(previous)
}

pub fn index_after_replace(
    previous_query: Option<&str>,
    new_query: &str,
    held: usize,
    new_len: usize,
) -> usize {
    let continues = previous_query
        .map(|previous| is_continuation(previous, new_query))
        .unwrap_or(false);
    if !continues || held >= new_len {
        return 0;
    }
    held
}

pub fn next_index(current: usize, len: usize, direction: Direction) -> usize {
    if len == 0 {
        return 0;
    }

    let current = current.min(len - 1);
    match direction {
        Direction::Down => {
            if current + 1 >= len {
                0
            } else {
                current + 1
            }
        }
        Direction::Up => {
            if current == 0 {
                len - 1
            } else {
                current - 1
            }
        }
    }
}
