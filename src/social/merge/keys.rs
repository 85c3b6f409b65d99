use std::ops::Range;

/// Entity kinds that receive surrogate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Post,
    Comment,
}

/// Issues run-wide surrogate keys for posts and comments.
///
/// Each kind has its own counter starting at 1. Values handed out for a kind
/// are strictly increasing without gaps or repeats for the lifetime of the
/// allocator, which is the lifetime of one merge run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAllocator {
    next_post: u64,
    next_comment: u64,
}

impl Default for KeyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self {
            next_post: 1,
            next_comment: 1,
        }
    }

    /// Returns the current counter value for `kind` and advances it.
    pub fn allocate(&mut self, kind: KeyKind) -> u64 {
        let counter = self.counter_mut(kind);
        let value = *counter;
        *counter += 1;
        value
    }

    /// Reserves `count` contiguous keys for `kind`.
    pub fn allocate_block(&mut self, kind: KeyKind, count: usize) -> Range<u64> {
        let counter = self.counter_mut(kind);
        let start = *counter;
        *counter += count as u64;
        start..*counter
    }

    /// Value the next call to [`KeyAllocator::allocate`] would return.
    pub fn peek(&self, kind: KeyKind) -> u64 {
        match kind {
            KeyKind::Post => self.next_post,
            KeyKind::Comment => self.next_comment,
        }
    }

    /// Number of keys issued so far for `kind`.
    pub fn issued(&self, kind: KeyKind) -> u64 {
        self.peek(kind) - 1
    }

    fn counter_mut(&mut self, kind: KeyKind) -> &mut u64 {
        match kind {
            KeyKind::Post => &mut self.next_post,
            KeyKind::Comment => &mut self.next_comment,
        }
    }
}
