//! The page location as an explicit shared resource.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use url::Url;

/// Host-owned location storage.
///
/// `replace` rewrites the current entry in place and never adds history.
pub trait History {
    fn location(&self) -> Url;
    fn replace(&self, url: Url);
}

/// In-process history stack, shared between clones.
///
/// `navigate`, `back` and `forward` play the part of the user moving around;
/// only `replace` is used by the query-state engine.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    inner: Arc<Mutex<Stack>>,
}

#[derive(Debug)]
struct Stack {
    entries: Vec<Url>,
    index: usize,
    replacements: usize,
}

impl MemoryHistory {
    pub fn new(start: Url) -> Self {
        Self { inner: Arc::new(Mutex::new(Stack { entries: vec![start], index: 0, replacements: 0 })) }
    }

    fn stack(&self) -> MutexGuard<'_, Stack> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a new entry, discarding any forward entries.
    pub fn navigate(&self, url: Url) {
        let mut stack = self.stack();
        let next = stack.index + 1;
        stack.entries.truncate(next);
        stack.entries.push(url);
        stack.index = next;
    }

    /// Step back one entry. Returns false at the start of history.
    pub fn back(&self) -> bool {
        let mut stack = self.stack();
        if stack.index == 0 {
            return false;
        }
        stack.index -= 1;
        true
    }

    /// Step forward one entry. Returns false at the end of history.
    pub fn forward(&self) -> bool {
        let mut stack = self.stack();
        if stack.index + 1 >= stack.entries.len() {
            return false;
        }
        stack.index += 1;
        true
    }

    /// Number of entries in the stack.
    pub fn depth(&self) -> usize {
        self.stack().entries.len()
    }

    /// Number of in-place replacements so far.
    pub fn replacements(&self) -> usize {
        self.stack().replacements
    }
}

impl History for MemoryHistory {
    fn location(&self) -> Url {
        let stack = self.stack();
        stack.entries[stack.index].clone()
    }

    fn replace(&self, url: Url) {
        let mut stack = self.stack();
        let index = stack.index;
        stack.entries[index] = url;
        stack.replacements += 1;
    }
}
