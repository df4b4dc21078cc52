//! Position tracking inside a [`Lines`](crate::Lines) buffer.

/// Index of a logical line.
///
/// Cursors are `Copy`: taking a snapshot before a speculative decode and
/// restoring it afterwards is just an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cursor {
    index: usize,
}

impl Cursor {
    /// Cursor on the first line.
    #[inline]
    pub fn start() -> Self {
        Self { index: 0 }
    }

    /// Cursor on the given 0-based line index.
    #[inline]
    pub fn at(index: usize) -> Self {
        Self { index }
    }

    /// 0-based line index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based line number, for messages.
    #[inline]
    pub fn line_number(&self) -> usize {
        self.index + 1
    }

    /// Move to the next line.
    #[inline]
    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// The cursor one line further down.
    #[inline]
    pub fn next(self) -> Self {
        Self {
            index: self.index + 1,
        }
    }
}

impl From<usize> for Cursor {
    fn from(index: usize) -> Self {
        Self::at(index)
    }
}
