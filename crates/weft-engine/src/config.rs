/// Parser tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseConfig {
    /// Text before the position visible to lookbehind and `\b` (default: 64).
    pub(crate) margin_before: usize,
    /// Text after the position a single match may span (default: 1,024).
    pub(crate) margin_after: usize,
    /// Tokens per chunk before a match boundary starts a new one (default: 64).
    pub(crate) chunk_capacity: usize,
    /// Close unterminated regions with an `INCOMPLETE` marker (default: true).
    pub(crate) close_incomplete: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            margin_before: 64,
            margin_after: 1024,
            chunk_capacity: 64,
            close_incomplete: true,
        }
    }
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn margin_before(mut self, margin: usize) -> Self {
        self.margin_before = margin;
        self
    }

    pub fn margin_after(mut self, margin: usize) -> Self {
        self.margin_after = margin.max(1);
        self
    }

    pub fn chunk_capacity(mut self, capacity: usize) -> Self {
        self.chunk_capacity = capacity.max(1);
        self
    }

    pub fn close_incomplete(mut self, close: bool) -> Self {
        self.close_incomplete = close;
        self
    }

    pub fn get_margin_before(&self) -> usize {
        self.margin_before
    }
    pub fn get_margin_after(&self) -> usize {
        self.margin_after
    }
    pub fn get_chunk_capacity(&self) -> usize {
        self.chunk_capacity
    }
    pub fn get_close_incomplete(&self) -> bool {
        self.close_incomplete
    }
}
