//! Document access and matching windows.

use std::borrow::Cow;
use std::ops::Range;

/// Read access to a document. Positions are byte offsets.
pub trait Input {
    fn len(&self) -> usize;

    /// Text in `[from, to)`. Both ends are clamped to the document and moved
    /// back to the nearest char boundary.
    fn read(&self, from: usize, to: usize) -> Cow<'_, str>;

    /// Largest char boundary not after `pos`.
    fn floor_boundary(&self, pos: usize) -> usize {
        pos.min(self.len())
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Input for str {
    fn len(&self) -> usize {
        str::len(self)
    }

    fn read(&self, from: usize, to: usize) -> Cow<'_, str> {
        let from = Input::floor_boundary(self, from);
        let to = Input::floor_boundary(self, to).max(from);
        Cow::Borrowed(&self[from..to])
    }

    fn floor_boundary(&self, pos: usize) -> usize {
        let mut pos = pos.min(str::len(self));
        while !self.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }
}

impl Input for String {
    fn len(&self) -> usize {
        self.as_str().len()
    }

    fn read(&self, from: usize, to: usize) -> Cow<'_, str> {
        Input::read(self.as_str(), from, to)
    }

    fn floor_boundary(&self, pos: usize) -> usize {
        Input::floor_boundary(self.as_str(), pos)
    }
}

impl<T: Input + ?Sized> Input for &T {
    fn len(&self) -> usize {
        T::len(*self)
    }

    fn read(&self, from: usize, to: usize) -> Cow<'_, str> {
        T::read(*self, from, to)
    }

    fn floor_boundary(&self, pos: usize) -> usize {
        T::floor_boundary(*self, pos)
    }
}

/// Ordered, disjoint document ranges parsed as one logical text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    ranges: Vec<Range<usize>>,
}

impl Region {
    /// Sorts the ranges, drops empty ones and merges overlapping ones.
    pub fn new(mut ranges: Vec<Range<usize>>) -> Self {
        ranges.retain(|r| r.start < r.end);
        ranges.sort_by_key(|r| r.start);

        let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
                _ => merged.push(range),
            }
        }
        Self { ranges: merged }
    }

    pub fn whole(len: usize) -> Self {
        Self::new(vec![0..len])
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn start(&self) -> usize {
        self.ranges.first().map_or(0, |r| r.start)
    }

    pub fn end(&self) -> usize {
        self.ranges.last().map_or(0, |r| r.end)
    }

    /// Moves a position that sits in a gap or on a range end to the start of
    /// the next range.
    pub fn clamp(&self, pos: usize) -> usize {
        for range in &self.ranges {
            if pos < range.end {
                return pos.max(range.start);
            }
        }
        self.end()
    }

    /// Reads `[pos - before, pos + after)` restricted to the region.
    pub fn window<I: Input + ?Sized>(
        &self,
        input: &I,
        pos: usize,
        before: usize,
        after: usize,
    ) -> Window {
        let lo = pos.saturating_sub(before);
        let hi = pos.saturating_add(after);
        let mut window = Window::default();

        for range in &self.ranges {
            let from = input.floor_boundary(range.start.max(lo));
            let to = input.floor_boundary(range.end.min(hi));
            if from >= to {
                continue;
            }
            let text = input.read(from, to);
            window.pieces.push(Piece {
                window: window.text.len(),
                document: from,
                len: text.len(),
            });
            window.text.push_str(&text);
        }
        window
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Piece {
    window: usize,
    document: usize,
    len: usize,
}

/// Text handed to the grammar plus the mapping back to document positions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Window {
    text: String,
    pieces: Vec<Piece>,
}

impl Window {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Window position of a document position, or the window end if the
    /// position is outside every piece.
    pub fn position(&self, document: usize) -> usize {
        self.pieces
            .iter()
            .find(|p| p.document <= document && document < p.document + p.len)
            .map_or(self.text.len(), |p| p.window + (document - p.document))
    }

    /// Document position of a token start. A piece end maps to the start of
    /// the next piece.
    pub fn document_start(&self, window: usize) -> usize {
        for piece in &self.pieces {
            if window < piece.window + piece.len {
                return piece.document + window.saturating_sub(piece.window);
            }
        }
        self.pieces.last().map_or(window, |p| p.document + p.len)
    }

    /// Document position of a token end. A piece end stays in its piece.
    pub fn document_end(&self, window: usize) -> usize {
        for piece in &self.pieces {
            if window <= piece.window + piece.len {
                return piece.document + window.saturating_sub(piece.window);
            }
        }
        self.pieces.last().map_or(window, |p| p.document + p.len)
    }
}
