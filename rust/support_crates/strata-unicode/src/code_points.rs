//! Code point walking over byte slices that are expected, but not guaranteed,
//! to hold UTF-8.
//!
//! Malformed input never panics: a byte that is not a valid lead byte counts as a
//! one-byte code point, and a code point whose tail is cut off by the end of the
//! slice ends at the slice end.

/// Width in bytes of the code point starting with `first_byte`.
#[inline]
fn utf8_char_width_relaxed(first_byte: u8) -> usize {
    if first_byte < 128 {
        1
    } else if (first_byte & 0xe0) == 0xc0 {
        2
    } else if (first_byte & 0xf0) == 0xe0 {
        3
    } else if (first_byte & 0xf8) == 0xf0 {
        4
    } else {
        1
    }
}

/// Iterator over the starting byte positions of the code points in a slice.
#[derive(Clone)]
pub struct CodePointPositions<'a> {
    pos: usize,
    s: &'a [u8],
}

impl Iterator for CodePointPositions<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let pos = self.pos;
        let first_byte = *self.s.get(pos)?;
        self.pos = std::cmp::min(pos + utf8_char_width_relaxed(first_byte), self.s.len());
        Some(pos)
    }
}

pub trait CodePointUtils {
    fn code_point_positions(&self) -> CodePointPositions<'_>;

    /// Counts the code points in the slice.
    fn code_point_count(&self) -> usize;

    /// Returns the number of bytes taken by the first `max_code_points` code points,
    /// or the full length when the slice holds fewer code points.
    fn code_point_prefix_len(&self, max_code_points: usize) -> usize;

    /// Returns the length of the slice with all trailing ASCII spaces (`0x20`) removed.
    fn len_without_trailing_spaces(&self) -> usize;
}

impl CodePointUtils for [u8] {
    fn code_point_positions(&self) -> CodePointPositions<'_> {
        CodePointPositions { pos: 0, s: self }
    }

    fn code_point_count(&self) -> usize {
        self.code_point_positions().count()
    }

    #[inline]
    fn code_point_prefix_len(&self, max_code_points: usize) -> usize {
        // Every code point takes at least one byte.
        if max_code_points >= self.len() {
            return self.len();
        }
        self.code_point_positions()
            .nth(max_code_points)
            .unwrap_or(self.len())
    }

    #[inline]
    fn len_without_trailing_spaces(&self) -> usize {
        self.iter()
            .rposition(|&b| b != b' ')
            .map_or(0, |last| last + 1)
    }
}

impl CodePointUtils for str {
    fn code_point_positions(&self) -> CodePointPositions<'_> {
        self.as_bytes().code_point_positions()
    }

    fn code_point_count(&self) -> usize {
        self.chars().count()
    }

    fn code_point_prefix_len(&self, max_code_points: usize) -> usize {
        self.as_bytes().code_point_prefix_len(max_code_points)
    }

    fn len_without_trailing_spaces(&self) -> usize {
        self.as_bytes().len_without_trailing_spaces()
    }
}
