//! Scanline span extraction.
//!
//! A span is a maximal run of "on" pixels in one row, stored as a half-open
//! `start..end` pixel interval.

use crate::pixel_field::PixelField;

/// Half-open pixel interval on one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// Extract the spans of one row in a single pass.
///
/// A pixel is on when `on_range.0 <= p <= on_range.1`. Spans come out sorted
/// and separated by at least one off pixel.
pub fn extract_row(row: &[u16], on_range: (u16, u16)) -> Vec<Span> {
    let (min, max) = on_range;
    let mut spans = Vec::new();
    let mut run_start: Option<u32> = None;

    for (x, &p) in row.iter().enumerate() {
        let on = min <= p && p <= max;
        match (run_start, on) {
            (None, true) => run_start = Some(x as u32),
            (Some(start), false) => {
                spans.push(Span::new(start, x as u32));
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        spans.push(Span::new(start, row.len() as u32));
    }

    spans
}

/// Extract spans for every row, indexed bottom-up.
///
/// Entry 0 is the bottom image row. This is the only place the image's
/// top-down row order is inverted.
pub fn build_spans(field: &PixelField, on_range: (u16, u16)) -> Vec<Vec<Span>> {
    field
        .rows_bottom_up()
        .map(|row| extract_row(row, on_range))
        .collect()
}
