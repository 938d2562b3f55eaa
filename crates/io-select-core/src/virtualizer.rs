//! Virtualizer
//!
//! Fixed-row-height windowing: which rows must exist in the DOM for a given
//! scroll position, and how tall the scroll spacer has to be.

use crate::models::ScrollMetrics;

/// "Near the bottom" means at most this many rows left to scroll
pub const PAGINATION_THRESHOLD_ROWS: f64 = 1.5;

/// Materialized row range `[start_index, end_index)` plus spacer geometry
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VirtualWindow {
    pub start_index: usize,
    pub end_index: usize,
    /// Height of the full list, sizes the scroll spacer
    pub total_extent: f64,
    /// Pixel offset of the first materialized row
    pub offset_top: f64,
}

impl VirtualWindow {
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Virtualizer {
    row_height: f64,
    buffer_rows: usize,
}

impl Virtualizer {
    pub fn new(row_height: f64, buffer_rows: usize) -> Self {
        Self {
            row_height: if row_height.is_finite() && row_height > 0.0 { row_height } else { 1.0 },
            buffer_rows,
        }
    }

    pub fn compute_window(&self, scroll_offset: f64, viewport_height: f64, candidate_count: usize) -> VirtualWindow {
        let scroll_offset = scroll_offset.max(0.0);
        let viewport_height = viewport_height.max(0.0);

        let first_visible = (scroll_offset / self.row_height).floor() as usize;
        let last_visible = ((scroll_offset + viewport_height) / self.row_height).ceil() as usize;

        let end_index = last_visible.saturating_add(self.buffer_rows).min(candidate_count);
        let start_index = first_visible.saturating_sub(self.buffer_rows).min(end_index);

        VirtualWindow {
            start_index,
            end_index,
            total_extent: candidate_count as f64 * self.row_height,
            offset_top: start_index as f64 * self.row_height,
        }
    }
}

/// Remaining scroll distance is within the pagination threshold
pub fn is_near_bottom(metrics: &ScrollMetrics, row_height: f64) -> bool {
    metrics.remaining() <= PAGINATION_THRESHOLD_ROWS * row_height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_example() {
        let v = Virtualizer::new(36.0, 5);
        let w = v.compute_window(360.0, 180.0, 100);
        assert_eq!(w.start_index, 5);
        assert_eq!(w.end_index, 20);
        assert_eq!(w.total_extent, 3600.0);
        assert_eq!(w.offset_top, 180.0);
    }

    #[test]
    fn test_window_clamps_at_edges() {
        let v = Virtualizer::new(36.0, 5);
        let top = v.compute_window(0.0, 180.0, 100);
        assert_eq!((top.start_index, top.end_index), (0, 10));

        let bottom = v.compute_window(3420.0, 180.0, 100);
        assert_eq!((bottom.start_index, bottom.end_index), (90, 100));

        let short = v.compute_window(0.0, 180.0, 3);
        assert_eq!((short.start_index, short.end_index), (0, 3));

        let empty = v.compute_window(500.0, 180.0, 0);
        assert_eq!((empty.start_index, empty.end_index), (0, 0));
        assert_eq!(empty.total_extent, 0.0);
    }

    #[test]
    fn test_window_covers_every_visible_row() {
        let v = Virtualizer::new(24.0, 2);
        let count = 57;
        let viewport = 100.0;
        let extent = count as f64 * 24.0;
        let mut offset = 0.0;
        while offset <= extent {
            let w = v.compute_window(offset, viewport, count);
            assert!(w.start_index <= w.end_index && w.end_index <= count);
            for row in 0..count {
                let top = row as f64 * 24.0;
                let bottom = top + 24.0;
                if bottom > offset && top < offset + viewport {
                    assert!(w.contains(row), "row {row} missing at offset {offset}: {w:?}");
                }
            }
            offset += 7.0;
        }
    }

    #[test]
    fn test_near_bottom_threshold() {
        let mut metrics = ScrollMetrics { scroll_top: 0.0, client_height: 180.0, scroll_height: 3600.0 };
        assert!(!is_near_bottom(&metrics, 36.0));
        metrics.scroll_top = 3600.0 - 180.0 - 54.0;
        assert!(is_near_bottom(&metrics, 36.0));
        metrics.scroll_top -= 1.0;
        assert!(!is_near_bottom(&metrics, 36.0));
    }

    #[test]
    fn test_invalid_row_height_falls_back() {
        let w = Virtualizer::new(0.0, 1).compute_window(0.0, 10.0, 100);
        assert_eq!(w.end_index, 11);
        assert_eq!(w.total_extent, 100.0);
    }
}
