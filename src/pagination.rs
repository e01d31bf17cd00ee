use std::ops::Range;

use crate::context::Fallback;

/// The slice of ranked pathways a report details.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub count: usize,
}

impl PageWindow {
    /// Clamp a requested window against `total` available pathways.
    ///
    /// The rules run in order, each one seeing the previous one's output:
    /// the count is capped at `total`, an offset past the last pathway is
    /// reset to 0, and finally the count shrinks so the window ends at
    /// `total`. The result always satisfies `offset + count <= total` and
    /// `offset < total` unless both are 0.
    pub fn resolve(offset: usize, count: usize, total: usize) -> (PageWindow, Vec<Fallback>) {
        let mut fallbacks = Vec::new();
        let requested_count = count;
        let mut count = count;
        let mut offset = offset;

        if count > total {
            log::warn!("Only {total} pathways available, {count} requested");
            count = total;
        }

        if total == 0 || offset > total - 1 {
            if offset != 0 {
                log::warn!("Pagination offset {offset} is past the last pathway, using 0");
                fallbacks.push(Fallback::Offset { requested: offset });
            }
            offset = 0;
        }

        if offset + count > total {
            log::warn!(
                "Window {offset}..{} runs past the last pathway, showing {}",
                offset + count,
                total - offset
            );
            count = total - offset;
        }

        if count != requested_count {
            fallbacks.push(Fallback::PathwayCount {
                requested: requested_count,
                used: count,
            });
        }

        (PageWindow { offset, count }, fallbacks)
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn offset_past_end_resets_before_shrinking() {
        let (w, f) = PageWindow::resolve(10, 5, 8);
        assert_eq!(w, PageWindow { offset: 0, count: 5 });
        assert_eq!(f, vec![Fallback::Offset { requested: 10 }]);
    }

    #[test]
    fn tail_window_shrinks() {
        let (w, f) = PageWindow::resolve(6, 5, 8);
        assert_eq!(w, PageWindow { offset: 6, count: 2 });
        assert_eq!(f, vec![Fallback::PathwayCount { requested: 5, used: 2 }]);
    }

    static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    struct Capture;

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if let Ok(mut lines) = CAPTURED.lock() {
                lines.push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: Capture = Capture;

    #[test]
    fn every_correction_is_logged() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Warn);

        PageWindow::resolve(6, 5, 8);
        PageWindow::resolve(12, 30, 9);

        let lines = CAPTURED.lock().expect("log capture").clone();
        assert!(lines.iter().any(|l| l == "Window 6..11 runs past the last pathway, showing 2"));
        assert!(lines.iter().any(|l| l == "Only 9 pathways available, 30 requested"));
        assert!(lines.iter().any(|l| l.starts_with("Pagination offset 12 is past")));
    }

    #[test]
    fn empty_result() {
        let (w, _) = PageWindow::resolve(3, 25, 0);
        assert_eq!(w, PageWindow { offset: 0, count: 0 });
        assert!(w.is_empty());
        assert_eq!(w.range(), 0..0);
    }

    #[test]
    fn exhaustive_small_grid_keeps_bounds() {
        for total in 0..12 {
            for offset in 0..15 {
                for count in 0..15 {
                    let (w, _) = PageWindow::resolve(offset, count, total);
                    assert!(w.offset + w.count <= total, "{offset} {count} {total} -> {w:?}");
                    assert!(w.offset < total || (w.offset == 0 && w.count == 0));
                }
            }
        }
    }
}
