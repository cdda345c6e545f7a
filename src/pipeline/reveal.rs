/// How many rows the table shows before any "Show More" clicks.
pub const INITIAL_REVEAL: usize = 20;
/// Rows added per "Show More" click.
pub const REVEAL_INCREMENT: usize = 10;

/// The UI-side truncation of the filtered+sorted collection. Deliberately
/// decoupled from the fetch cursor: revealing more rows never implies a
/// remote fetch, and background fetches never disturb the reveal count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealWindow {
    count: usize,
}

impl Default for RevealWindow {
    fn default() -> Self {
        RevealWindow {
            count: INITIAL_REVEAL,
        }
    }
}

impl RevealWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.count.min(items.len())]
    }

    pub fn load_more(&mut self) {
        self.count += REVEAL_INCREMENT;
    }

    /// Back to the initial window. Called when the upstream collection is
    /// replaced wholesale (partition change), not when it merely grows.
    pub fn reset(&mut self) {
        self.count = INITIAL_REVEAL;
    }

    /// Whether rows beyond the window are already cached locally. Distinct
    /// from the fetch stage's "more remote data" signal.
    pub fn has_more(&self, total: usize) -> bool {
        self.count < total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_grows_by_the_increment_and_never_shrinks() {
        let mut window = RevealWindow::new();
        assert_eq!(window.count(), INITIAL_REVEAL);
        window.load_more();
        window.load_more();
        assert_eq!(window.count(), INITIAL_REVEAL + 2 * REVEAL_INCREMENT);
        window.reset();
        assert_eq!(window.count(), INITIAL_REVEAL);
    }

    #[test]
    fn visible_is_min_of_count_and_length() {
        let items: Vec<u32> = (0..25).collect();
        let mut window = RevealWindow::new();
        assert_eq!(window.visible(&items).len(), 20);
        assert!(window.has_more(items.len()));

        window.load_more();
        assert_eq!(window.visible(&items).len(), 25);
        assert!(!window.has_more(items.len()));

        let short: Vec<u32> = (0..3).collect();
        assert_eq!(window.visible(&short), &[0, 1, 2]);
    }
}
