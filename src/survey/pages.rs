pub const SURVEY_PAGE_SIZE: usize = 20;

/// Page-based visibility window: the table shows the first
/// `current_page * per_page` rows of the filtered, sorted list, growing a
/// whole page at a time.
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    current_page: usize,
    per_page: usize,
}

impl Default for PageWindow {
    fn default() -> Self {
        PageWindow {
            current_page: 1,
            per_page: SURVEY_PAGE_SIZE,
        }
    }
}

impl PageWindow {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_per_page(per_page: usize) -> Self {
        PageWindow {
            current_page: 1,
            per_page,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn visible<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let shown = (self.current_page * self.per_page).min(rows.len());
        &rows[..shown]
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.current_page * self.per_page < total
    }

    /// Advances one page, but only when there are rows left to show.
    pub fn load_more(&mut self, total: usize) -> bool {
        if !self.has_more(total) {
            return false;
        }
        self.current_page += 1;
        true
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_a_page_at_a_time() {
        let rows: Vec<usize> = (0..45).collect();
        let mut window = PageWindow::with_per_page(20);
        assert_eq!(window.visible(&rows).len(), 20);
        assert!(window.load_more(rows.len()));
        assert_eq!(window.visible(&rows).len(), 40);
        assert!(window.load_more(rows.len()));
        assert_eq!(window.visible(&rows).len(), 45);
        assert!(!window.has_more(rows.len()));
        assert!(!window.load_more(rows.len()));
        assert_eq!(window.current_page(), 3);
    }

    #[test]
    fn reset_returns_to_the_first_page() {
        let mut window = PageWindow::with_per_page(20);
        window.load_more(100);
        window.load_more(100);
        window.reset();
        assert_eq!(window.current_page(), 1);
        let rows: Vec<usize> = (0..100).collect();
        assert_eq!(window.visible(&rows).len(), 20);
    }

    #[test]
    fn short_list_is_fully_visible() {
        let rows: Vec<usize> = (0..7).collect();
        let window = PageWindow::with_per_page(20);
        assert_eq!(window.visible(&rows).len(), 7);
        assert!(!window.has_more(rows.len()));
    }
}
