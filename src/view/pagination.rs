/// Zero-based page cursor over a list of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

impl Pagination {
    pub fn new(per_page: usize) -> Self {
        Self { page: 0, per_page: per_page.max(1), total: 0 }
    }

    pub fn page_count(&self) -> usize {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    /// Update the total and keep the cursor inside the new range.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        let last = self.page_count() - 1;
        if self.page > last {
            self.page = last;
        }
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.min(self.page_count() - 1);
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// Index range of the current page.
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = (self.page * self.per_page).min(self.total);
        let end = (start + self.per_page).min(self.total);
        start..end
    }

    /// `Page 2 of 7`
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page + 1, self.page_count())
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let r = self.range();
        let end = r.end.min(items.len());
        let start = r.start.min(end);
        &items[start..end]
    }
}
