//! Client-side column sorting shared by the review, completion and log tables.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Active sort column plus direction for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortConfig {
    pub column: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(column: &str, direction: SortDirection) -> Self {
        Self { column: column.to_string(), direction }
    }

    /// Header click: same column flips the direction, another column starts ascending.
    pub fn toggle(&mut self, column: &str) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column.to_string();
            self.direction = SortDirection::Asc;
        }
    }

    /// Indicator rendered next to a column header.
    pub fn indicator(&self, column: &str) -> &'static str {
        if self.column != column {
            return "";
        }
        match self.direction {
            SortDirection::Asc => " ▲",
            SortDirection::Desc => " ▼",
        }
    }

    /// All header labels with their indicators, in the given column order.
    pub fn indicators<'a>(&self, columns: &[&'a str]) -> Vec<(&'a str, &'static str)> {
        columns.iter().map(|c| (*c, self.indicator(c))).collect()
    }
}

/// A comparable cell value. Missing values always sort last.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(f64),
    Missing,
}

impl SortKey {
    pub fn text(s: &str) -> Self {
        SortKey::Text(s.to_lowercase())
    }

    fn cmp_present(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

/// Rows that can be sorted by a named column.
pub trait SortableRow {
    fn sort_key(&self, column: &str) -> SortKey;
}

pub fn compare_rows<T: SortableRow>(a: &T, b: &T, cfg: &SortConfig) -> Ordering {
    let ka = a.sort_key(&cfg.column);
    let kb = b.sort_key(&cfg.column);
    match (&ka, &kb) {
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
        (SortKey::Missing, _) => Ordering::Greater,
        (_, SortKey::Missing) => Ordering::Less,
        _ => {
            let ord = ka.cmp_present(&kb);
            match cfg.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// Stable sort, so equal keys keep their server order.
pub fn sort_rows<T: SortableRow>(rows: &mut [T], cfg: &SortConfig) {
    rows.sort_by(|a, b| compare_rows(a, b, cfg));
}
