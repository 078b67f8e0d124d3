#[cfg(test)]
mod tests {
    use crate::format::{fmt_bytes, fmt_duration, fmt_eta, fmt_percent, fmt_rate};
    use crate::sorting::{sort_rows, SortConfig, SortDirection, SortKey, SortableRow};

    #[test]
    fn test_fmt_bytes() {
        assert_eq!(fmt_bytes(0), "0 B");
        assert_eq!(fmt_bytes(1023), "1023 B");
        assert_eq!(fmt_bytes(1536), "1.5 KB");
        assert_eq!(fmt_bytes(50 * 1024 * 1024), "50 MB");
        assert_eq!(fmt_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_fmt_duration_and_eta() {
        assert_eq!(fmt_duration(42.4), "42s");
        assert_eq!(fmt_duration(3725.0), "1h 02m");
        assert_eq!(fmt_duration(-1.0), "—");
        assert_eq!(fmt_eta(None), "calculating…");
        assert_eq!(fmt_eta(Some(f64::NAN)), "calculating…");
        assert_eq!(fmt_eta(Some(0.4)), "almost done");
        assert_eq!(fmt_eta(Some(90.0)), "~1m 30s remaining");
    }

    #[test]
    fn test_fmt_percent_and_rate() {
        assert_eq!(fmt_percent(35.0), "35.0%");
        assert_eq!(fmt_percent(140.0), "100.0%");
        assert_eq!(fmt_percent(f64::NAN), "0.0%");
        assert_eq!(fmt_rate(2048, 2.0), "1.0 KB/s");
        assert_eq!(fmt_rate(2048, 0.0), "—");
    }

    struct Row(&'static str, Option<f64>);

    impl SortableRow for Row {
        fn sort_key(&self, column: &str) -> SortKey {
            match column {
                "name" => SortKey::text(self.0),
                "value" => self.1.map(SortKey::Number).unwrap_or(SortKey::Missing),
                _ => SortKey::Missing,
            }
        }
    }

    #[test]
    fn test_sort_toggle_semantics() {
        let mut cfg = SortConfig::new("name", SortDirection::Asc);
        cfg.toggle("name");
        assert_eq!(cfg.direction, SortDirection::Desc);
        cfg.toggle("value");
        assert_eq!(cfg.column, "value");
        assert_eq!(cfg.direction, SortDirection::Asc);
        assert_eq!(cfg.indicators(&["name", "value"]), vec![("name", ""), ("value", " ▲")]);
    }

    #[test]
    fn test_text_sort_is_case_insensitive_and_stable() {
        let mut rows = vec![Row("beta", None), Row("Alpha", None), Row("alpha", Some(1.0))];
        sort_rows(&mut rows, &SortConfig::new("name", SortDirection::Asc));
        let names: Vec<&str> = rows.iter().map(|r| r.0).collect();
        assert_eq!(names, vec!["Alpha", "alpha", "beta"]);
    }

    #[test]
    fn test_missing_values_sort_last_both_ways() {
        let mut rows = vec![Row("a", None), Row("b", Some(2.0)), Row("c", Some(1.0))];
        sort_rows(&mut rows, &SortConfig::new("value", SortDirection::Asc));
        assert_eq!(rows.iter().map(|r| r.0).collect::<Vec<_>>(), vec!["c", "b", "a"]);
        sort_rows(&mut rows, &SortConfig::new("value", SortDirection::Desc));
        assert_eq!(rows.iter().map(|r| r.0).collect::<Vec<_>>(), vec!["b", "c", "a"]);
    }
}
