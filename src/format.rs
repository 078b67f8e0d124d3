//! Human-readable formatting for sizes, durations and ETAs.

// Format bytes using binary units
pub fn fmt_bytes(n: u64) -> String {
    let mut v = n as f64;
    let units = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut i = 0usize;
    while v >= 1024.0 && i < units.len() - 1 {
        v /= 1024.0;
        i += 1;
    }
    if i == 0 {
        format!("{} {}", n, units[0])
    } else if v >= 10.0 {
        format!("{:.0} {}", v, units[i])
    } else {
        format!("{:.1} {}", v, units[i])
    }
}

/// `42s`, `3m 05s`, `1h 02m`. Negative or non-finite input yields `—`.
pub fn fmt_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "—".to_string();
    }
    let total = seconds.round() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{}h {:02}m", h, m)
    } else if m > 0 {
        format!("{}m {:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// ETA label for the overall progress bar.
pub fn fmt_eta(eta_seconds: Option<f64>) -> String {
    match eta_seconds {
        Some(s) if s.is_finite() && s >= 0.0 => {
            if s < 1.0 {
                "almost done".to_string()
            } else {
                format!("~{} remaining", fmt_duration(s))
            }
        }
        _ => "calculating…".to_string(),
    }
}

pub fn fmt_percent(p: f64) -> String {
    let p = if p.is_finite() { p.clamp(0.0, 100.0) } else { 0.0 };
    format!("{:.1}%", p)
}

/// Transfer rate from bytes and elapsed seconds, e.g. `12.4 MB/s`.
pub fn fmt_rate(bytes: u64, elapsed_seconds: f64) -> String {
    if elapsed_seconds <= 0.0 || !elapsed_seconds.is_finite() {
        return "—".to_string();
    }
    let per_sec = (bytes as f64 / elapsed_seconds) as u64;
    format!("{}/s", fmt_bytes(per_sec))
}
