use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const BYTE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Truncates `s` to at most `max_width` display columns, marking the cut with an ellipsis.
pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width.saturating_sub(1) {
            result.push('\u{2026}');
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result
}

/// Formats a byte count with binary scaling and one decimal place, capped at PB.
pub fn format_bytes(bytes: u64) -> String {
    let (value, unit) = scale_bytes(bytes);
    format!("{value:.1} {}", BYTE_UNITS[unit])
}

fn scale_bytes(bytes: u64) -> (f64, usize) {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    (value, unit)
}

/// Renders an optional value, or `Unknown` when it is missing.
pub fn or_unknown<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    value.map(render).unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn formats_reference_values() {
        assert_eq!(format_bytes(0), "0.0 B");
        assert_eq!(format_bytes(1023), "1023.0 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_048_576), "1.0 MB");
        assert_eq!(format_bytes(1_073_741_824), "1.0 GB");
    }

    #[test]
    fn stops_at_petabytes() {
        assert_eq!(format_bytes(1u64 << 50), "1.0 PB");
        assert_eq!(format_bytes(1u64 << 60), "1024.0 PB");
        assert!(format_bytes(u64::MAX).ends_with(" PB"));
    }

    #[test]
    fn truncate_respects_width() {
        assert_eq!(truncate_unicode("short", 22), "short");
        let long = "a-very-long-process-name-indeed";
        let cut = truncate_unicode(long, 22);
        assert_eq!(cut.width(), 22);
        assert!(cut.ends_with('\u{2026}'));
    }

    #[test]
    fn unknown_placeholder() {
        assert_eq!(or_unknown(None::<f64>, |v| format!("{v:.1}")), "Unknown");
        assert_eq!(or_unknown(Some(2.0), |v| format!("{v:.1}")), "2.0");
    }

    fn rendered_unit(formatted: &str) -> Option<usize> {
        let (_, unit) = formatted.rsplit_once(' ')?;
        BYTE_UNITS.iter().position(|u| *u == unit)
    }

    proptest! {
        #[test]
        fn larger_input_never_picks_smaller_unit(a in any::<u64>(), b in any::<u64>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo_unit = rendered_unit(&format_bytes(lo));
            let hi_unit = rendered_unit(&format_bytes(hi));
            prop_assert!(lo_unit.is_some() && hi_unit.is_some());
            prop_assert!(lo_unit <= hi_unit);
        }
    }
}
