//! Formatting utilities

use humansize::{DECIMAL, format_size};

/// Format a byte count in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a percentage
pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// Share of `part` in `whole` as a percentage
pub fn format_ratio(part: usize, whole: usize) -> String {
    if whole == 0 {
        "N/A".to_string()
    } else {
        format_percentage(part as f64 / whole as f64 * 100.0)
    }
}

/// Format a float without trailing noise
pub fn format_value(value: f32) -> String {
    if value.is_finite() {
        format!("{value:.3}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
        assert_eq!(format_bytes(1048576), "1.05 MB");
    }

    #[test]
    fn test_format_ratio() {
        assert_eq!(format_ratio(50, 200), "25.0%");
        assert_eq!(format_ratio(3, 3), "100.0%");
        assert_eq!(format_ratio(0, 0), "N/A");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.0), "1");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!(format_value(-135.0), "-135");
        assert_eq!(format_value(1.0 / 3.0), "0.333");
        assert_eq!(format_value(f32::NAN), "NaN");
    }
}
