/// Format a duration in milliseconds as `MM:SS.CC`.
///
/// Minutes are not wrapped at 60; they grow past two digits as needed.
/// Hundredths are truncated, never rounded.
pub fn format_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let hundredths = (ms % 1_000) / 10;
    format!("{minutes:02}:{seconds:02}.{hundredths:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_values() {
        assert_eq!(format_time(0), "00:00.00");
        assert_eq!(format_time(65_010), "01:05.01");
        assert_eq!(format_time(3_600_000), "60:00.00");
        assert_eq!(format_time(59_999), "00:59.99");
        assert_eq!(format_time(9), "00:00.00");
    }

    #[test]
    fn minutes_are_unbounded() {
        assert_eq!(format_time(100 * 60_000 + 1_230), "100:01.23");
    }

    proptest! {
        #[test]
        fn shape_is_always_mm_ss_cc(ms in 0u64..10_000_000_000) {
            let s = format_time(ms);
            let (mm, rest) = s.split_once(':').unwrap();
            let (ss, cc) = rest.split_once('.').unwrap();
            prop_assert!(mm.len() >= 2 && mm.chars().all(|c| c.is_ascii_digit()));
            prop_assert_eq!(ss.len(), 2);
            prop_assert_eq!(cc.len(), 2);
            prop_assert!(ss.parse::<u64>().unwrap() < 60);
            prop_assert_eq!(mm.parse::<u64>().unwrap(), ms / 60_000);
        }

        #[test]
        fn same_input_same_output(ms in any::<u64>()) {
            prop_assert_eq!(format_time(ms), format_time(ms));
        }
    }
}
