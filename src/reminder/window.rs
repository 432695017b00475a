use chrono::NaiveTime;

/// Whether `now` lies inside the daily window, both ends included. Only the time of day is
/// compared, so a window crossing midnight (start after end) never matches.
pub fn is_active(now: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    start <= now && now <= end
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::is_active;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn inside_and_outside_window() {
        assert!(is_active(t(9, 0), t(8, 0), t(22, 0)));
        assert!(!is_active(t(23, 0), t(8, 0), t(22, 0)));
        assert!(!is_active(t(7, 59), t(8, 0), t(22, 0)));
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert!(is_active(t(8, 0), t(8, 0), t(22, 0)));
        assert!(is_active(t(22, 0), t(8, 0), t(22, 0)));
        assert!(!is_active(
            NaiveTime::from_hms_opt(22, 0, 1).unwrap(),
            t(8, 0),
            t(22, 0)
        ));
    }

    #[test]
    fn window_across_midnight_is_never_active() {
        for now in [t(23, 0), t(2, 0), t(12, 0), t(22, 0), t(6, 0)] {
            assert!(!is_active(now, t(22, 0), t(6, 0)), "{now} should be inactive");
        }
    }
}
