use crate::constants::SECONDS_PER_DAY_F64;

/// Gregorian calendar date with the fraction of the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarDate {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub fraction: f64,
}

impl CalendarDate {
    /// Converts a Modified Julian Date to a Gregorian calendar date.
    ///
    /// Returns `None` before 4713 BC March 1 or for non-finite input.
    pub fn from_mjd(mjd: f64) -> Option<Self> {
        if !mjd.is_finite() || mjd <= -2_395_520.0 || mjd >= 1.0e9 {
            return None;
        }

        let day_floor = mjd.floor();
        let fraction = mjd - day_floor;

        // Fliegel & Van Flandern integer algorithm
        let jd = day_floor as i64 + 2_400_001;
        let mut l = jd + 68_569;
        let n = (4 * l) / 146_097;
        l -= (146_097 * n + 3) / 4;
        let i = (4000 * (l + 1)) / 1_461_001;
        l -= (1461 * i) / 4 - 31;
        let k = (80 * l) / 2447;
        let day = l - (2447 * k) / 80;
        l = k / 11;
        let month = k + 2 - 12 * l;
        let year = 100 * (n - 49) + i + l;

        Some(Self {
            year,
            month: month as u32,
            day: day as u32,
            fraction,
        })
    }

    /// Hours, minutes and whole seconds of the day fraction.
    pub fn time_of_day(&self) -> (u32, u32, u32) {
        let secs = ((self.fraction * SECONDS_PER_DAY_F64).round() as u32).min(86_399);
        (secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (h, m, s) = self.time_of_day();
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
            self.year, self.month, self.day, h, m, s
        )
    }
}

/// Renders an MJD for diagnostics, falling back to the raw number when the
/// date is outside the calendar algorithm's range.
pub fn format_mjd(mjd: f64) -> String {
    match CalendarDate::from_mjd(mjd) {
        Some(date) => format!("{date} (MJD {mjd:.5})"),
        None => format!("MJD {mjd}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_j2000_midnight() {
        let date = CalendarDate::from_mjd(51544.0).unwrap();
        assert_eq!((date.year, date.month, date.day), (2000, 1, 1));
        assert_eq!(date.time_of_day(), (0, 0, 0));
    }

    #[test]
    fn test_mjd_zero() {
        let date = CalendarDate::from_mjd(0.0).unwrap();
        assert_eq!((date.year, date.month, date.day), (1858, 11, 17));
    }

    #[test]
    fn test_mjd_59000() {
        let date = CalendarDate::from_mjd(59000.75).unwrap();
        assert_eq!((date.year, date.month, date.day), (2020, 5, 31));
        assert_eq!(date.time_of_day(), (18, 0, 0));
        assert_eq!(date.to_string(), "2020-05-31 18:00:00 UTC");
    }

    #[test]
    fn test_leap_day() {
        let date = CalendarDate::from_mjd(51603.0).unwrap();
        assert_eq!((date.year, date.month, date.day), (2000, 2, 29));
    }

    #[test]
    fn test_out_of_range() {
        assert!(CalendarDate::from_mjd(f64::NAN).is_none());
        assert!(CalendarDate::from_mjd(-3.0e6).is_none());
        assert_eq!(format_mjd(f64::INFINITY), "MJD inf");
    }
}
