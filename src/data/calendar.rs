use chrono::{Local, Months, NaiveDate};

/// ISO date format used by filters and the reports query.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Preset relative date ranges ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickRange {
    LastMonth,
    Last3Months,
    Last6Months,
    Last12Months,
}

impl QuickRange {
    pub const ALL: [QuickRange; 4] = [
        QuickRange::LastMonth,
        QuickRange::Last3Months,
        QuickRange::Last6Months,
        QuickRange::Last12Months,
    ];

    pub fn months(self) -> u32 {
        match self {
            QuickRange::LastMonth => 1,
            QuickRange::Last3Months => 3,
            QuickRange::Last6Months => 6,
            QuickRange::Last12Months => 12,
        }
    }

    /// Stable identifier, used in logs.
    pub fn key(self) -> &'static str {
        match self {
            QuickRange::LastMonth => "last1m",
            QuickRange::Last3Months => "last3m",
            QuickRange::Last6Months => "last6m",
            QuickRange::Last12Months => "last12m",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuickRange::LastMonth => "1M",
            QuickRange::Last3Months => "3M",
            QuickRange::Last6Months => "6M",
            QuickRange::Last12Months => "12M",
        }
    }

    /// `[today - N months, today]`.
    pub fn ending(self, today: NaiveDate) -> DateRange {
        DateRange {
            start: months_before(today, self.months()),
            end: today,
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Both bounds as `YYYY-MM-DD`.
    pub fn iso_bounds(&self) -> (String, String) {
        (
            self.start.format(ISO_DATE).to_string(),
            self.end.format(ISO_DATE).to_string(),
        )
    }
}

/// Calendar month subtraction. When the target month is shorter the day is
/// clamped to its last day: 2024-03-31 minus one month is 2024-02-29.
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_iso(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE).ok()
}
