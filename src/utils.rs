use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Formats as `"Mon YYYY"`, e.g. `"Feb 2023"`.
    pub fn label(self) -> String {
        let idx = (self.month.clamp(1, 12) - 1) as usize;
        format!("{} {}", MONTH_ABBREVIATIONS[idx], self.year)
    }
}

/// Every calendar month from `start` to `end`, both inclusive.
/// Empty when `end` precedes `start`.
pub fn months_in_span(start: NaiveDate, end: NaiveDate) -> Vec<YearMonth> {
    let mut months = Vec::new();
    let last = YearMonth::of(end);
    let mut current = YearMonth::of(start);

    while current <= last {
        months.push(current);
        current = current.next();
    }

    months
}

/// Rounds half away from zero to two decimal places.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a monetary amount with exactly two decimal places, half-up.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = round_money(amount);
    rounded.rescale(2);
    rounded.to_string()
}
