//! Sales Reporting

use jiff::{ToSpan, civil::Date};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a reporting range ends before it starts.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("reporting range starts on {start} but ends on {end}")]
pub struct InvalidRangeError {
    /// Requested first day.
    pub start: Date,

    /// Requested last day.
    pub end: Date,
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    /// Creates a range covering `start` through `end`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRangeError`] when `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Result<Self, InvalidRangeError> {
        if start > end {
            return Err(InvalidRangeError { start, end });
        }

        Ok(Self { start, end })
    }

    /// First day of the range.
    pub const fn start(&self) -> Date {
        self.start
    }

    /// Last day of the range.
    pub const fn end(&self) -> Date {
        self.end
    }

    /// Every day in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = Date> + use<> {
        let end = self.end;

        self.start.series(1.day()).take_while(move |day| *day <= end)
    }

    /// Number of days in the range.
    pub fn len(&self) -> usize {
        let days = (self.end - self.start).get_days();

        usize::try_from(days).map_or(0, |days| days + 1)
    }

    /// Always false; a range holds at least one day.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether `day` falls within the range.
    pub fn contains(&self, day: Date) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Orders grouped by calendar day, as returned by the order store.
///
/// Days without orders are absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyAggregate {
    /// Calendar day in the reporting time zone.
    pub day: Date,

    /// Number of orders placed that day.
    pub sales_count: u64,

    /// Sum of order totals that day, in minor units.
    pub revenue: u64,
}

/// One row of a daily sales report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySalesRecord {
    /// Calendar day.
    pub date: Date,

    /// Number of orders placed that day.
    pub sales_count: u64,

    /// Sum of order totals that day, in minor units.
    pub revenue: u64,
}

/// Store-wide counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesTotals {
    /// Registered customers.
    pub user_count: u64,

    /// Catalog products.
    pub product_count: u64,

    /// Recorded orders.
    pub order_count: u64,

    /// Sum of all order totals, in minor units.
    pub total_revenue: u64,
}

/// Expands sparse per-day aggregates into one record for every day in `range`.
///
/// Days missing from `aggregates` are reported with zero sales and revenue.
/// Aggregates outside the range are ignored; repeated days are summed.
pub fn reconcile_daily_sales<I>(range: &DateRange, aggregates: I) -> Vec<DailySalesRecord>
where
    I: IntoIterator<Item = DailyAggregate>,
{
    let mut by_day: FxHashMap<Date, (u64, u64)> = FxHashMap::default();

    for aggregate in aggregates
        .into_iter()
        .filter(|aggregate| range.contains(aggregate.day))
    {
        let entry = by_day.entry(aggregate.day).or_default();

        entry.0 = entry.0.saturating_add(aggregate.sales_count);
        entry.1 = entry.1.saturating_add(aggregate.revenue);
    }

    range
        .days()
        .map(|date| {
            let (sales_count, revenue) = by_day.get(&date).copied().unwrap_or_default();

            DailySalesRecord {
                date,
                sales_count,
                revenue,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_gaps_are_filled_with_zero_days() -> TestResult {
        let range = DateRange::new(date(2025, 10, 1), date(2025, 10, 3))?;

        let report = reconcile_daily_sales(
            &range,
            [DailyAggregate {
                day: date(2025, 10, 2),
                sales_count: 1,
                revenue: 1500,
            }],
        );

        assert_eq!(
            report,
            vec![
                DailySalesRecord {
                    date: date(2025, 10, 1),
                    sales_count: 0,
                    revenue: 0,
                },
                DailySalesRecord {
                    date: date(2025, 10, 2),
                    sales_count: 1,
                    revenue: 1500,
                },
                DailySalesRecord {
                    date: date(2025, 10, 3),
                    sales_count: 0,
                    revenue: 0,
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn test_report_has_one_ascending_record_per_day() -> TestResult {
        let cases = [
            (date(2025, 1, 1), date(2025, 1, 1), 1),
            (date(2024, 2, 27), date(2024, 3, 1), 4),
            (date(2023, 2, 27), date(2023, 3, 1), 3),
            (date(2025, 12, 30), date(2026, 1, 2), 4),
            (date(2025, 1, 1), date(2025, 12, 31), 365),
        ];

        for (start, end, expected) in cases {
            let range = DateRange::new(start, end)?;
            let report = reconcile_daily_sales(&range, []);

            assert_eq!(report.len(), expected, "{start}..={end}");
            assert_eq!(range.len(), expected, "{start}..={end}");
            assert_eq!(report.first().map(|r| r.date), Some(start));
            assert_eq!(report.last().map(|r| r.date), Some(end));
            assert!(
                report.windows(2).all(|pair| match pair {
                    [a, b] => a.date < b.date,
                    _ => false,
                }),
                "dates must be strictly ascending"
            );
            assert!(
                report.iter().all(|r| r.sales_count == 0 && r.revenue == 0),
                "empty aggregates give an all-zero report"
            );
        }

        Ok(())
    }

    #[test]
    fn test_aggregates_outside_range_are_ignored() -> TestResult {
        let range = DateRange::new(date(2025, 10, 1), date(2025, 10, 2))?;

        let report = reconcile_daily_sales(
            &range,
            [
                DailyAggregate {
                    day: date(2025, 9, 30),
                    sales_count: 4,
                    revenue: 400,
                },
                DailyAggregate {
                    day: date(2025, 10, 2),
                    sales_count: 2,
                    revenue: 300,
                },
                DailyAggregate {
                    day: date(2025, 10, 3),
                    sales_count: 9,
                    revenue: 900,
                },
            ],
        );

        let totals: Vec<(u64, u64)> = report.iter().map(|r| (r.sales_count, r.revenue)).collect();

        assert_eq!(totals, vec![(0, 0), (2, 300)]);

        Ok(())
    }

    #[test]
    fn test_repeated_days_are_summed() -> TestResult {
        let range = DateRange::new(date(2025, 10, 1), date(2025, 10, 1))?;
        let aggregate = DailyAggregate {
            day: date(2025, 10, 1),
            sales_count: 1,
            revenue: 250,
        };

        let report = reconcile_daily_sales(&range, [aggregate, aggregate]);

        assert_eq!(report.first().map(|r| (r.sales_count, r.revenue)), Some((2, 500)));

        Ok(())
    }

    #[test]
    fn test_range_len_counts_days_without_walking() -> TestResult {
        let century = DateRange::new(date(2000, 1, 1), date(2099, 12, 31))?;
        let widest = DateRange::new(jiff::civil::Date::MIN, jiff::civil::Date::MAX)?;

        assert_eq!(century.len(), 36_525);
        assert_eq!(century.len(), century.days().count());
        assert!(widest.len() > century.len(), "widest range spans every day");

        Ok(())
    }

    #[test]
    fn test_range_rejects_end_before_start() {
        let result = DateRange::new(date(2025, 10, 3), date(2025, 10, 1));

        assert_eq!(
            result,
            Err(InvalidRangeError {
                start: date(2025, 10, 3),
                end: date(2025, 10, 1),
            })
        );
    }
}
