use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};

/// Years a reporting month may fall in; anything else is not a period header.
const YEARS: std::ops::RangeInclusive<i32> = 2000..=2099;

/// One reporting month, keyed by the header label it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Period {
    pub label: String,
    pub month: NaiveDate,
}

impl Period {
    /// Parses `9.25`, `09.2025` or `2025-09` into the first day of that month.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        let (month, year) = if let Some((year, month)) = trimmed.split_once('-') {
            (month, year)
        } else {
            trimmed.split_once('.')?
        };

        let month: u32 = month.trim().parse().ok()?;
        let year = year.trim();
        let year: i32 = match year.len() {
            2 => 2000 + year.parse::<i32>().ok()?,
            4 => year.parse().ok()?,
            _ => return None,
        };
        if !YEARS.contains(&year) {
            return None;
        }

        NaiveDate::from_ymd_opt(year, month, 1).map(|month| Self {
            label: trimmed.to_string(),
            month,
        })
    }

    pub fn display_month(&self) -> String {
        format!("{:02}/{}", self.month.month(), self.month.year())
    }
}

/// A period together with the CSV column it is read from.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodColumn {
    pub index: usize,
    pub period: Period,
}

/// Finds every header that names a month and orders them oldest first.
pub fn discover_periods<'a, I>(headers: I) -> Result<Vec<PeriodColumn>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut columns: Vec<PeriodColumn> = headers
        .into_iter()
        .enumerate()
        .filter_map(|(index, header)| Period::parse(header).map(|period| PeriodColumn { index, period }))
        .collect();

    if columns.is_empty() {
        return Err(Error::NoPeriods);
    }

    columns.sort_by_key(|column| column.period.month);
    reject_duplicates(&columns)?;
    Ok(columns)
}

/// Resolves an explicit list of period labels against the header.
///
/// Labels that parse as months are ordered chronologically; otherwise the
/// configured order is kept as given.
pub fn select_periods<'a, I>(headers: I, labels: &[String]) -> Result<Vec<PeriodColumn>>
where
    I: IntoIterator<Item = &'a str>,
{
    if labels.is_empty() {
        return Err(Error::NoPeriods);
    }

    let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
    let mut columns = Vec::with_capacity(labels.len());
    let mut all_parsed = true;

    for (position, label) in labels.iter().enumerate() {
        let wanted = label.trim();
        let index = headers
            .iter()
            .position(|header| *header == wanted)
            .ok_or_else(|| Error::MissingColumn(wanted.to_string()))?;

        let period = match Period::parse(wanted) {
            Some(period) => period,
            None => {
                all_parsed = false;
                // Synthetic months keep the configured order stable.
                let fallback = NaiveDate::from_ymd_opt(1970, 1, 1)
                    .and_then(|epoch| epoch.checked_add_months(chrono::Months::new(position as u32)))
                    .ok_or_else(|| Error::Config(format!("too many periods at '{}'", wanted)))?;
                Period {
                    label: wanted.to_string(),
                    month: fallback,
                }
            }
        };

        columns.push(PeriodColumn { index, period });
    }

    if all_parsed {
        columns.sort_by_key(|column| column.period.month);
        reject_duplicates(&columns)?;
    }

    Ok(columns)
}

fn reject_duplicates(columns: &[PeriodColumn]) -> Result<()> {
    for pair in columns.windows(2) {
        if pair[0].period.month == pair[1].period.month {
            return Err(Error::Config(format!(
                "columns '{}' and '{}' name the same month",
                pair[0].period.label, pair[1].period.label
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_labels() {
        let sept = Period::parse("9.25").unwrap();
        assert_eq!(sept.month, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert_eq!(sept.label, "9.25");

        let jan = Period::parse(" 01.2026 ").unwrap();
        assert_eq!(jan.month, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(jan.label, "01.2026");

        let iso = Period::parse("2025-11").unwrap();
        assert_eq!(iso.month, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
        assert_eq!(iso.display_month(), "11/2025");
    }

    #[test]
    fn rejects_non_month_headers() {
        assert!(Period::parse("Менеджер").is_none());
        assert!(Period::parse("13.25").is_none());
        assert!(Period::parse("1.5").is_none());
        assert!(Period::parse("total").is_none());
        assert!(Period::parse("1.1234").is_none());
        assert!(Period::parse("1850-03").is_none());
    }

    #[test]
    fn discovers_and_orders_across_year_boundary() {
        let headers = ["Менеджер", "Клієнт", "1.26", "9.25", "10.25", "11.25", "12.25"];
        let periods = discover_periods(headers).unwrap();
        let labels: Vec<&str> = periods.iter().map(|c| c.period.label.as_str()).collect();
        assert_eq!(labels, ["9.25", "10.25", "11.25", "12.25", "1.26"]);
        assert_eq!(periods[0].index, 3);
        assert_eq!(periods[4].index, 2);
    }

    #[test]
    fn discovery_without_months_fails() {
        assert!(matches!(
            discover_periods(["manager", "client"]),
            Err(Error::NoPeriods)
        ));
    }

    #[test]
    fn discovery_rejects_same_month_twice() {
        assert!(matches!(
            discover_periods(["9.25", "09.2025"]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn selects_configured_labels() {
        let headers = ["manager", "client", "9.25", "10.25", "11.25"];
        let labels = vec!["11.25".to_string(), "9.25".to_string()];
        let periods = select_periods(headers, &labels).unwrap();
        assert_eq!(periods[0].period.label, "9.25");
        assert_eq!(periods[1].period.label, "11.25");
        assert_eq!(periods[1].index, 4);
    }

    #[test]
    fn keeps_configured_order_for_free_form_labels() {
        let headers = ["manager", "client", "Q3", "Q1", "Q2"];
        let labels = vec!["Q1".to_string(), "Q2".to_string(), "Q3".to_string()];
        let periods = select_periods(headers, &labels).unwrap();
        let indexes: Vec<usize> = periods.iter().map(|c| c.index).collect();
        assert_eq!(indexes, [3, 4, 2]);
    }

    #[test]
    fn missing_configured_label_is_reported() {
        let labels = vec!["12.25".to_string()];
        match select_periods(["manager", "client", "9.25"], &labels) {
            Err(Error::MissingColumn(name)) => assert_eq!(name, "12.25"),
            other => panic!("unexpected result: {:?}", other.map(|p| p.len())),
        }
    }
}
