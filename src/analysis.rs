use std::collections::BTreeMap;

use tracing::debug;

use crate::classifier;
use crate::error::{Error, Result};
use crate::models::{ClassifiedRow, ManagerTotal, SalesRow, Status, StatusSummary};

pub fn analyze(rows: &[SalesRow]) -> Result<Vec<ClassifiedRow>> {
    let mut classified = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let classification = classifier::classify(&row.values).map_err(|source| Error::Classify {
            row: index + 1,
            source,
        })?;

        classified.push(ClassifiedRow {
            manager: row.manager.clone(),
            client: row.client.clone(),
            values: row.values.clone(),
            classification,
        });
    }

    debug!(rows = classified.len(), "classified rows");
    Ok(classified)
}

/// Share of rows per status, in `Status::ALL` order. Empty statuses are left out.
pub fn summarize_by_status(rows: &[ClassifiedRow]) -> Vec<StatusSummary> {
    let mut counts: BTreeMap<Status, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.status()).or_insert(0) += 1;
    }

    let total = rows.len();
    Status::ALL
        .into_iter()
        .filter_map(|status| {
            let count = counts.get(&status).copied()?;
            Some(StatusSummary {
                status,
                count,
                share: count as f64 / total as f64,
            })
        })
        .collect()
}

/// Sum of one period's values per manager and status.
pub fn manager_totals(rows: &[ClassifiedRow], period: usize) -> Vec<ManagerTotal> {
    let mut totals: BTreeMap<(String, Status), f64> = BTreeMap::new();

    for row in rows {
        let value = row.values.get(period).copied().unwrap_or(0.0);
        *totals
            .entry((row.manager.clone(), row.status()))
            .or_insert(0.0) += value;
    }

    totals
        .into_iter()
        .map(|((manager, status), total)| ManagerTotal {
            manager,
            status,
            total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvalidInput;

    fn row(manager: &str, client: &str, values: &[f64]) -> SalesRow {
        SalesRow {
            manager: manager.to_string(),
            client: client.to_string(),
            values: values.to_vec(),
        }
    }

    fn sample() -> Vec<SalesRow> {
        vec![
            row("Olena", "Cafe Aroma", &[10.0, 20.0, 30.0, 40.0, 50.0]),
            row("Olena", "Bistro 7", &[50.0, 60.0, 0.0, 0.0, 0.0]),
            row("Taras", "Roastery", &[0.0, 0.0, 0.0, 0.0, 100.0]),
            row("Taras", "Kiosk", &[10.0, 10.0, 10.0, 10.0, 10.0]),
            row("Olena", "Deli", &[5.0, 6.0, 7.0, 8.0, 9.0]),
        ]
    }

    #[test]
    fn classifies_every_row_in_order() {
        let classified = analyze(&sample()).unwrap();
        let statuses: Vec<Status> = classified.iter().map(|r| r.status()).collect();
        assert_eq!(
            statuses,
            [
                Status::Growth,
                Status::Stopped,
                Status::New,
                Status::Stable,
                Status::Growth
            ]
        );
        assert_eq!(classified[1].classification.last_active, Some(1));
    }

    #[test]
    fn row_order_does_not_change_labels() {
        let rows = sample();
        let forward = analyze(&rows).unwrap();
        let mut reversed_rows = rows.clone();
        reversed_rows.reverse();
        let mut backward = analyze(&reversed_rows).unwrap();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn reports_failing_row_number() {
        let rows = vec![
            row("A", "ok", &[1.0, 2.0, 3.0]),
            row("A", "refund", &[1.0, -2.0, 3.0]),
        ];
        match analyze(&rows) {
            Err(Error::Classify { row, source }) => {
                assert_eq!(row, 2);
                assert_eq!(source, InvalidInput::Negative { index: 1, value: -2.0 });
            }
            other => panic!("expected classify error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn summary_counts_and_shares() {
        let classified = analyze(&sample()).unwrap();
        let summary = summarize_by_status(&classified);
        let pairs: Vec<(Status, usize)> = summary.iter().map(|s| (s.status, s.count)).collect();
        assert_eq!(
            pairs,
            [
                (Status::New, 1),
                (Status::Stopped, 1),
                (Status::Growth, 2),
                (Status::Stable, 1)
            ]
        );
        let growth = summary.iter().find(|s| s.status == Status::Growth).unwrap();
        assert!((growth.share - 0.4).abs() < 1e-9);
    }

    #[test]
    fn summary_of_nothing_is_empty() {
        assert!(summarize_by_status(&[]).is_empty());
    }

    #[test]
    fn totals_group_by_manager_and_status() {
        let classified = analyze(&sample()).unwrap();
        let totals = manager_totals(&classified, 4);
        let olena_growth = totals
            .iter()
            .find(|t| t.manager == "Olena" && t.status == Status::Growth)
            .unwrap();
        assert_eq!(olena_growth.total, 59.0);
        assert_eq!(totals.len(), 4);
        assert_eq!(totals[0].manager, "Olena");
        assert_eq!(totals[3].manager, "Taras");
    }

    #[test]
    fn demo_export_covers_every_trend() {
        let table = crate::loader::load_bytes(
            include_bytes!("../demos/sales.csv"),
            &crate::Config::default(),
        )
        .unwrap();
        let classified = analyze(&table.rows).unwrap();
        let by_client: Vec<(&str, Status)> = classified
            .iter()
            .map(|r| (r.client.as_str(), r.status()))
            .collect();

        assert_eq!(
            by_client,
            [
                ("Cafe Aroma", Status::Growth),
                ("Bistro 7", Status::Stopped),
                ("Green Bean", Status::New),
                ("Roastery Hub", Status::Decline),
                ("Morning Kiosk", Status::Irregular),
                ("Station Cafe", Status::MissingLatest),
                ("Book & Brew", Status::Stable),
            ]
        );
        assert_eq!(classified[1].classification.last_active, Some(1));
    }
}
