use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::models::{ClassifiedRow, Status};
use crate::periods::Period;
use crate::report::last_active_label;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes rows as CSV with a UTF-8 BOM so spreadsheet tools pick the right encoding.
pub fn write_csv<W: Write>(mut out: W, periods: &[Period], rows: &[ClassifiedRow]) -> Result<()> {
    out.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(out);
    let mut header: Vec<&str> = vec!["manager", "client"];
    header.extend(periods.iter().map(|p| p.label.as_str()));
    header.extend(["status", "status_id", "last_active"]);
    writer.write_record(&header)?;

    for row in rows {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        record.push(row.manager.clone());
        record.push(row.client.clone());
        record.extend(row.values.iter().map(|v| v.to_string()));
        record.push(row.status().label().to_string());
        record.push(row.status().id().to_string());
        record.push(last_active_label(row, periods));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonRow<'a> {
    manager: &'a str,
    client: &'a str,
    values: Vec<JsonValue<'a>>,
    status: Status,
    status_label: &'static str,
    last_active: Option<String>,
}

#[derive(Serialize)]
struct JsonValue<'a> {
    period: &'a str,
    value: f64,
}

pub fn to_json(periods: &[Period], rows: &[ClassifiedRow]) -> Result<String> {
    let payload: Vec<JsonRow> = rows
        .iter()
        .map(|row| JsonRow {
            manager: &row.manager,
            client: &row.client,
            values: periods
                .iter()
                .zip(&row.values)
                .map(|(period, value)| JsonValue {
                    period: &period.label,
                    value: *value,
                })
                .collect(),
            status: row.status(),
            status_label: row.status().label(),
            last_active: Some(last_active_label(row, periods)).filter(|label| !label.is_empty()),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Classification;

    fn periods() -> Vec<Period> {
        ["11.25", "12.25", "1.26"]
            .iter()
            .filter_map(|label| Period::parse(label))
            .collect()
    }

    fn rows() -> Vec<ClassifiedRow> {
        vec![
            ClassifiedRow {
                manager: "Olena".to_string(),
                client: "Cafe, Aroma".to_string(),
                values: vec![1.0, 2.5, 3.0],
                classification: Classification::of(Status::Growth),
            },
            ClassifiedRow {
                manager: "Taras".to_string(),
                client: "Roastery".to_string(),
                values: vec![4.0, 0.0, 0.0],
                classification: Classification {
                    status: Status::Stopped,
                    last_active: Some(0),
                },
            },
        ]
    }

    #[test]
    fn json_marks_never_active_rows_long_ago() {
        let never = ClassifiedRow {
            manager: "Ira".to_string(),
            client: "Ghost".to_string(),
            values: vec![0.0, 0.0, 0.0],
            classification: Classification {
                status: Status::Stopped,
                last_active: None,
            },
        };
        let json = to_json(&periods(), &[never]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["last_active"], "long ago");
    }

    #[test]
    fn csv_starts_with_bom_and_header() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &periods(), &rows()).unwrap();

        assert!(buffer.starts_with(UTF8_BOM));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("manager,client,11.25,12.25,1.26,status,status_id,last_active")
        );
        assert_eq!(
            lines.next(),
            Some("Olena,\"Cafe, Aroma\",1,2.5,3,🟢 Growth,GROWTH,")
        );
        assert_eq!(
            lines.next(),
            Some("Taras,Roastery,4,0,0,🔴 Stopped buying,STOPPED,11.25")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_file_round_trips_through_reader() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_csv(file.reopen().unwrap(), &periods(), &rows()).unwrap();

        let bytes = std::fs::read(file.path()).unwrap();
        let mut reader = csv::Reader::from_reader(&bytes[UTF8_BOM.len()..]);
        let statuses: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[6].to_string())
            .collect();
        assert_eq!(statuses, ["GROWTH", "STOPPED"]);
    }

    #[test]
    fn json_uses_period_labels() {
        let json = to_json(&periods(), &rows()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["status"], "GROWTH");
        assert_eq!(parsed[0]["values"][1]["period"], "12.25");
        assert_eq!(parsed[0]["values"][1]["value"], 2.5);
        assert_eq!(parsed[0]["last_active"], serde_json::Value::Null);
        assert_eq!(parsed[1]["last_active"], "11.25");
    }
}
