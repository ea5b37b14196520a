use std::path::Path;

use tracing::{debug, info, warn};

use crate::classifier::MIN_PERIODS;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::SalesRow;
use crate::periods::{self, Period, PeriodColumn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone)]
pub struct SalesTable {
    pub periods: Vec<Period>,
    pub rows: Vec<SalesRow>,
}

pub fn load_path(path: &Path, config: &Config) -> Result<SalesTable> {
    let bytes = std::fs::read(path)?;
    info!(path = %path.display(), bytes = bytes.len(), "reading sales export");
    load_bytes(&bytes, config)
}

pub fn load_bytes(bytes: &[u8], config: &Config) -> Result<SalesTable> {
    let (text, encoding) = decode(bytes)?;
    debug!(encoding, "decoded export");

    let delimiter = match config.csv.delimiter {
        Some(delimiter) => delimiter as u8,
        None => sniff_delimiter(&text),
    };
    debug!(delimiter = %(delimiter as char), "using delimiter");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let manager_col = find_column(&headers, &config.columns.manager)?;
    let client_col = find_column(&headers, &config.columns.client)?;

    let columns: Vec<PeriodColumn> = if config.periods.labels.is_empty() {
        periods::discover_periods(headers.iter())?
    } else {
        periods::select_periods(headers.iter(), &config.periods.labels)?
    };

    if columns.len() < MIN_PERIODS {
        warn!(
            periods = columns.len(),
            "fewer than {} periods, every row will be insufficient data", MIN_PERIODS
        );
    }
    info!(
        periods = ?columns.iter().map(|c| c.period.label.as_str()).collect::<Vec<_>>(),
        "period columns"
    );

    let mut rows = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let manager = record.get(manager_col).unwrap_or("").trim().to_string();
        let client = record.get(client_col).unwrap_or("").trim().to_string();

        if manager.is_empty() && client.is_empty() {
            debug!(row = line + 1, "skipping row without manager and client");
            continue;
        }

        let values = columns
            .iter()
            .map(|column| {
                let raw = record.get(column.index).unwrap_or("");
                parse_amount(raw).unwrap_or_else(|| {
                    warn!(
                        row = line + 1,
                        column = %column.period.label,
                        value = raw,
                        "unparsable amount, treating as 0"
                    );
                    0.0
                })
            })
            .collect();

        rows.push(SalesRow {
            manager,
            client,
            values,
        });
    }

    info!(rows = rows.len(), "loaded sales rows");

    Ok(SalesTable {
        periods: columns.into_iter().map(|c| c.period).collect(),
        rows,
    })
}

/// Decodes UTF-8 (with or without BOM), falling back to Windows-1251.
pub fn decode(bytes: &[u8]) -> Result<(String, &'static str)> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok((text.to_string(), "UTF-8"));
    }

    // Every byte maps in Windows-1251, so control characters are the tell for binary input.
    let (text, _) = encoding_rs::WINDOWS_1251.decode_without_bom_handling(bytes);
    if text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\t' | '\r' | '\n'))
    {
        return Err(Error::Encoding(
            "input is neither UTF-8 nor Windows-1251 text".to_string(),
        ));
    }
    warn!("export is not UTF-8, decoded as Windows-1251");
    Ok((text.into_owned(), "windows-1251"))
}

/// Picks the most frequent of `,` `;` and tab in the header line.
pub fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    [b',', b';', b'\t']
        .into_iter()
        .max_by_key(|&candidate| {
            let count = header.bytes().filter(|&b| b == candidate).count();
            // Ties favour the comma.
            (count, candidate == b',')
        })
        .unwrap_or(b',')
}

fn find_column(headers: &csv::StringRecord, aliases: &[String]) -> Result<usize> {
    headers
        .iter()
        .position(|header| {
            let header = header.trim();
            aliases
                .iter()
                .any(|alias| alias.trim().to_lowercase() == header.to_lowercase())
        })
        .ok_or_else(|| Error::MissingColumn(aliases.join(" / ")))
}

/// Normalises a raw cell to a number. Blank cells count as zero.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed == "-"
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
    {
        return Some(0.0);
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    // Whichever separator comes last is the decimal mark.
    let normalized = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(_), None) if compact.matches(',').count() == 1 => compact.replace(',', "."),
        (Some(_), None) => compact.replace(',', ""),
        (None, Some(_)) if compact.matches('.').count() > 1 => compact.replace('.', ""),
        (None, _) => compact,
    };

    normalized.parse::<f64>().ok().filter(|value| value.is_finite())
}
