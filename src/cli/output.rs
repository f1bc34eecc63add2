//! Rendering of results as aligned tables, JSON or CSV.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use gnet::models::{
    CapFeed, Feature, HistoryProperties, IntensityResponse, QuakeFeature, QuakeHistory,
    QuakeProperties, QuakeResponse, QuakeStats, StrongMotionResponse, VolcanoAlerts,
};
use serde::Serialize;

use super::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns.
    Table,
    /// Pretty-printed JSON.
    Json,
    /// Comma-separated values.
    Csv,
}

/// Values that can be laid out as rows of text cells.
pub trait Tabular {
    fn headers(&self) -> Vec<&'static str>;
    fn rows(&self) -> Vec<Vec<String>>;
}

/// Where and how results are written.
#[derive(Debug)]
pub struct Output {
    format: OutputFormat,
    path: Option<PathBuf>,
}

impl Output {
    pub fn new(format: OutputFormat, path: Option<PathBuf>) -> Self {
        Self { format, path }
    }

    pub fn emit<T: Serialize + Tabular>(&self, value: &T) -> Result<(), CliError> {
        let rows = value.rows();
        if rows.is_empty() {
            eprintln!("No results found.");
        }

        let text = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Table => render_table(&value.headers(), &rows),
            OutputFormat::Csv => render_csv(&value.headers(), &rows),
        };
        self.write(&text)
    }

    /// Writes a document verbatim, whatever the format.
    pub fn emit_raw(&self, text: &str) -> Result<(), CliError> {
        self.write(text.trim_end())
    }

    fn write(&self, text: &str) -> Result<(), CliError> {
        match &self.path {
            Some(path) => {
                std::fs::write(path, format!("{text}\n"))?;
                eprintln!("Wrote {}", path.display());
            }
            None => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{text}")?;
            }
        }
        Ok(())
    }
}

/// Left-aligned columns separated by two spaces, with a dashed rule under the header.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let cell = |value: &str| -> String {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell(value).chars().count());
            }
        }
    }

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![
        line(headers.iter().map(|h| h.to_string()).collect()),
        line(widths.iter().map(|w| "-".repeat(*w)).collect()),
    ];
    lines.extend(rows.iter().map(|row| line(row.iter().map(|v| cell(v)).collect())));
    lines.join("\n")
}

/// CSV with RFC 4180 quoting.
pub fn render_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut lines = vec![csv_record(headers.iter().copied())];
    lines.extend(rows.iter().map(|row| csv_record(row.iter().map(String::as_str))));
    lines.join("\n")
}

fn csv_record<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells.map(csv_field).collect::<Vec<_>>().join(",")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn quake_row(quake: &Feature<QuakeProperties>) -> Vec<String> {
    let p = &quake.properties;
    vec![
        p.public_id.clone(),
        timestamp(&p.time),
        format!("{:.1}", p.magnitude),
        format!("{:.1}", p.depth),
        opt(p.mmi),
        p.locality.clone(),
        p.quality.to_string(),
    ]
}

const QUAKE_HEADERS: [&str; 7] = [
    "ID",
    "Time",
    "Magnitude",
    "Depth (km)",
    "MMI",
    "Locality",
    "Quality",
];

impl Tabular for QuakeResponse {
    fn headers(&self) -> Vec<&'static str> {
        QUAKE_HEADERS.to_vec()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.iter().map(quake_row).collect()
    }
}

impl Tabular for QuakeFeature {
    fn headers(&self) -> Vec<&'static str> {
        QUAKE_HEADERS.to_vec()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![quake_row(self)]
    }
}

impl Tabular for QuakeHistory {
    fn headers(&self) -> Vec<&'static str> {
        vec![
            "ID", "Time", "Modified", "Magnitude", "Type", "Depth (km)", "MMI", "Quality",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|revision| {
                let p: &HistoryProperties = &revision.properties;
                vec![
                    p.public_id.clone(),
                    timestamp(&p.time),
                    opt(p.modification_time.as_ref().map(timestamp)),
                    format!("{:.2}", p.magnitude),
                    opt(p.magnitude_type.as_deref()),
                    format!("{:.1}", p.depth),
                    opt(p.mmi),
                    opt(p.quality),
                ]
            })
            .collect()
    }
}

impl Tabular for QuakeStats {
    fn headers(&self) -> Vec<&'static str> {
        vec!["Window", "Magnitude", "Count"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let counts = &self.magnitude_count;
        [
            ("7 days", &counts.days7),
            ("28 days", &counts.days28),
            ("365 days", &counts.days365),
        ]
        .into_iter()
        .flat_map(|(window, buckets)| {
            buckets
                .iter()
                .map(move |(magnitude, count)| {
                    vec![window.to_string(), magnitude.clone(), count.to_string()]
                })
        })
        .collect()
    }
}

impl Tabular for IntensityResponse {
    fn headers(&self) -> Vec<&'static str> {
        vec!["Longitude", "Latitude", "MMI", "Reports"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.features
            .iter()
            .map(|f| {
                vec![
                    format!("{:.3}", f.geometry.longitude),
                    format!("{:.3}", f.geometry.latitude),
                    f.properties.mmi.to_string(),
                    opt(f.properties.count),
                ]
            })
            .collect()
    }
}

impl Tabular for VolcanoAlerts {
    fn headers(&self) -> Vec<&'static str> {
        vec!["Volcano", "Name", "Level", "Aviation", "Activity", "Hazards"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.iter()
            .map(|f| {
                let p = &f.properties;
                vec![
                    p.volcano_id.clone(),
                    p.volcano_title.clone(),
                    p.level.to_string(),
                    p.acc.clone(),
                    p.activity.clone(),
                    opt(p.hazards.as_deref()),
                ]
            })
            .collect()
    }
}

impl Tabular for StrongMotionResponse {
    fn headers(&self) -> Vec<&'static str> {
        vec![
            "Station", "Network", "Location", "Distance (km)", "MMI", "PGA H", "PGA V", "PGV H",
            "PGV V",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let fixed = |v: Option<f64>| opt(v.map(|v| format!("{v:.2}")));
        self.features
            .iter()
            .map(|f| {
                let p = &f.properties;
                vec![
                    p.station.clone(),
                    p.network.clone(),
                    p.location.clone(),
                    fixed(p.distance),
                    fixed(p.mmi),
                    fixed(p.pga_horizontal),
                    fixed(p.pga_vertical),
                    fixed(p.pgv_horizontal),
                    fixed(p.pgv_vertical),
                ]
            })
            .collect()
    }
}

impl Tabular for CapFeed {
    fn headers(&self) -> Vec<&'static str> {
        vec!["ID", "Title", "Published", "Updated", "Link"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.entries
            .iter()
            .map(|entry| {
                vec![
                    entry.id.clone(),
                    entry.title.clone(),
                    timestamp(&entry.published),
                    timestamp(&entry.updated),
                    opt(entry.link.as_deref()),
                ]
            })
            .collect()
    }
}

/// Result of `quake health`.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub base_url: String,
    pub status: &'static str,
    pub latency_ms: u64,
}

impl Tabular for HealthReport {
    fn headers(&self) -> Vec<&'static str> {
        vec!["API", "Status", "Latency (ms)"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![
            self.base_url.clone(),
            self.status.to_string(),
            self.latency_ms.to_string(),
        ]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_table_alignment() {
        let table = render_table(
            &["ID", "Locality"],
            &rows(&[&["2016p858000", "Culverden"], &["x", ""]]),
        );

        let expected = "\
ID           Locality
-----------  ---------
2016p858000  Culverden
x            -";
        assert_eq!(table, expected);
    }

    #[test]
    fn test_csv_quoting() {
        let csv = render_csv(
            &["ID", "Locality"],
            &rows(&[
                &["a", "5 km north of Taupo, NZ"],
                &["b", "the \"big\" one"],
                &["c", ""],
            ]),
        );

        let expected = "\
ID,Locality
a,\"5 km north of Taupo, NZ\"
b,\"the \"\"big\"\" one\"
c,";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_stats_rows() {
        let stats: QuakeStats = serde_json::from_str(
            r#"{"magnitudeCount": {"days7": {"2": 5}, "days28": {}, "days365": {"2": 90, "3": 9}},
                "rate": {"perDay": {}}}"#,
        )
        .unwrap();

        assert_eq!(
            stats.rows(),
            rows(&[&["7 days", "2", "5"], &["365 days", "2", "90"], &["365 days", "3", "9"]])
        );
    }
}
