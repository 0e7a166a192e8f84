use super::AuditError;
use chrono::{DateTime, Local};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One valued inventory change, as written to the drop log.
#[derive(Debug, Clone, PartialEq)]
pub struct DropEntry {
    pub timestamp: DateTime<Local>,
    pub name: String,
    /// Signed: positive for drops, negative for consumption.
    pub quantity: i64,
    pub unit_price: f64,
}

impl fmt::Display for DropEntry {
    // [2024-05-01 12:00:00] Drop: Flame Elementium x3 (1.25/each)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.quantity > 0 { "Drop" } else { "Consumed" };
        write!(
            f,
            "[{}] {}: {} x{} ({}/each)",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            verb,
            self.name,
            self.quantity.unsigned_abs(),
            format_unit_price(self.unit_price)
        )
    }
}

/// Unit price rounded to 3 decimals, always with a fractional part.
pub fn format_unit_price(price: f64) -> String {
    let rounded = (price * 1_000.0).round() / 1_000.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}

/// Append-only ground truth of every valued change.
pub trait AuditSink {
    fn record(&mut self, entry: &DropEntry) -> Result<(), AuditError>;
}

/// `drop.txt` next to the catalog, one line per change.
#[derive(Debug, Clone)]
pub struct DropLog {
    path: PathBuf,
}

impl DropLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for DropLog {
    fn record(&mut self, entry: &DropEntry) -> Result<(), AuditError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| AuditError::OpenFile {
                path: self.path.clone(),
                source,
            })?;
        writeln!(file, "{entry}").map_err(|source| AuditError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(quantity: i64, unit_price: f64) -> DropEntry {
        DropEntry {
            timestamp: Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            name: "Flame Elementium".to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn drop_and_consumed_lines() {
        assert_eq!(
            entry(3, 1.23456).to_string(),
            "[2024-05-01 12:00:00] Drop: Flame Elementium x3 (1.235/each)"
        );
        assert_eq!(
            entry(-2, 4.0).to_string(),
            "[2024-05-01 12:00:00] Consumed: Flame Elementium x2 (4.0/each)"
        );
    }

    #[test]
    fn drop_log_appends_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut log = DropLog::new(dir.path().join("drop.txt"));

        log.record(&entry(1, 0.5)).unwrap();
        log.record(&entry(-1, 0.5)).unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("Drop: Flame Elementium x1 (0.5/each)"));
        assert!(lines[1].ends_with("Consumed: Flame Elementium x1 (0.5/each)"));
    }
}
