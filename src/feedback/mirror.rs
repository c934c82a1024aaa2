//! Spreadsheet mirror of the feedback table.
//!
//! The mirror is a single-sheet .xlsx file kept for humans who never open the
//! database. Appending means reading every existing row, pushing one, and
//! rewriting the whole file, which is O(history) per submission and only
//! acceptable because feedback volume is low. All file access is funneled
//! through one writer task consuming a channel, so two in-flight submissions
//! can never interleave their read-modify-write cycles.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use time::macros::{format_description, offset};
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const SHEET_NAME: &str = "Feedback";
const HEADERS: [&str; 5] = ["Name", "Email", "Rating", "Message", "Date"];
// Display widths only; nothing reads them back.
const COLUMN_WIDTHS: [f64; 5] = [15.0, 25.0, 8.0, 40.0, 20.0];

/// One row of the mirror sheet. The date is pre-rendered: the sheet stores a
/// localized display string, not a typed timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorRow {
    pub name: String,
    pub email: String,
    pub rating: i64,
    pub message: String,
    pub date: String,
}

/// Renders a timestamp the way the sheet displays it, fixed to IST (+05:30).
pub fn mirror_timestamp(now: OffsetDateTime) -> String {
    let local = now.to_offset(offset!(+5:30));
    let format = format_description!(
        "[day]/[month]/[year], [hour repr:12 padding:none]:[minute]:[second] [period case:lower]"
    );
    local.format(&format).unwrap_or_else(|_| local.to_string())
}

/// Reads every data row of the mirror sheet. A missing, unreadable, or
/// malformed file yields an empty table so the next write starts fresh
/// instead of failing the submission.
pub fn load_rows(path: &Path) -> Vec<MirrorRow> {
    let mut workbook: Xlsx<_> = match open_workbook(path) {
        Ok(wb) => wb,
        Err(_) => return Vec::new(),
    };
    let range = match workbook.worksheet_range(SHEET_NAME) {
        Ok(r) => r,
        Err(_) => return Vec::new(),
    };

    range
        .rows()
        .skip(1) // header
        .map(|cells| MirrorRow {
            name: cell_text(cells.first()),
            email: cell_text(cells.get(1)),
            rating: cell_int(cells.get(2)),
            message: cell_text(cells.get(3)),
            date: cell_text(cells.get(4)),
        })
        .collect()
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Float(f)) => f.to_string(),
        Some(Data::Int(i)) => i.to_string(),
        _ => String::new(),
    }
}

fn cell_int(cell: Option<&Data>) -> i64 {
    match cell {
        Some(Data::Int(i)) => *i,
        Some(Data::Float(f)) => *f as i64,
        Some(Data::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Rewrites the whole mirror file from the given rows.
pub fn save_rows(path: &Path, rows: &[MirrorRow]) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &row.name)?;
        sheet.write_string(r, 1, &row.email)?;
        sheet.write_number(r, 2, row.rating as f64)?;
        sheet.write_string(r, 3, &row.message)?;
        sheet.write_string(r, 4, &row.date)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("write mirror file {}", path.display()))?;
    Ok(())
}

/// Read-append-rewrite cycle for one row. Returns the new row count.
pub fn append_row(path: &Path, row: MirrorRow) -> anyhow::Result<usize> {
    let mut rows = load_rows(path);
    rows.push(row);
    save_rows(path, &rows)?;
    Ok(rows.len())
}

/// Handle to the single mirror writer task. Submissions enqueue their row
/// after the database insert succeeds; the writer applies appends strictly
/// in order. `pending` is the mirror-sync lag: rows acked to clients but not
/// yet on disk.
#[derive(Clone)]
pub struct MirrorHandle {
    tx: mpsc::UnboundedSender<MirrorRow>,
    pending: Arc<AtomicU64>,
}

impl MirrorHandle {
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicU64::new(0));
        tokio::spawn(run_writer(path, rx, pending.clone()));
        Self { tx, pending }
    }

    pub fn enqueue(&self, row: MirrorRow) -> anyhow::Result<()> {
        self.pending.fetch_add(1, Ordering::SeqCst);
        self.tx.send(row).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            anyhow::anyhow!("mirror writer is not running")
        })
    }

    /// Number of rows acked to clients but not yet written to the file.
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::SeqCst)
    }
}

async fn run_writer(
    path: PathBuf,
    mut rx: mpsc::UnboundedReceiver<MirrorRow>,
    pending: Arc<AtomicU64>,
) {
    info!(path = %path.display(), "feedback mirror writer started");
    while let Some(row) = rx.recv().await {
        let file = path.clone();
        let result = tokio::task::spawn_blocking(move || append_row(&file, row)).await;
        pending.fetch_sub(1, Ordering::SeqCst);
        match result {
            Ok(Ok(total)) => debug!(total, "mirror row appended"),
            // The database kept the entry; the sheet is now behind it.
            Ok(Err(e)) => error!(error = %e, "mirror append failed, mirror has drifted"),
            Err(e) => error!(error = %e, "mirror append task failed"),
        }
    }
    info!("feedback mirror writer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn row(name: &str, rating: i64) -> MirrorRow {
        MirrorRow {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            rating,
            message: "solid experience overall".into(),
            date: mirror_timestamp(OffsetDateTime::now_utc()),
        }
    }

    #[test]
    fn missing_file_loads_as_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.xlsx");
        assert!(load_rows(&path).is_empty());
    }

    #[test]
    fn unreadable_file_loads_as_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.xlsx");
        std::fs::write(&path, b"this is not a spreadsheet").unwrap();
        assert!(load_rows(&path).is_empty());
    }

    #[test]
    fn append_then_load_roundtrips_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.xlsx");

        let original = MirrorRow {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            rating: 4,
            message: "hello there".into(),
            date: "27/08/2026, 1:05:09 pm".into(),
        };
        append_row(&path, original.clone()).unwrap();

        let rows = load_rows(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], original);
    }

    #[test]
    fn sequential_appends_grow_by_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.xlsx");

        for i in 1usize..=4 {
            let total = append_row(&path, row("Ann", ((i % 5) + 1) as i64)).unwrap();
            assert_eq!(total, i);
            assert_eq!(load_rows(&path).len(), i);
        }
    }

    #[test]
    fn append_over_garbage_starts_a_fresh_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.xlsx");
        std::fs::write(&path, b"corrupted").unwrap();

        append_row(&path, row("Bo", 5)).unwrap();
        let rows = load_rows(&path);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Bo");
    }

    #[test]
    fn timestamp_is_rendered_in_ist() {
        let formatted = mirror_timestamp(datetime!(2026-08-27 07:35:09 UTC));
        // 07:35 UTC is 13:05 at +05:30.
        assert_eq!(formatted, "27/08/2026, 1:05:09 pm");
    }

    #[tokio::test]
    async fn writer_serializes_concurrent_enqueues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.xlsx");
        let handle = MirrorHandle::spawn(path.clone());

        handle.enqueue(row("Ann", 5)).unwrap();
        handle.enqueue(row("Bo", 3)).unwrap();

        for _ in 0..200 {
            if handle.pending() == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(handle.pending(), 0);

        let rows = load_rows(&path);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Ann");
        assert_eq!(rows[1].name, "Bo");
    }
}
