//! Batch extraction over a row range.
//!
//! Output position `i` always corresponds to row `start + i`. The header row
//! gets a [`RowLink::header`] placeholder without consulting the source, so
//! the sequence lines up with spreadsheet row numbers whatever the range start.
use crate::error::LinkReportError;
use crate::extractor::extract_row;
use crate::extractor::RowLink;
use crate::layout::ColumnLayout;
use crate::spreadsheet::TabularSource;
use crate::spreadsheet::XlsxSource;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Rows read between cooperative yields to the runtime
pub const YIELD_EVERY: usize = 256;

#[derive(Error, Debug)]
pub enum RangeError {
    #[error("Invalid row range {start}..{end}: start must be less than end")]
    InvalidRange { start: usize, end: usize },

    #[error("Range read cancelled at row {row}")]
    Cancelled { row: usize },
}

/// Cancellation flag shared between a range read and whoever may abort it.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn check_range(start: usize, end: usize) -> Result<(), RangeError> {
    if start >= end {
        Err(RangeError::InvalidRange { start, end })
    } else {
        Ok(())
    }
}

fn read_row<S: TabularSource + ?Sized>(source: &S, layout: &ColumnLayout, row: usize) -> RowLink {
    if layout.is_header_row(row) {
        RowLink::header()
    } else {
        extract_row(source, layout, row)
    }
}

/// Appends rows `start..end` to `links`, checking `cancel` before each row.
fn collect_rows<S: TabularSource + ?Sized>(
    source: &S,
    layout: &ColumnLayout,
    start: usize,
    end: usize,
    cancel: &CancelToken,
    links: &mut Vec<RowLink>,
) -> Result<(), RangeError> {
    for row in start..end {
        if cancel.is_cancelled() {
            return Err(RangeError::Cancelled { row });
        }
        links.push(read_row(source, layout, row));
    }
    Ok(())
}

/// Capacity for a read of `start..end`, bounded by the rows the source holds.
fn initial_capacity<S: TabularSource + ?Sized>(source: &S, start: usize, end: usize) -> usize {
    (end - start).min(source.row_count().saturating_sub(start) + 1)
}

/// Reads rows `start..end` (end exclusive) in ascending order.
///
/// Fails with [`RangeError::InvalidRange`] when `start >= end`, and with
/// [`RangeError::Cancelled`] when `cancel` fires; in both cases no partial
/// output is returned.
pub async fn read_range<S: TabularSource + ?Sized>(
    source: &S,
    layout: &ColumnLayout,
    start: usize,
    end: usize,
    cancel: &CancelToken,
) -> Result<Vec<RowLink>, LinkReportError> {
    check_range(start, end)?;
    let mut links = Vec::with_capacity(initial_capacity(source, start, end));
    let mut batch_start = start;
    while batch_start < end {
        let batch_end = batch_start.saturating_add(YIELD_EVERY).min(end);
        collect_rows(source, layout, batch_start, batch_end, cancel, &mut links)?;
        batch_start = batch_end;
        if batch_start < end {
            tokio::task::yield_now().await;
        }
    }
    debug!(start, end, rows = links.len(), "read row range");
    Ok(links)
}

fn read_range_blocking<S: TabularSource + ?Sized>(
    source: &S,
    layout: &ColumnLayout,
    start: usize,
    end: usize,
    cancel: &CancelToken,
) -> Result<Vec<RowLink>, LinkReportError> {
    let mut links = Vec::with_capacity(initial_capacity(source, start, end));
    collect_rows(source, layout, start, end, cancel, &mut links)?;
    Ok(links)
}

/// Opens the workbook at `path` on a blocking worker, reads `start..end`, and
/// closes it again. The range is validated before the file is touched.
pub async fn read_range_from_file<P: Into<PathBuf>>(
    path: P,
    layout: ColumnLayout,
    start: usize,
    end: usize,
    cancel: CancelToken,
) -> Result<Vec<RowLink>, LinkReportError> {
    check_range(start, end)?;
    let path = path.into();
    let links = tokio::task::spawn_blocking(move || {
        let source = XlsxSource::open(&path)?;
        read_range_blocking(&source, &layout, start, end, &cancel)
    })
    .await??;
    debug!(start, end, rows = links.len(), "read row range from file");
    Ok(links)
}
