use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::error::SqlExpanderError;
use crate::results::ScanRow;
use crate::sqlite::prepared::SqlitePreparedStatement;
use crate::types::{RowValues, ScanControl};

use super::schema::RowLayout;

/// Counters gathered while expanding one source table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpandStats {
    /// Rows handed to the transform by the scan.
    pub source_rows: u64,
    /// Rows inserted into the target table.
    pub emitted_rows: u64,
    /// Index values the engine would not bind or insert; the expansion went on with the next.
    pub failed_steps: u64,
    /// Source rows whose lower bound exceeded the upper bound.
    pub inverted_ranges: u64,
    /// Source rows with a NULL or non-numeric bound, or a range too wide to count.
    pub skipped_rows: u64,
    pub first_id: Option<u64>,
    pub last_id: Option<u64>,
}

/// Per-row callback of the source scan: binds each source row into the prepared INSERT and
/// steps it once per index value of the row's range.
pub struct ExpansionTransform<'a, 'conn> {
    stmt: &'a mut SqlitePreparedStatement<'conn>,
    layout: RowLayout,
    diag: Diagnostics,
    stats: ExpandStats,
    hard_error: Option<SqlExpanderError>,
}

/// What went wrong with a single source row.
enum RowFault {
    /// Report, count, move on.
    Skip(String),
    /// Stop the scan; the run fails.
    Halt(SqlExpanderError),
}

impl<'a, 'conn> ExpansionTransform<'a, 'conn> {
    pub fn new(stmt: &'a mut SqlitePreparedStatement<'conn>, layout: RowLayout) -> Self {
        let diag = stmt.connection().diagnostics().clone();
        Self {
            stmt,
            layout,
            diag,
            stats: ExpandStats::default(),
            hard_error: None,
        }
    }

    #[must_use]
    pub fn stats(&self) -> &ExpandStats {
        &self.stats
    }

    /// Expand one source row. Only a hard engine error (or a source row of the wrong shape)
    /// halts the scan.
    pub fn on_row(&mut self, row: &ScanRow) -> ScanControl {
        self.stats.source_rows += 1;
        match self.expand_row(row) {
            Ok(()) => ScanControl::Continue,
            Err(RowFault::Skip(reason)) => {
                self.stats.skipped_rows += 1;
                self.diag
                    .error(format_args!("[expand_table] Row skipped: {reason}"));
                tracing::warn!(reason = %reason, "source row skipped");
                ScanControl::Continue
            }
            Err(RowFault::Halt(err)) => {
                self.diag
                    .error(format_args!("[expand_table] Expansion halted: {err}"));
                self.hard_error = Some(err);
                ScanControl::Abort
            }
        }
    }

    /// Stats of the run, or the error that halted it.
    ///
    /// # Errors
    /// Returns the hard error recorded by [`ExpansionTransform::on_row`], if any.
    pub fn finish(self) -> Result<ExpandStats, SqlExpanderError> {
        match self.hard_error {
            Some(err) => Err(err),
            None => Ok(self.stats),
        }
    }

    /// Settle a scan driven by this transform. When the transform aborted the scan, the error
    /// that halted it takes the place of the bare `ScanAborted`.
    ///
    /// # Errors
    /// Returns the halting error, or the scan's own error.
    pub fn conclude(
        self,
        scanned: Result<usize, SqlExpanderError>,
    ) -> Result<ExpandStats, SqlExpanderError> {
        match scanned {
            Ok(_) => self.finish(),
            Err(err @ SqlExpanderError::ScanAborted { .. }) => {
                Err(self.finish().err().unwrap_or(err))
            }
            Err(err) => Err(err),
        }
    }

    fn expand_row(&mut self, row: &ScanRow) -> Result<(), RowFault> {
        if row.len() < self.layout.source_width() {
            return Err(RowFault::Halt(SqlExpanderError::ExecutionError(format!(
                "source row has {} column(s), expected {}",
                row.len(),
                self.layout.source_width()
            ))));
        }
        let rid = value_at(row, RowLayout::SOURCE_ID);
        let lo = value_at(row, RowLayout::SOURCE_LOWER).as_bound();
        let hi = value_at(row, RowLayout::SOURCE_UPPER).as_bound();

        let (Some(lo), Some(hi)) = (lo, hi) else {
            return Err(RowFault::Skip(format!(
                "rid {} has a NULL or non-numeric bound ({:?}, {:?})",
                display_value(rid),
                value_at(row, RowLayout::SOURCE_LOWER),
                value_at(row, RowLayout::SOURCE_UPPER)
            )));
        };
        if lo > hi {
            self.stats.inverted_ranges += 1;
            self.diag.error(format_args!(
                "[expand_table] Inverted range for rid {}: lower bound {lo} > upper bound {hi}. No rows written.",
                display_value(rid)
            ));
            tracing::warn!(rid = %display_value(rid), lo, hi, "inverted range");
            return Ok(());
        }
        let Some(width) = hi.checked_sub(lo).and_then(|d| d.checked_add(1)) else {
            return Err(RowFault::Skip(format!(
                "rid {} range [{lo}, {hi}] is too wide",
                display_value(rid)
            )));
        };

        self.bind_shared(row, rid, width).map_err(fault_for)?;

        for index in lo..=hi {
            self.insert_at(rid, index)?;
        }
        Ok(())
    }

    /// Bind everything that is the same for all rows of one range.
    #[allow(clippy::cast_precision_loss)]
    fn bind_shared(
        &mut self,
        row: &ScanRow,
        rid: &RowValues,
        width: i64,
    ) -> Result<(), SqlExpanderError> {
        match rid.as_bound() {
            Some(rid) => self.stmt.bind_int(RowLayout::PARAM_RID, rid)?,
            None => self.stmt.bind_value(RowLayout::PARAM_RID, rid)?,
        }

        for i in 0..self.layout.copy_count() {
            let value = value_at(row, self.layout.copy_source(i));
            self.stmt.bind_value(self.layout.copy_param(i), value)?;
        }

        let width = width as f64;
        for i in 0..self.layout.expand_count() {
            let param = self.layout.expand_param(i);
            let value = value_at(row, self.layout.expand_source(i));
            match value.as_real() {
                Some(total) => self.stmt.bind_real(param, total / width)?,
                None => {
                    if !value.is_null() {
                        self.diag.error(format_args!(
                            "[expand_table] rid {}: non-numeric value {value:?} in expand column {}; writing NULL.",
                            display_value(rid),
                            i + 1
                        ));
                    }
                    self.stmt.bind_null(param)?;
                }
            }
        }
        Ok(())
    }

    fn insert_at(&mut self, rid: &RowValues, index: i64) -> Result<(), RowFault> {
        let id = self.stmt.next_auto_id();
        let bound_id = i64::try_from(id).map_err(|_| {
            RowFault::Halt(SqlExpanderError::ExecutionError(format!(
                "auto id {id} exceeds the INTEGER range"
            )))
        })?;
        let stepped = self
            .stmt
            .bind_int(RowLayout::PARAM_ID, bound_id)
            .and_then(|()| self.stmt.bind_int(RowLayout::PARAM_INDEX, index))
            .and_then(|()| self.stmt.step());

        match stepped {
            Ok(()) => {
                self.stats.emitted_rows += 1;
                self.stats.first_id.get_or_insert(id);
                self.stats.last_id = Some(id);
                Ok(())
            }
            Err(err) if err.is_hard_engine_error() => Err(RowFault::Halt(err)),
            Err(err) => {
                self.stats.failed_steps += 1;
                self.diag.error(format_args!(
                    "[expand_table] Step error for rid {} at index {index}: {err}",
                    display_value(rid)
                ));
                Ok(())
            }
        }
    }
}

fn fault_for(err: SqlExpanderError) -> RowFault {
    if err.is_hard_engine_error() {
        RowFault::Halt(err)
    } else {
        RowFault::Skip(err.to_string())
    }
}

static NULL: RowValues = RowValues::Null;

fn value_at(row: &ScanRow, idx: usize) -> &RowValues {
    row.get_by_index(idx).unwrap_or(&NULL)
}

fn display_value(value: &RowValues) -> String {
    match value {
        RowValues::Int(i) => i.to_string(),
        RowValues::Float(f) => f.to_string(),
        RowValues::Text(s) => s.clone(),
        RowValues::Null => "NULL".into(),
        RowValues::Blob(bytes) => format!("<{} byte blob>", bytes.len()),
    }
}
