use std::path::PathBuf;

use clap::Parser;
use sql_expander::{
    ExpandJob, JobFile, JobParams, JournalMode, SqlExpanderError, SqlType, SqliteOptions, SyncMode,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Expand [lo, hi] ranges of a SQLite table into one row per index value"
)]
pub(crate) struct Args {
    /// JSON job file; replaces the positional parameters and column flags
    #[arg(long, conflicts_with_all = ["params", "copy", "expand"])]
    pub(crate) job: Option<PathBuf>,
    /// DB_PATH SOURCE_TABLE TARGET_TABLE LOWER_BOUND_COLUMN UPPER_BOUND_COLUMN INDEX_COLUMN
    #[arg(value_name = "PARAM")]
    pub(crate) params: Vec<String>,
    /// Column copied into every expanded row, as NAME:TYPE (TYPE is INTEGER, REAL or TEXT)
    #[arg(long = "copy", value_name = "NAME:TYPE", value_parser = parse_copy_column)]
    pub(crate) copy: Vec<(String, SqlType)>,
    /// Column divided evenly across the expanded rows
    #[arg(long = "expand", value_name = "NAME")]
    pub(crate) expand: Vec<String>,
    #[arg(long)]
    pub(crate) verbose: bool,
    /// Synchronous mode during the bulk insert (default off)
    #[arg(long, value_enum)]
    pub(crate) sync: Option<SyncMode>,
    /// Journal mode during the bulk insert
    #[arg(long, value_enum)]
    pub(crate) journal: Option<JournalMode>,
    /// Continue ids after the largest id in this table
    #[arg(long)]
    pub(crate) seed_ids_from: Option<String>,
    /// Index the rid column of the target table
    #[arg(long)]
    pub(crate) index_rid: bool,
    /// Write log lines to this file instead of stderr
    #[arg(long)]
    pub(crate) log: Option<PathBuf>,
}

impl Args {
    /// Resolve the job and session options; flags override a job file's options.
    pub(crate) fn build_job(&self) -> Result<(ExpandJob, SqliteOptions), SqlExpanderError> {
        let (mut job, mut opts) = match &self.job {
            Some(path) => JobFile::load(path)?.into_job()?,
            None => {
                let params = JobParams::from_slice(self.params.as_slice())?;
                let (names, types): (Vec<String>, Vec<SqlType>) =
                    self.copy.iter().cloned().unzip();
                let job = ExpandJob::new(params, &names, &types, &self.expand)?;
                (job, SqliteOptions::default())
            }
        };

        opts.verbose |= self.verbose;
        if let Some(mode) = self.sync {
            opts.bulk_sync = mode;
        }
        if self.journal.is_some() {
            opts.bulk_journal_mode = self.journal;
        }
        if let Some(table) = &self.seed_ids_from {
            job = job.with_id_seed(table.clone())?;
        }
        if self.index_rid {
            job = job.with_rid_index(true);
        }
        Ok((job, opts))
    }
}

fn parse_copy_column(value: &str) -> Result<(String, SqlType), String> {
    let (name, ty) = value
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:TYPE, got '{value}'"))?;
    let ty = ty.parse::<SqlType>().map_err(|err| err.to_string())?;
    Ok((name.trim().to_string(), ty))
}
