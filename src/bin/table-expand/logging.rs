use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::writer::MakeWriter;

/// Where `table-expand` sends its log lines. Stdout is left to the JSON report.
#[derive(Clone)]
pub(crate) enum LogTarget {
    Stderr,
    /// `--log <file>`: every line goes to the file only.
    File(Arc<Mutex<File>>),
}

impl LogTarget {
    pub(crate) fn from_arg(path: Option<&PathBuf>) -> io::Result<Self> {
        match path {
            Some(path) => Ok(Self::File(Arc::new(Mutex::new(File::create(path)?)))),
            None => Ok(Self::Stderr),
        }
    }
}

impl<'a> MakeWriter<'a> for LogTarget {
    type Writer = LogLine<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            Self::Stderr => LogLine::Stderr(io::stderr()),
            Self::File(file) => LogLine::File(lock(file)),
        }
    }
}

/// One event's worth of output; the file stays locked until the event is written.
pub(crate) enum LogLine<'a> {
    Stderr(io::Stderr),
    File(MutexGuard<'a, File>),
}

fn lock(file: &Mutex<File>) -> MutexGuard<'_, File> {
    file.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl Write for LogLine<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stderr(out) => out.write(buf),
            Self::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stderr(out) => out.flush(),
            Self::File(file) => file.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    #[test]
    fn log_file_receives_the_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let target = LogTarget::from_arg(Some(&path)).unwrap();
        assert!(matches!(target, LogTarget::File(_)));

        target.make_writer().write_all(b"expand_table started\n").unwrap();
        target.make_writer().flush().unwrap();

        let mut text = String::new();
        File::open(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "expand_table started\n");
    }

    #[test]
    fn no_log_file_means_stderr() {
        assert!(matches!(LogTarget::from_arg(None).unwrap(), LogTarget::Stderr));
    }
}
