//! Primary `SQLite` result codes and their human-readable descriptions.

/// Primary result codes reported by the engine.
///
/// Extended codes are folded into their primary code (`code & 0xff`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok,
    Error,
    Internal,
    Perm,
    Abort,
    Busy,
    Locked,
    NoMem,
    ReadOnly,
    Interrupt,
    IoErr,
    Corrupt,
    NotFound,
    Full,
    CantOpen,
    Protocol,
    Empty,
    Schema,
    TooBig,
    Constraint,
    Mismatch,
    Misuse,
    NoLfs,
    Auth,
    Format,
    Range,
    NotADb,
    Row,
    Done,
}

impl ResultCode {
    /// Map a raw (possibly extended) result code.
    #[must_use]
    pub fn from_raw(code: i32) -> Option<Self> {
        let code = match code & 0xff {
            0 => Self::Ok,
            1 => Self::Error,
            2 => Self::Internal,
            3 => Self::Perm,
            4 => Self::Abort,
            5 => Self::Busy,
            6 => Self::Locked,
            7 => Self::NoMem,
            8 => Self::ReadOnly,
            9 => Self::Interrupt,
            10 => Self::IoErr,
            11 => Self::Corrupt,
            12 => Self::NotFound,
            13 => Self::Full,
            14 => Self::CantOpen,
            15 => Self::Protocol,
            16 => Self::Empty,
            17 => Self::Schema,
            18 => Self::TooBig,
            19 => Self::Constraint,
            20 => Self::Mismatch,
            21 => Self::Misuse,
            22 => Self::NoLfs,
            23 => Self::Auth,
            24 => Self::Format,
            25 => Self::Range,
            26 => Self::NotADb,
            100 => Self::Row,
            101 => Self::Done,
            _ => return None,
        };
        Some(code)
    }

    /// Result code carried by a `rusqlite` error, if any.
    #[must_use]
    pub fn from_rusqlite(err: &rusqlite::Error) -> Option<Self> {
        match err {
            rusqlite::Error::SqliteFailure(failure, _) => Self::from_raw(failure.extended_code),
            rusqlite::Error::ExecuteReturnedResults => Some(Self::Row),
            _ => None,
        }
    }

    /// Numeric primary code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Error => 1,
            Self::Internal => 2,
            Self::Perm => 3,
            Self::Abort => 4,
            Self::Busy => 5,
            Self::Locked => 6,
            Self::NoMem => 7,
            Self::ReadOnly => 8,
            Self::Interrupt => 9,
            Self::IoErr => 10,
            Self::Corrupt => 11,
            Self::NotFound => 12,
            Self::Full => 13,
            Self::CantOpen => 14,
            Self::Protocol => 15,
            Self::Empty => 16,
            Self::Schema => 17,
            Self::TooBig => 18,
            Self::Constraint => 19,
            Self::Mismatch => 20,
            Self::Misuse => 21,
            Self::NoLfs => 22,
            Self::Auth => 23,
            Self::Format => 24,
            Self::Range => 25,
            Self::NotADb => 26,
            Self::Row => 100,
            Self::Done => 101,
        }
    }

    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Ok => "SQLITE_OK: Successful result",
            Self::Error => "SQLITE_ERROR: SQL error or missing database",
            Self::Internal => "SQLITE_INTERNAL: Internal logic error in SQLite",
            Self::Perm => "SQLITE_PERM: Access permission denied",
            Self::Abort => "SQLITE_ABORT: Callback routine requested an abort",
            Self::Busy => "SQLITE_BUSY: The database file is locked",
            Self::Locked => "SQLITE_LOCKED: A table in the database is locked",
            Self::NoMem => "SQLITE_NOMEM: A malloc() failed",
            Self::ReadOnly => "SQLITE_READONLY: Attempt to write a readonly database",
            Self::Interrupt => "SQLITE_INTERRUPT: Operation terminated by sqlite3_interrupt()",
            Self::IoErr => "SQLITE_IOERR: Some kind of disk I/O error occurred",
            Self::Corrupt => "SQLITE_CORRUPT: The database disk image is malformed",
            Self::NotFound => "SQLITE_NOTFOUND: Unknown opcode or table or record not found",
            Self::Full => "SQLITE_FULL: Insertion failed because database is full",
            Self::CantOpen => "SQLITE_CANTOPEN: Unable to open the database file",
            Self::Protocol => "SQLITE_PROTOCOL: Database lock protocol error",
            Self::Empty => "SQLITE_EMPTY: Database is empty",
            Self::Schema => "SQLITE_SCHEMA: The database schema changed",
            Self::TooBig => "SQLITE_TOOBIG: String or BLOB exceeds size limit",
            Self::Constraint => "SQLITE_CONSTRAINT: Abort due to constraint violation",
            Self::Mismatch => "SQLITE_MISMATCH: Data type mismatch",
            Self::Misuse => "SQLITE_MISUSE: Library used incorrectly",
            Self::NoLfs => "SQLITE_NOLFS: Uses OS features not supported on host",
            Self::Auth => "SQLITE_AUTH: Authorization denied",
            Self::Format => "SQLITE_FORMAT: Auxiliary database format error",
            Self::Range => "SQLITE_RANGE: 2nd parameter to sqlite3_bind out of range",
            Self::NotADb => "SQLITE_NOTADB: File opened that is not a database file",
            Self::Row => "SQLITE_ROW: sqlite3_step() has another row ready",
            Self::Done => "SQLITE_DONE: sqlite3_step() has finished executing",
        }
    }

    /// Codes after which continuing to write through the session is pointless.
    #[must_use]
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            Self::NoMem
                | Self::IoErr
                | Self::Corrupt
                | Self::Full
                | Self::CantOpen
                | Self::NotADb
                | Self::Misuse
        )
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}
