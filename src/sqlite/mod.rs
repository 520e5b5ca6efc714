// SQLite session layer
//
// - config: session options and the entry point that opens a connection
// - connection: the single-handle session (DDL, pragmas, transactions, scans)
// - prepared: one compiled INSERT/UPDATE borrowed from a session
// - params / query: value conversion in both directions
// - result_code: engine result codes and their descriptions

pub mod config;
pub mod connection;
pub mod params;
pub mod prepared;
pub mod query;
pub mod result_code;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::{ConnectionStatus, SqliteConnection, TxStatus};
pub use prepared::{SqlitePreparedStatement, StatementStatus};
pub use result_code::ResultCode;
