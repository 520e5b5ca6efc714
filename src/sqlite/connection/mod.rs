mod admin;
mod core;
mod ddl;
mod dml;
mod prepared;
mod select;
mod tx;

pub use self::core::{ConnectionStatus, SqliteConnection, TxStatus};
