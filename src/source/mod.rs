pub mod record;
pub mod table;
pub mod timestamp;

pub use record::{load_records, save_records, LogRecord, RecordError};
pub use table::{CsvTable, TableError};
pub use timestamp::TimestampError;
