//! Perfdata input: rotating the live file and loading it into records.
//!
//! The live file is copied aside with [`copy_aside`], the copy is read with
//! [`PerfdataFile`], and the live file is emptied with [`truncate_source`]
//! once the report built from it is ready.

mod file;
mod record;
mod rotate;

pub use file::{read_records, PerfdataFile};
pub use record::{RawRecord, COLUMN_COUNT};
pub use rotate::{copy_aside, truncate_source, Snapshot};
