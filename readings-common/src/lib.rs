//! Shared model and date lookup for the daily readings service.

pub mod date;
pub mod error;
pub mod lookup;
pub mod types;

pub use date::DateFormat;
pub use error::LookupError;
pub use lookup::{find_entry_for_date, find_entry_for_date_on};
pub use types::{ContentField, DatedRecord, LookupResult, NotFoundPlaceholder};
