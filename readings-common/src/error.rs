use thiserror::Error;

use crate::date::DateFormat;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The query date did not match the deployment's external format
    #[error("Invalid date format. Use {expected}.")]
    InvalidDateFormat { expected: DateFormat },
}
