//! Date lookup over a freshly fetched set of sheet rows.

use chrono::{Local, NaiveDate};

use crate::date::{DateFormat, canonical, display_day_first, parse_record_date};
use crate::error::LookupError;
use crate::types::{DatedRecord, LookupResult, NotFoundPlaceholder};

/// Find the record for `raw_target_date`, or today when no date is given.
///
/// Fails only when `raw_target_date` does not parse under `format`. Rows with
/// a missing or unparseable date are skipped.
pub fn find_entry_for_date(
    records: Vec<DatedRecord>,
    raw_target_date: Option<&str>,
    format: DateFormat,
) -> Result<LookupResult, LookupError> {
    find_entry_for_date_on(records, raw_target_date, format, Local::now().date_naive())
}

/// Same as [`find_entry_for_date`] with an explicit "today".
pub fn find_entry_for_date_on(
    records: Vec<DatedRecord>,
    raw_target_date: Option<&str>,
    format: DateFormat,
    today: NaiveDate,
) -> Result<LookupResult, LookupError> {
    let query_date = match raw_target_date {
        Some(raw) => format.parse(raw)?,
        None => today,
    };
    let query = canonical(query_date);

    if let Some(record) = records
        .into_iter()
        .find(|record| record_matches(record, &query))
    {
        return Ok(LookupResult::Found(record));
    }

    let display_date = match raw_target_date {
        Some(raw) => raw.to_string(),
        None => display_day_first(today),
    };
    tracing::debug!("No record for {}, returning placeholder", query);

    Ok(LookupResult::NotFound(NotFoundPlaceholder::for_date(&display_date)))
}

fn record_matches(record: &DatedRecord, query: &str) -> bool {
    let Some(raw) = record.date() else {
        return false;
    };
    match parse_record_date(raw) {
        Some(date) => canonical(date) == query,
        None => {
            tracing::debug!("Skipping record with malformed date {:?}", raw);
            false
        }
    }
}
