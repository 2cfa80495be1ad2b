//! Business-calendar helpers.
//!
//! Sales, payments and vouchers are dated on the Buenos Aires calendar
//! regardless of where the server runs. A UTC server clock crossing
//! midnight must not move a voucher into the next business day.

use chrono::{NaiveDate, Utc};
use chrono_tz::America::Argentina::Buenos_Aires;

/// Returns today's date on the Buenos Aires business calendar.
#[must_use]
pub fn business_date_today() -> NaiveDate {
    Utc::now().with_timezone(&Buenos_Aires).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_business_date_is_plausible() {
        // Buenos Aires is UTC-3, so the business date is either the UTC
        // date or the day before, never ahead of it.
        let utc_today = Utc::now().date_naive();
        let local = business_date_today();
        let diff = utc_today.num_days_from_ce() - local.num_days_from_ce();
        assert!((0..=1).contains(&diff));
    }
}
