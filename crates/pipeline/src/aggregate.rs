use rust_decimal::Decimal;

use crate::model::{LogicalRecord, TotalRecord};
use crate::normalize::round_amount;

/// Sum the amounts of `records` into a `TotalRecord`.
///
/// Absent amounts count as zero. Only the total is returned: the records are
/// not touched and the caller already holds the slice it passed in, so
/// `(records, aggregate(records))` is the record set plus its total.
/// Callers run this on the filtered set so the total tracks what is shown.
///
/// A sum past the decimal range saturates at `Decimal::MAX` / `Decimal::MIN`.
pub fn aggregate(records: &[LogicalRecord]) -> TotalRecord {
    let mut sum = Decimal::ZERO;
    let mut saturated = false;
    for amount in records.iter().filter_map(|r| r.total_amount) {
        sum = match sum.checked_add(amount) {
            Some(next) => next,
            None => {
                saturated = true;
                if amount.is_sign_negative() { Decimal::MIN } else { Decimal::MAX }
            }
        };
    }
    if saturated {
        log::warn!("total of {} records overflowed; saturated at {}", records.len(), sum);
    }
    TotalRecord { total_amount: round_amount(sum) }
}
