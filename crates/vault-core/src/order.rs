//! # Order Confirmation
//!
//! The synthetic receipt shown after a simulated order completes.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::pricing::CartTotals;

/// Confirmation for a placed order.
///
/// ## Fields
/// - `order_number`: six digits, zero padded, derived from `order_id`
/// - `estimated_delivery`: placement date + delivery days
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    #[ts(as = "String")]
    pub order_id: Uuid,
    pub order_number: String,
    pub email: String,
    #[ts(as = "String")]
    pub placed_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub estimated_delivery: NaiveDate,
    pub totals: CartTotals,
}

impl OrderConfirmation {
    pub fn new(
        order_id: Uuid,
        email: impl Into<String>,
        placed_at: DateTime<Utc>,
        totals: CartTotals,
        delivery_days: i64,
    ) -> Self {
        OrderConfirmation {
            order_id,
            order_number: order_number(&order_id),
            email: email.into(),
            placed_at,
            estimated_delivery: estimate_delivery(placed_at.date_naive(), delivery_days),
            totals,
        }
    }
}

/// `from + days`, pinned to the calendar's end instead of overflowing.
pub fn estimate_delivery(from: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| from.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Six-digit display number taken from the leading bytes of the order id.
pub fn order_number(order_id: &Uuid) -> String {
    let bytes = order_id.as_bytes();
    let seed = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    format!("{:06}", seed % 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_number_is_six_digits() {
        assert_eq!(order_number(&Uuid::nil()), "000000");

        let id = Uuid::parse_str("ffffffff-0000-4000-8000-000000000000").unwrap();
        // 4294967295 % 1_000_000
        assert_eq!(order_number(&id), "967295");

        for _ in 0..50 {
            let n = order_number(&Uuid::new_v4());
            assert_eq!(n.len(), 6);
            assert!(n.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_estimated_delivery_crosses_month() {
        let placed = Utc.with_ymd_and_hms(2026, 1, 28, 23, 30, 0).unwrap();
        let confirmation =
            OrderConfirmation::new(Uuid::new_v4(), "ada@b.co", placed, CartTotals::default(), 7);

        assert_eq!(
            confirmation.estimated_delivery,
            NaiveDate::from_ymd_opt(2026, 2, 4).unwrap()
        );
        assert_eq!(confirmation.email, "ada@b.co");
    }

    #[test]
    fn test_far_delivery_estimate_does_not_overflow() {
        let placed = Utc.with_ymd_and_hms(2026, 1, 28, 12, 0, 0).unwrap();
        let confirmation = OrderConfirmation::new(
            Uuid::new_v4(),
            "ada@b.co",
            placed,
            CartTotals::default(),
            1_000_000_000,
        );

        assert_eq!(confirmation.estimated_delivery, NaiveDate::MAX);
        assert_eq!(estimate_delivery(placed.date_naive(), i64::MIN), NaiveDate::MIN);
    }
}
