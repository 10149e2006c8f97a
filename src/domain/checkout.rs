//! The checkout decision: given the cart lines read inside a storage
//! transaction, either reject the whole cart or produce the exact write
//! set the store must apply. Keeping this free of storage concerns lets
//! every backend share one set of rules.

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{CartLine, UnavailableLine};

/// The write set of an accepted checkout: one snapshot line per cart
/// line, plus the order total computed from the same read.
#[derive(Debug, Clone)]
pub struct CheckoutPlan {
    pub total_amount: BigDecimal,
    pub lines: Vec<PlannedLine>,
}

#[derive(Debug, Clone)]
pub struct PlannedLine {
    pub item_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Decide a checkout in two phases: first check every line against the
/// stock read in the same snapshot, then price the cart. A single short
/// line rejects the whole cart, with one report entry per short line, so
/// partial fulfillment cannot happen by construction.
pub fn plan_checkout(lines: &[CartLine]) -> Result<CheckoutPlan, DomainError> {
    if lines.is_empty() {
        return Err(DomainError::EmptyCart);
    }

    let unavailable: Vec<UnavailableLine> = lines
        .iter()
        .filter(|line| line.quantity > line.stock)
        .map(|line| UnavailableLine {
            item_id: line.item_id,
            name: line.name.clone(),
            requested: line.quantity,
            available: line.stock,
        })
        .collect();
    if !unavailable.is_empty() {
        return Err(DomainError::InsufficientStock(unavailable));
    }

    let mut total_amount = BigDecimal::from(0);
    let mut planned = Vec::with_capacity(lines.len());
    for line in lines {
        total_amount += &line.unit_price * BigDecimal::from(line.quantity);
        planned.push(PlannedLine {
            item_id: line.item_id,
            quantity: line.quantity,
            unit_price: line.unit_price.clone(),
        });
    }

    Ok(CheckoutPlan {
        total_amount,
        lines: planned,
    })
}

/// Customer-facing order token: `CA-<epoch millis>-<8 uppercase hex>`.
/// Collisions are ruled out by the unique constraint on the orders table,
/// not by this generator.
pub fn generate_tracking_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!(
        "CA-{}-{}",
        Utc::now().timestamp_millis(),
        hex[..8].to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn line(name: &str, quantity: i32, unit_price: &str, stock: i32) -> CartLine {
        CartLine {
            item_id: Uuid::new_v4(),
            name: name.to_string(),
            quantity,
            unit_price: dec(unit_price),
            stock,
        }
    }

    #[test]
    fn empty_cart_is_rejected() {
        assert!(matches!(plan_checkout(&[]), Err(DomainError::EmptyCart)));
    }

    #[test]
    fn available_cart_is_priced_from_the_same_read() {
        let lines = vec![line("Tea", 3, "4.50", 5), line("Samosa", 2, "1.25", 10)];

        let plan = plan_checkout(&lines).unwrap();

        assert_eq!(plan.total_amount, dec("16.00"));
        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.lines[0].item_id, lines[0].item_id);
        assert_eq!(plan.lines[0].quantity, 3);
        assert_eq!(plan.lines[0].unit_price, dec("4.50"));
    }

    #[test]
    fn quantity_equal_to_stock_is_available() {
        let lines = vec![line("Tea", 5, "4.50", 5)];

        let plan = plan_checkout(&lines).unwrap();

        assert_eq!(plan.total_amount, dec("22.50"));
    }

    #[test]
    fn one_short_line_rejects_the_whole_cart() {
        let lines = vec![line("Tea", 3, "4.50", 5), line("Cake", 4, "6.00", 1)];

        match plan_checkout(&lines) {
            Err(DomainError::InsufficientStock(report)) => {
                assert_eq!(report.len(), 1);
                assert_eq!(report[0].item_id, lines[1].item_id);
                assert_eq!(report[0].name, "Cake");
                assert_eq!(report[0].requested, 4);
                assert_eq!(report[0].available, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn report_lists_every_short_line_and_only_those() {
        let lines = vec![
            line("Tea", 6, "4.50", 5),
            line("Samosa", 2, "1.25", 10),
            line("Cake", 1, "6.00", 0),
        ];

        match plan_checkout(&lines) {
            Err(DomainError::InsufficientStock(report)) => {
                let reported: Vec<Uuid> = report.iter().map(|entry| entry.item_id).collect();
                assert_eq!(reported, vec![lines[0].item_id, lines[2].item_id]);
                assert_eq!(report[1].available, 0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[test]
    fn tracking_id_has_prefix_timestamp_and_hex_suffix() {
        let id = generate_tracking_id();
        let parts: Vec<&str> = id.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "CA");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn consecutive_tracking_ids_differ() {
        assert_ne!(generate_tracking_id(), generate_tracking_id());
    }
}
