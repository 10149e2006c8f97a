use uuid::Uuid;

use super::errors::DomainError;
use super::order::{OrderDetails, OrderSummary, PlacedOrder};

/// Store-side contract for the order workflows.
///
/// `checkout` must run its read-check-write sequence as one atomic unit:
/// either every effect (order row, snapshot lines, stock decrements, cart
/// removal) is applied, or none of them are. Callers rely on a failed
/// checkout leaving the store exactly as it found it.
pub trait OrderRepository: Send + Sync + 'static {
    fn checkout(&self, user_id: Uuid) -> Result<PlacedOrder, DomainError>;

    /// All orders of `user_id`, newest first.
    fn history(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, DomainError>;

    /// A single order with its lines, only if it belongs to `user_id`.
    fn find_for_user(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<OrderDetails>, DomainError>;
}
