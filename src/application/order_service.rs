use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{OrderDetails, OrderSummary, PlacedOrder};
use crate::domain::ports::OrderRepository;

/// Handlers depend on this alias so every wiring (PostgreSQL in the
/// binary, the in-memory store in tests) goes through the same type.
pub type SharedOrderService = OrderService<Arc<dyn OrderRepository>>;

impl OrderRepository for Arc<dyn OrderRepository> {
    fn checkout(&self, user_id: Uuid) -> Result<PlacedOrder, DomainError> {
        self.as_ref().checkout(user_id)
    }

    fn history(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, DomainError> {
        self.as_ref().history(user_id)
    }

    fn find_for_user(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<OrderDetails>, DomainError> {
        self.as_ref().find_for_user(user_id, order_id)
    }
}

pub struct OrderService<R> {
    repo: R,
}

impl SharedOrderService {
    pub fn shared(repo: impl OrderRepository) -> Self {
        OrderService::new(Arc::new(repo) as Arc<dyn OrderRepository>)
    }
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn checkout(&self, user_id: Uuid) -> Result<PlacedOrder, DomainError> {
        self.repo.checkout(user_id)
    }

    pub fn order_history(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, DomainError> {
        self.repo.history(user_id)
    }

    pub fn order_details(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<OrderDetails>, DomainError> {
        self.repo.find_for_user(user_id, order_id)
    }
}
