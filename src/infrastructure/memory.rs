//! In-memory order store for tests and local tooling.
//!
//! It answers to the same trait as the PostgreSQL repository; one lock
//! guards the whole state, so a checkout is a single atomic unit by
//! construction and a rejected checkout can never leave partial writes.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::checkout::{generate_tracking_id, plan_checkout};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CartLine, OrderDetails, OrderLineView, OrderStatus, OrderSummary, PlacedOrder,
};
use crate::domain::ports::OrderRepository;

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    state: Arc<RwLock<State>>,
}

#[derive(Default)]
struct State {
    items: HashMap<Uuid, ItemRecord>,
    carts: HashMap<Uuid, Vec<CartRecord>>,
    orders: Vec<OrderRecord>,
}

#[derive(Debug, Clone, PartialEq)]
struct ItemRecord {
    name: String,
    image_url: Option<String>,
    price: BigDecimal,
    stock: i32,
}

#[derive(Debug, Clone, PartialEq)]
struct CartRecord {
    item_id: Uuid,
    quantity: i32,
}

#[derive(Debug, Clone)]
struct OrderRecord {
    id: Uuid,
    user_id: Uuid,
    tracking_id: String,
    total_amount: BigDecimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    lines: Vec<LineRecord>,
}

#[derive(Debug, Clone)]
struct LineRecord {
    item_id: Uuid,
    quantity: i32,
    unit_price: BigDecimal,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_item(&self, name: &str, price: BigDecimal, stock: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.write().items.insert(
            id,
            ItemRecord {
                name: name.to_string(),
                image_url: None,
                price,
                stock,
            },
        );
        id
    }

    /// Upserts one cart line, mirroring the per-user/per-item uniqueness
    /// the database schema enforces.
    pub fn set_cart_line(&self, user_id: Uuid, item_id: Uuid, quantity: i32) {
        let mut state = self.write();
        let cart = state.carts.entry(user_id).or_default();
        match cart.iter_mut().find(|line| line.item_id == item_id) {
            Some(line) => line.quantity = quantity,
            None => cart.push(CartRecord { item_id, quantity }),
        }
    }

    pub fn stock_of(&self, item_id: Uuid) -> Option<i32> {
        self.read().items.get(&item_id).map(|item| item.stock)
    }

    pub fn cart_of(&self, user_id: Uuid) -> Vec<(Uuid, i32)> {
        self.read()
            .carts
            .get(&user_id)
            .map(|cart| {
                cart.iter()
                    .map(|line| (line.item_id, line.quantity))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn order_count(&self) -> usize {
        self.read().orders.len()
    }
}

impl OrderRepository for MemoryOrderStore {
    fn checkout(&self, user_id: Uuid) -> Result<PlacedOrder, DomainError> {
        let mut state = self.write();

        let cart = state.carts.get(&user_id).cloned().unwrap_or_default();
        let mut lines = Vec::with_capacity(cart.len());
        for entry in &cart {
            let item = state.items.get(&entry.item_id).ok_or_else(|| {
                DomainError::Storage(format!("cart references unknown item {}", entry.item_id))
            })?;
            lines.push(CartLine {
                item_id: entry.item_id,
                name: item.name.clone(),
                quantity: entry.quantity,
                unit_price: item.price.clone(),
                stock: item.stock,
            });
        }

        let plan = plan_checkout(&lines)?;

        let order_id = Uuid::new_v4();
        let tracking_id = generate_tracking_id();
        for line in &plan.lines {
            if let Some(item) = state.items.get_mut(&line.item_id) {
                item.stock -= line.quantity;
            }
        }
        state.orders.push(OrderRecord {
            id: order_id,
            user_id,
            tracking_id: tracking_id.clone(),
            total_amount: plan.total_amount.clone(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            lines: plan
                .lines
                .iter()
                .map(|line| LineRecord {
                    item_id: line.item_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price.clone(),
                })
                .collect(),
        });
        state.carts.remove(&user_id);

        Ok(PlacedOrder {
            id: order_id,
            tracking_id,
            total_amount: plan.total_amount,
            status: OrderStatus::Pending,
        })
    }

    fn history(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, DomainError> {
        // Orders are appended in commit order, so reverse iteration is
        // newest first even when timestamps collide.
        Ok(self
            .read()
            .orders
            .iter()
            .rev()
            .filter(|order| order.user_id == user_id)
            .map(|order| OrderSummary {
                id: order.id,
                tracking_id: order.tracking_id.clone(),
                total_amount: order.total_amount.clone(),
                status: order.status,
                created_at: order.created_at,
            })
            .collect())
    }

    fn find_for_user(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<OrderDetails>, DomainError> {
        let state = self.read();
        let Some(order) = state
            .orders
            .iter()
            .find(|order| order.id == order_id && order.user_id == user_id)
        else {
            return Ok(None);
        };

        let mut lines = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let item = state.items.get(&line.item_id).ok_or_else(|| {
                DomainError::Storage(format!("order references unknown item {}", line.item_id))
            })?;
            lines.push(OrderLineView {
                item_id: line.item_id,
                name: item.name.clone(),
                image_url: item.image_url.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price.clone(),
            });
        }

        Ok(Some(OrderDetails {
            id: order.id,
            tracking_id: order.tracking_id.clone(),
            total_amount: order.total_amount.clone(),
            status: order.status,
            created_at: order.created_at,
            lines,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Barrier;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn snapshot(store: &MemoryOrderStore) -> (HashMap<Uuid, ItemRecord>, HashMap<Uuid, Vec<CartRecord>>) {
        let state = store.read();
        (state.items.clone(), state.carts.clone())
    }

    #[test]
    fn checkout_decrements_stock_and_clears_the_cart() {
        let store = MemoryOrderStore::new();
        let user_id = Uuid::new_v4();
        let tea = store.add_item("Masala Chai", dec("4.50"), 5);
        store.set_cart_line(user_id, tea, 3);

        let placed = store.checkout(user_id).unwrap();

        assert_eq!(placed.total_amount, dec("13.50"));
        assert_eq!(placed.status, OrderStatus::Pending);
        assert!(placed.tracking_id.starts_with("CA-"));
        assert_eq!(store.stock_of(tea), Some(2));
        assert!(store.cart_of(user_id).is_empty());
        assert_eq!(store.order_count(), 1);
    }

    #[test]
    fn checkout_total_sums_every_line() {
        let store = MemoryOrderStore::new();
        let user_id = Uuid::new_v4();
        let tea = store.add_item("Masala Chai", dec("4.50"), 5);
        let samosa = store.add_item("Samosa", dec("1.25"), 10);
        store.set_cart_line(user_id, tea, 2);
        store.set_cart_line(user_id, samosa, 4);

        let placed = store.checkout(user_id).unwrap();

        assert_eq!(placed.total_amount, dec("14.00"));
    }

    #[test]
    fn empty_cart_checkout_creates_no_order() {
        let store = MemoryOrderStore::new();
        let user_id = Uuid::new_v4();

        assert!(matches!(
            store.checkout(user_id),
            Err(DomainError::EmptyCart)
        ));
        assert_eq!(store.order_count(), 0);
    }

    #[test]
    fn rejected_checkout_leaves_state_identical() {
        let store = MemoryOrderStore::new();
        let user_id = Uuid::new_v4();
        let tea = store.add_item("Masala Chai", dec("4.50"), 5);
        let cake = store.add_item("Honey Cake", dec("6.00"), 1);
        store.set_cart_line(user_id, tea, 3);
        store.set_cart_line(user_id, cake, 4);
        let before = snapshot(&store);

        match store.checkout(user_id) {
            Err(DomainError::InsufficientStock(report)) => {
                assert_eq!(report.len(), 1);
                assert_eq!(report[0].item_id, cake);
                assert_eq!(report[0].requested, 4);
                assert_eq!(report[0].available, 1);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(snapshot(&store), before);
        assert_eq!(store.order_count(), 0);
    }

    #[test]
    fn two_contended_checkouts_allow_exactly_one_winner() {
        let store = MemoryOrderStore::new();
        let tea = store.add_item("Masala Chai", dec("4.50"), 5);
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        store.set_cart_line(user_a, tea, 5);
        store.set_cart_line(user_b, tea, 5);

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [user_a, user_b]
            .into_iter()
            .map(|user_id| {
                let store = store.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    store.checkout(user_id)
                })
            })
            .collect();
        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("checkout thread panicked"))
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        match results.iter().find(|r| r.is_err()) {
            Some(Err(DomainError::InsufficientStock(report))) => {
                assert_eq!(report[0].requested, 5);
                assert_eq!(report[0].available, 0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(store.stock_of(tea), Some(0));
        assert_eq!(store.order_count(), 1);
    }

    #[test]
    fn hammered_item_never_goes_negative() {
        let store = MemoryOrderStore::new();
        let tea = store.add_item("Masala Chai", dec("4.50"), 10);
        let users: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
        for (i, user_id) in users.iter().enumerate() {
            store.set_cart_line(*user_id, tea, (i % 4 + 1) as i32);
        }

        let barrier = Arc::new(Barrier::new(users.len()));
        let handles: Vec<_> = users
            .iter()
            .map(|user_id| {
                let store = store.clone();
                let barrier = Arc::clone(&barrier);
                let user_id = *user_id;
                std::thread::spawn(move || {
                    barrier.wait();
                    store.checkout(user_id)
                })
            })
            .collect();

        let sold: i32 = handles
            .into_iter()
            .map(|h| h.join().expect("checkout thread panicked"))
            .zip(users.iter().enumerate())
            .filter(|(result, _)| result.is_ok())
            .map(|(_, (i, _))| (i % 4 + 1) as i32)
            .sum();

        let remaining = store.stock_of(tea).unwrap();
        assert!(remaining >= 0);
        assert_eq!(remaining, 10 - sold);
    }

    #[test]
    fn history_is_newest_first_and_scoped_to_the_user() {
        let store = MemoryOrderStore::new();
        let user_id = Uuid::new_v4();
        let other_user = Uuid::new_v4();
        let tea = store.add_item("Masala Chai", dec("4.50"), 10);

        store.set_cart_line(user_id, tea, 1);
        let first = store.checkout(user_id).unwrap();
        store.set_cart_line(user_id, tea, 2);
        let second = store.checkout(user_id).unwrap();

        let history = store.history(user_id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1].id, first.id);

        assert!(store.history(other_user).unwrap().is_empty());
    }

    #[test]
    fn details_carry_snapshot_prices_and_live_names() {
        let store = MemoryOrderStore::new();
        let user_id = Uuid::new_v4();
        let tea = store.add_item("Masala Chai", dec("4.50"), 5);
        store.set_cart_line(user_id, tea, 2);

        let placed = store.checkout(user_id).unwrap();
        let details = store.find_for_user(user_id, placed.id).unwrap().unwrap();

        assert_eq!(details.total_amount, dec("9.00"));
        assert_eq!(details.lines.len(), 1);
        assert_eq!(details.lines[0].name, "Masala Chai");
        assert_eq!(details.lines[0].unit_price, dec("4.50"));
        assert_eq!(details.lines[0].quantity, 2);

        assert!(store
            .find_for_user(Uuid::new_v4(), placed.id)
            .unwrap()
            .is_none());
    }
}
