//! Database row structs, one module per table.

pub mod cart_item;
pub mod category;
pub mod item;
pub mod order;
pub mod order_line;
pub mod user;

pub use cart_item::{CartItem, NewCartItem};
pub use category::{Category, NewCategory};
pub use item::{Item, NewItem};
pub use order::{NewOrder, Order};
pub use order_line::{NewOrderLine, OrderLine};
pub use user::{NewUser, User};
