//! Shared domain types.

mod cart;
mod checkout;
mod notification;
mod order;
mod product;

pub use cart::CartItem;
pub use checkout::{Checkout, CheckoutLineEdge, CheckoutLineItem, CheckoutLines, CheckoutVariant, Money, ProductRef};
pub use notification::{NotificationKind, PushNotification};
pub use order::{Order, OrderStatus, PaymentMethod};
pub use product::{CollectionRef, Product, SaleFields, sale_fields};
