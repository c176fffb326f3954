//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;
pub mod returns;
pub mod shopper;

pub use product::{Catalog, CatalogError, Product, UpsertOutcome};
pub use order::{Carrier, Order, OrderError, ShippingMethod, ShippingQuote, UNKNOWN_SHOPPER_EMAIL};
pub use cart::{Cart, CartDocument, CartError, CartItem, CartTotals};
pub use returns::{ReturnDocument, ReturnDraft, ReturnError, ReturnItem};
pub use shopper::{CurrentUser, Shopper};
