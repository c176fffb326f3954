//! Domain events raised by local writes and mirrored to the remote API
use crate::domain::aggregates::{Order, Product, ReturnDocument};

#[derive(Clone, Debug)]
pub enum DomainEvent {
    Product(ProductEvent),
    Order(OrderEvent),
    Return(ReturnEvent),
}

#[derive(Clone, Debug)]
pub enum ProductEvent {
    Created { product: Product },
    Updated { product: Product },
    Deleted { product_id: String },
    Seeded { products: Vec<Product> },
}

#[derive(Clone, Debug)]
pub enum OrderEvent {
    Submitted { order: Order },
}

#[derive(Clone, Debug)]
pub enum ReturnEvent {
    Submitted { document: ReturnDocument },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Product(ProductEvent::Created { .. }) => "product.created",
            Self::Product(ProductEvent::Updated { .. }) => "product.updated",
            Self::Product(ProductEvent::Deleted { .. }) => "product.deleted",
            Self::Product(ProductEvent::Seeded { .. }) => "product.seeded",
            Self::Order(OrderEvent::Submitted { .. }) => "order.submitted",
            Self::Return(ReturnEvent::Submitted { .. }) => "return.submitted",
        }
    }
}
