use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Storefront;
use crate::domain::aggregates::{Order, ReturnDocument, ReturnDraft, ReturnItem};
use crate::domain::events::{DomainEvent, ReturnEvent};
use crate::domain::value_objects::Money;
use crate::storage::StorageKey;
use crate::validation::{FormSchema, ReturnHeaderForm, ReturnItemForm};
use crate::{Result, StorefrontError};

const NO_ORDERS: &str = "No previous orders found. Place an order before requesting a return.";

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousOrder {
    pub order_id: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub item_count: usize,
    pub total: Money,
}

impl From<&Order> for PreviousOrder {
    fn from(order: &Order) -> Self {
        Self { order_id: order.order_id.clone(), submitted_at: order.submitted_at, item_count: order.line_items().len(), total: order.totals.total }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnDraftView {
    pub items: Vec<ReturnItem>,
    pub previous_orders: Vec<PreviousOrder>,
}

impl Storefront {
    async fn load_draft(&self) -> Result<ReturnDraft> { Ok(ReturnDraft::new(self.store.load_collection(StorageKey::ReturnsDraft).await?)) }

    async fn save_draft(&self, draft: &ReturnDraft) -> Result<()> { Ok(self.store.save_collection(StorageKey::ReturnsDraft, draft.items()).await?) }

    /// Previous orders, or a conflict when none exist yet.
    async fn orders_for_return(&self) -> Result<Vec<Order>> {
        let orders = self.previous_orders().await?;
        if orders.is_empty() { return Err(StorefrontError::Conflict(NO_ORDERS.to_string())); }
        Ok(orders)
    }

    async fn draft_view(&self, draft: ReturnDraft) -> Result<ReturnDraftView> {
        let previous_orders = self.previous_orders().await?.iter().map(PreviousOrder::from).collect();
        Ok(ReturnDraftView { items: draft.into_items(), previous_orders })
    }

    pub async fn return_draft(&self) -> Result<ReturnDraftView> {
        let draft = self.load_draft().await?;
        self.draft_view(draft).await
    }

    pub async fn add_return_item(&self, form: ReturnItemForm) -> Result<ReturnDraftView> {
        self.orders_for_return().await?;
        form.check()?;

        let _guard = self.write().await;
        let catalog = self.catalog().await?;
        let mut draft = self.load_draft().await?;
        let item = ReturnItem::describe(&form.product_id, &form.reason, form.quantity(), &catalog);
        tracing::info!(product_id = %item.product_id, qty = item.qty, "return item added");
        draft.push(item);
        self.save_draft(&draft).await?;
        self.draft_view(draft).await
    }

    pub async fn remove_return_item(&self, index: usize) -> Result<ReturnDraftView> {
        let _guard = self.write().await;
        let mut draft = self.load_draft().await?;
        draft.remove(index)?;
        self.save_draft(&draft).await?;
        self.draft_view(draft).await
    }

    /// Replaces the draft with every line of a previous order.
    pub async fn draft_from_order(&self, order_id: &str) -> Result<ReturnDraftView> {
        let orders = self.orders_for_return().await?;
        let order = orders.iter().find(|o| o.order_id == order_id).ok_or(StorefrontError::NotFound("Order"))?;

        let _guard = self.write().await;
        let mut draft = self.load_draft().await?;
        draft.fill_from_order(order);
        self.save_draft(&draft).await?;
        tracing::info!(order_id, items = draft.items().len(), "return draft filled from order");
        self.draft_view(draft).await
    }

    /// Submits the draft, keeps it in the return history and clears it.
    pub async fn submit_return(&self, header: ReturnHeaderForm) -> Result<ReturnDocument> {
        self.orders_for_return().await?;
        header.check()?;

        let _guard = self.write().await;
        let draft = self.load_draft().await?;
        let document = ReturnDocument::submit(&header.return_email, header.effective_order_number(), &draft, Utc::now())?;

        let mut history: Vec<ReturnDocument> = self.store.load_collection(StorageKey::ReturnHistory).await?;
        history.push(document.clone());
        self.store.save_collection(StorageKey::ReturnHistory, &history).await?;
        self.store.remove(StorageKey::ReturnsDraft).await?;

        tracing::info!(order_number = %document.order_number, items = document.items.len(), "return submitted");
        self.sync.publish(vec![DomainEvent::Return(ReturnEvent::Submitted { document: document.clone() })]);
        Ok(document)
    }

    pub async fn return_history(&self) -> Result<Vec<ReturnDocument>> { Ok(self.store.load_collection(StorageKey::ReturnHistory).await?) }
}
