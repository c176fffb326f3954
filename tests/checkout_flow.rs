use std::sync::Arc;

use campus_storefront::services::{AddToCart, CheckoutRequest, Storefront};
use campus_storefront::storage::{DocumentStore, MemoryStorage, Storage, StorageKey};
use campus_storefront::sync::SyncBridge;
use campus_storefront::validation::{BillingForm, ProductForm, ReturnHeaderForm, ReturnItemForm, ShippingForm, ShopperForm, SignupForm};
use campus_storefront::StorefrontError;

async fn storefront() -> Storefront {
    Storefront::open(DocumentStore::in_memory(), SyncBridge::disabled()).await.unwrap()
}

fn product_form(id: &str, desc: &str, price: &str, weight: &str) -> ProductForm {
    ProductForm {
        product_id: id.into(),
        product_description: desc.into(),
        product_category: "Computers & Accessories".into(),
        product_subcategory: "Keyboards & Mice".into(),
        product_unit: "each".into(),
        product_price: price.into(),
        product_weight: weight.into(),
    }
}

fn checkout_request(carrier: &str, method: &str, card: &str) -> CheckoutRequest {
    CheckoutRequest {
        shipping: ShippingForm {
            address: "123 College Ave".into(),
            city: "State College".into(),
            state: "PA".into(),
            zip_code: "16801".into(),
            shipping_carrier: carrier.into(),
            shipping_method: method.into(),
            special_instructions: "Leave at the desk".into(),
        },
        billing: BillingForm {
            cardholder_name: "Nittany Lion".into(),
            card_number: card.into(),
            expiry_date: "12/40".into(),
            cvv: "123".into(),
            ..BillingForm::default()
        },
    }
}

async fn place_sample_order(s: &Storefront) -> String {
    s.save_product(product_form("100", "Wireless mouse", "25.00", "2.00")).await.unwrap();
    s.add_to_cart(AddToCart { product_id: "100".into(), quantity: 1 }).await.unwrap();
    s.place_order(checkout_request("FedEx", "Ground", "1111 1111 1111 1111")).await.unwrap().order_id
}

#[tokio::test]
async fn checkout_totals_and_clears_cart() {
    let s = storefront().await;
    s.save_product(product_form("100", "Wireless mouse", "25.00", "2.00")).await.unwrap();
    s.add_to_cart(AddToCart { product_id: "100".into(), quantity: 2 }).await.unwrap();
    let cart = s.add_to_cart(AddToCart { product_id: "100".into(), quantity: 1 }).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.totals.item_count, 3);
    assert_eq!(cart.totals.total_price.to_string(), "75.00");
    assert_eq!(cart.totals.total_weight.to_string(), "6.00");

    let order = s.place_order(checkout_request("UPS", "Ground", "4111 1111 1111 1111")).await.unwrap();
    assert_eq!(order.totals.subtotal.to_string(), "75.00");
    assert_eq!(order.totals.shipping.to_string(), "11.48");
    assert_eq!(order.totals.total.to_string(), "86.48");
    assert_eq!(order.billing.billing_city, "State College");
    assert_eq!(order.special_instructions, "Leave at the desk");
    assert!(!order.test_mode);

    assert!(s.cart().await.unwrap().items.is_empty());
    assert_eq!(s.current_order().await.unwrap().unwrap().order_id, order.order_id);
    assert_eq!(s.order_history().await.unwrap().len(), 1);
}

#[tokio::test]
async fn checkout_with_empty_cart_conflicts() {
    let s = storefront().await;
    let err = s.place_order(checkout_request("DHL", "Overnight", "1111111111111111")).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Conflict(_)));
}

#[tokio::test]
async fn checkout_reports_field_errors() {
    let s = storefront().await;
    let mut request = checkout_request("USPS", "Ground", "4111 1111 1111 1112");
    request.shipping.zip_code = "1234".into();
    let StorefrontError::Validation(errors) = s.place_order(request).await.unwrap_err() else { panic!("expected validation errors") };
    assert!(errors.get("zipCode").is_some());
    assert!(errors.get("shippingCarrier").is_some());
    assert!(errors.get("cardNumber").is_some());
}

#[tokio::test]
async fn signed_in_email_lands_on_order() {
    let s = storefront().await;
    let user = s
        .signup(SignupForm {
            username: "nittany".into(),
            email: "lion@psu.edu".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            terms: true,
        })
        .await
        .unwrap();
    assert!(user.id.is_none());
    assert_eq!(s.current_user().await.unwrap().unwrap().email, "lion@psu.edu");

    place_sample_order(&s).await;
    assert_eq!(s.current_order().await.unwrap().unwrap().shopper.email, "lion@psu.edu");
}

#[tokio::test]
async fn product_upsert_keeps_one_record() {
    let s = storefront().await;
    let (first, _) = s.save_product(product_form("200", "USB hub", "19.99", "")).await.unwrap();
    let (second, _) = s.save_product(product_form("200", "USB hub, 7 port", "21.99", "")).await.unwrap();
    let products = s.products().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].product_description, "USB hub, 7 port");
    assert_eq!(second.created_at, first.created_at);
}

#[tokio::test]
async fn returns_rejected_until_an_order_exists() {
    let s = storefront().await;
    let item = ReturnItemForm { product_id: "100".into(), reason: "Defective".into(), qty: "1".into() };
    assert!(matches!(s.add_return_item(item).await.unwrap_err(), StorefrontError::Conflict(_)));
}

#[tokio::test]
async fn return_from_previous_order() {
    let s = storefront().await;
    let order_id = place_sample_order(&s).await;

    let view = s.draft_from_order(&order_id).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].reason, "Selected from previous order");
    assert_eq!(view.previous_orders.len(), 1);

    let view = s.add_return_item(ReturnItemForm { product_id: "999".into(), reason: "Wrong item".into(), qty: "2".into() }).await.unwrap();
    assert_eq!(view.items[1].product_desc, "(Unknown / not in current product list)");
    let view = s.remove_return_item(1).await.unwrap();
    assert_eq!(view.items.len(), 1);

    let document = s
        .submit_return(ReturnHeaderForm { return_email: "lion@psu.edu".into(), order_number: String::new(), selected_order: order_id.clone() })
        .await
        .unwrap();
    assert_eq!(document.order_number, order_id);
    assert_eq!(s.return_history().await.unwrap().len(), 1);
    assert!(s.return_draft().await.unwrap().items.is_empty());
}

#[tokio::test]
async fn empty_return_conflicts() {
    let s = storefront().await;
    let order_id = place_sample_order(&s).await;
    let header = ReturnHeaderForm { return_email: "lion@psu.edu".into(), order_number: order_id, selected_order: String::new() };
    assert!(matches!(s.submit_return(header).await.unwrap_err(), StorefrontError::Conflict(_)));
}

#[tokio::test]
async fn shopper_registration_and_search() {
    let s = storefront().await;
    let form = ShopperForm {
        shopper_name: "Grace Hopper".into(),
        shopper_email: "grace@navy.mil".into(),
        shopper_phone_number: "814-555-0100".into(),
        shopper_age: "45".into(),
        shopper_address: "1 Compiler Court".into(),
        terms: true,
    };
    s.register_shopper(form.clone()).await.unwrap();
    assert_eq!(s.search_shoppers("hopper").await.unwrap().len(), 1);
    assert!(s.search_shoppers("turing").await.unwrap().is_empty());
    assert!(matches!(s.search_shoppers(" ").await.unwrap_err(), StorefrontError::Validation(_)));

    let StorefrontError::Validation(errors) = s.register_shopper(ShopperForm { terms: false, ..form }).await.unwrap_err() else { panic!("expected validation errors") };
    assert!(errors.get("terms").is_some());
}

#[tokio::test]
async fn corrupt_storage_reads_as_empty() {
    let backend = Arc::new(MemoryStorage::new());
    backend.set(StorageKey::ShoppingCart.as_str(), "[{broken").await.unwrap();
    backend.set(StorageKey::Products.as_str(), "not json").await.unwrap();
    let s = Storefront::open(DocumentStore::new(backend), SyncBridge::disabled()).await.unwrap();
    assert!(s.cart().await.unwrap().items.is_empty());
    assert!(s.products().await.unwrap().is_empty());
}

#[tokio::test]
async fn lines_without_weight_stay_readable() {
    let line = r#"{"productId":"2","productDescription":"USB Hub","productCategory":"Office Tech","productPrice":15,"productWeight":null,"quantity":1,"addedAt":"2025-03-01T10:00:00.000Z"}"#;
    let backend = Arc::new(MemoryStorage::new());
    backend
        .set(StorageKey::ShoppingCart.as_str(), &format!(r#"[{{"productId":"1","productDescription":"Webcam","productPrice":49.99,"productWeight":1.5,"quantity":1}},{line}]"#))
        .await
        .unwrap();
    backend
        .set(StorageKey::OrderHistory.as_str(), &format!(r#"[{{"orderId":"ORD-1","cart":{{"items":[{line}]}},"items":[{line}]}}]"#))
        .await
        .unwrap();
    let s = Storefront::open(DocumentStore::new(backend), SyncBridge::disabled()).await.unwrap();

    let cart = s.cart().await.unwrap();
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.totals.total_price.to_string(), "64.99");
    assert_eq!(s.order_history().await.unwrap().len(), 1);
    assert_eq!(s.return_draft().await.unwrap().previous_orders.len(), 1);
}

#[tokio::test]
async fn one_bad_record_keeps_the_others() {
    let backend = Arc::new(MemoryStorage::new());
    backend
        .set(StorageKey::Products.as_str(), r#"[{"productId":"1","productDescription":"Webcam","productPrice":"25.00"},{"productId":"2","productDescription":"Hub","productPrice":null}]"#)
        .await
        .unwrap();
    backend
        .set(StorageKey::OrderHistory.as_str(), r#"[{"orderId":"ORD-1","items":[]},{"orderId":"ORD-2","cart":{"items":[]}}]"#)
        .await
        .unwrap();
    let s = Storefront::open(DocumentStore::new(backend), SyncBridge::disabled()).await.unwrap();

    assert_eq!(s.products().await.unwrap().len(), 1);
    assert_eq!(s.order_history().await.unwrap().len(), 2);
    let cart = s.add_to_cart(AddToCart { product_id: "1".into(), quantity: 1 }).await.unwrap();
    assert_eq!(cart.items.len(), 1);
}
