use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use campus_storefront::routes;
use campus_storefront::services::Storefront;
use campus_storefront::storage::DocumentStore;
use campus_storefront::sync::SyncBridge;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let storefront = Storefront::open(DocumentStore::in_memory(), SyncBridge::disabled()).await.unwrap();
    routes::router(Arc::new(storefront))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder.header("content-type", "application/json").body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, json)
}

fn product(id: &str, description: &str, price: Value) -> Value {
    json!({
        "productId": id,
        "productDescription": description,
        "productCategory": "Audio & Music",
        "productSubcategory": "Headphones & Earbuds",
        "productUnit": "each",
        "productPrice": price,
        "productWeight": "0.50"
    })
}

fn checkout_body() -> Value {
    json!({
        "shipping": {
            "address": "500 Pollock Rd",
            "city": "University Park",
            "state": "PA",
            "zipCode": "16802-1234",
            "shippingCarrier": "DHL",
            "shippingMethod": "2nd Day"
        },
        "billing": {
            "cardholderName": "Test User Visa",
            "cardNumber": "1111 1111 1111 1111",
            "expiryDate": "12/40",
            "cvv": "123",
            "sameAsShipping": true
        }
    })
}

#[tokio::test]
async fn health() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn product_validation_errors_are_422() {
    let app = app().await;
    let (status, body) = send(&app, Method::POST, "/api/v1/products", Some(product("A1", "Hi", json!("9.9")))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["productId"].is_string());
    assert!(body["errors"]["productDescription"].is_string());
    assert!(body["errors"]["productPrice"].is_string());
}

#[tokio::test]
async fn product_create_update_lookup_delete() {
    let app = app().await;
    let (status, body) = send(&app, Method::POST, "/api/v1/products", Some(product("300", "Studio headphones", json!(89.99)))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["productPrice"], "89.99");

    let (status, _) = send(&app, Method::POST, "/api/v1/products", Some(product("300", "Studio headphones II", json!("99.99")))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/v1/products/lookup?term=studio", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["productDescription"], "Studio headphones II");

    let (_, body) = send(&app, Method::GET, "/api/v1/products?search=30", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/products/300", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, Method::GET, "/api/v1/products/300", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn cart_and_checkout() {
    let app = app().await;
    send(&app, Method::POST, "/api/v1/products", Some(product("301", "Bluetooth speaker", json!("40.00")))).await;

    let (status, cart) = send(&app, Method::POST, "/api/v1/cart/items", Some(json!({"productId": "301", "quantity": 2}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totals"]["itemCount"], 2);
    assert!(cart["cartId"].as_str().unwrap().starts_with("cart_"));

    let (status, quote) = send(&app, Method::POST, "/api/v1/checkout/quote", Some(checkout_body()["shipping"].clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["shippingCost"], "19.98");
    assert_eq!(quote["total"], "99.98");

    let (status, order) = send(&app, Method::POST, "/api/v1/checkout", Some(checkout_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["totals"]["total"], "99.98");
    assert_eq!(order["testMode"], true);
    assert_eq!(order["billing"]["billingZipCode"], "16802-1234");
    assert_eq!(order["shopper"]["email"], "unknown@customer.com");

    let (_, current) = send(&app, Method::GET, "/api/v1/orders/current", None).await;
    assert_eq!(current["orderId"], order["orderId"]);
    let (_, cart) = send(&app, Method::GET, "/api/v1/cart", None).await;
    assert_eq!(cart["items"], json!([]));
}

#[tokio::test]
async fn cart_quantity_update_and_missing_product() {
    let app = app().await;
    send(&app, Method::POST, "/api/v1/products", Some(product("302", "Earbuds case", json!("12.50")))).await;
    send(&app, Method::POST, "/api/v1/cart/items", Some(json!({"productId": "302"}))).await;

    let (_, cart) = send(&app, Method::PUT, "/api/v1/cart/items/302", Some(json!({"quantity": 4}))).await;
    assert_eq!(cart["totals"]["totalPrice"], "50.00");
    let (_, cart) = send(&app, Method::PUT, "/api/v1/cart/items/302", Some(json!({"quantity": 0}))).await;
    assert_eq!(cart["totals"]["itemCount"], 0);

    let (status, _) = send(&app, Method::POST, "/api/v1/cart/items", Some(json!({"productId": "nope"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, Method::POST, "/api/v1/cart/items", Some(json!({"productId": "302", "quantity": 0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["quantity"], "Quantity must be at least 1");
}

#[tokio::test]
async fn empty_checkout_is_conflict() {
    let app = app().await;
    let (status, _) = send(&app, Method::POST, "/api/v1/checkout", Some(checkout_body())).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn returns_wait_for_an_order() {
    let app = app().await;
    let item = json!({"productId": "301", "reason": "Defective", "qty": 1});
    let (status, _) = send(&app, Method::POST, "/api/v1/returns/draft/items", Some(item)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, body) = send(&app, Method::GET, "/api/v1/returns/draft", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previousOrders"], json!([]));
}

#[tokio::test]
async fn reference_data() {
    let app = app().await;
    let (_, categories) = send(&app, Method::GET, "/api/v1/categories", None).await;
    assert_eq!(categories.as_array().unwrap().len(), 10);
    let (status, subs) = send(&app, Method::GET, "/api/v1/categories/Office%20Tech/subcategories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(subs.as_array().unwrap().contains(&json!("Webcams")));
    let (status, _) = send(&app, Method::GET, "/api/v1/categories/Groceries/subcategories", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, card) = send(&app, Method::GET, "/api/v1/checkout/test-cards/discover", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["number"], "4444 4444 4444 4444");
}

#[tokio::test]
async fn shopper_search_requires_term_and_me_is_404() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/v1/shoppers?search=", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["search"], "Please enter a search term");
    let (status, _) = send(&app, Method::GET, "/api/v1/me", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
