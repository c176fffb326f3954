use campus_storefront::domain::aggregates::Product;
use campus_storefront::domain::events::{DomainEvent, ProductEvent};
use campus_storefront::services::Storefront;
use campus_storefront::storage::DocumentStore;
use campus_storefront::sync::{ApiClient, LoginRequest, SyncBridge, SyncError};
use campus_storefront::validation::SignupForm;
use campus_storefront::StorefrontError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&format!("{}/api", server.uri()), 5).expect("client construction should not fail")
}

fn signup_form() -> SignupForm {
    SignupForm {
        username: "nittany".into(),
        email: "lion@psu.edu".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        terms: true,
    }
}

fn sample_product(id: &str) -> Product {
    serde_json::from_value(json!({
        "productId": id,
        "productDescription": "Streaming stick",
        "productCategory": "Home Entertainment",
        "productSubcategory": "Streaming Devices (e.g., Roku, Fire Stick)",
        "productUnit": "each",
        "productPrice": "39.99"
    }))
    .unwrap()
}

#[tokio::test]
async fn signup_stores_remote_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .and(body_partial_json(json!({"username": "nittany", "email": "lion@psu.edu"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"userId": "u-42"})))
        .expect(1)
        .mount(&server)
        .await;

    let storefront = Storefront::open(DocumentStore::in_memory(), SyncBridge::new(client(&server))).await.unwrap();
    let user = storefront.signup(signup_form()).await.unwrap();
    assert_eq!(user.id.as_deref(), Some("u-42"));
    assert_eq!(storefront.current_user().await.unwrap().unwrap().id.as_deref(), Some("u-42"));
}

#[tokio::test]
async fn signup_remote_rejection_keeps_no_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"error": "Username already taken"})))
        .mount(&server)
        .await;

    let storefront = Storefront::open(DocumentStore::in_memory(), SyncBridge::new(client(&server))).await.unwrap();
    let err = storefront.signup(signup_form()).await.unwrap_err();
    match err {
        StorefrontError::Sync(SyncError::Api { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "Username already taken");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(storefront.current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn login_reads_nested_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/users/login"))
        .and(body_partial_json(json!({"usernameOrEmail": "lion@psu.edu"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"_id": "u-7", "username": "nittany", "email": "lion@psu.edu"}})))
        .mount(&server)
        .await;

    let remote = client(&server).login_user(&LoginRequest { username_or_email: "lion@psu.edu", password: "secret1" }).await.unwrap();
    assert_eq!(remote.id.as_deref(), Some("u-7"));
    assert_eq!(remote.username.as_deref(), Some("nittany"));
}

#[tokio::test]
async fn get_products_accepts_bare_and_wrapped_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("productId", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"productId": "9", "productDesc": "Router", "productPrice": 59}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("description", "modem"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": [{"productId": "10", "productDescription": "Cable modem", "productPrice": "80.00"}]})))
        .mount(&server)
        .await;

    let api = client(&server);
    let by_id = api.get_products(Some("9"), None).await.unwrap();
    assert_eq!(by_id[0].product_description, "Router");
    assert_eq!(by_id[0].product_price.to_string(), "59.00");
    let by_desc = api.get_products(None, Some("modem")).await.unwrap();
    assert_eq!(by_desc[0].product_id, "10");
}

#[tokio::test]
async fn get_orders_and_returns_with_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(query_param("email", "lion@psu.edu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"orderId": "ORD-1"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/returns"))
        .and(query_param("orderNumber", "ORD-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let api = client(&server);
    assert_eq!(api.get_orders(None, Some("lion@psu.edu")).await.unwrap()[0].order_id, "ORD-1");
    assert!(api.get_returns(Some("ORD-1"), None).await.unwrap().is_empty());
}

#[tokio::test]
async fn bridge_mirrors_product_events_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).and(path("/api/products")).respond_with(ResponseTemplate::new(201)).expect(1).mount(&server).await;
    Mock::given(method("PUT")).and(path("/api/products/77")).respond_with(ResponseTemplate::new(200)).expect(1).mount(&server).await;
    Mock::given(method("DELETE")).and(path("/api/products/77")).respond_with(ResponseTemplate::new(204)).expect(1).mount(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .and(body_partial_json(json!({"products": [{"productId": "78"}]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = SyncBridge::new(client(&server));
    let events = vec![
        DomainEvent::Product(ProductEvent::Created { product: sample_product("77") }),
        DomainEvent::Product(ProductEvent::Updated { product: sample_product("77") }),
        DomainEvent::Product(ProductEvent::Deleted { product_id: "77".into() }),
        DomainEvent::Product(ProductEvent::Seeded { products: vec![sample_product("78")] }),
    ];
    bridge.publish(events).expect("bridge is enabled").await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn failed_mirror_does_not_panic() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE")).respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"}))).mount(&server).await;

    let bridge = SyncBridge::new(client(&server));
    let handle = bridge.publish(vec![DomainEvent::Product(ProductEvent::Deleted { product_id: "1".into() })]).unwrap();
    assert!(handle.await.is_ok());
}

#[tokio::test]
async fn unreachable_api_surfaces_http_error() {
    let api = ApiClient::new("http://127.0.0.1:9/api", 1).unwrap();
    let err = api.delete_product("1").await.unwrap_err();
    assert!(matches!(err, SyncError::Http(_)));
}
