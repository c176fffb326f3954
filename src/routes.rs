//! HTTP surface under `/api/v1`

use std::sync::Arc;

use axum::{extract::{Path, Query, State}, http::StatusCode, response::{IntoResponse, Response}, routing::{delete, get, post, put}, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::aggregates::product::{category_names, subcategories_for};
use crate::domain::aggregates::{CartDocument, CurrentUser, Order, Product, ReturnDocument, Shopper, ShippingQuote, UpsertOutcome};
use crate::domain::value_objects::MockCard;
use crate::services::{mock_card, AddToCart, CheckoutRequest, ReturnDraftView, Storefront};
use crate::validation::{LoginForm, ProductForm, ReturnHeaderForm, ReturnItemForm, ShippingForm, ShopperForm, SignupForm};
use crate::StorefrontError;

pub type AppState = Arc<Storefront>;
type ApiResult<T> = Result<T, StorefrontError>;

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors }))).into_response(),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, Json(json!({ "error": format!("{what} not found") }))).into_response(),
            Self::Conflict(message) => (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response(),
            Self::Sync(e) => {
                tracing::warn!(error = %e, "remote API call failed");
                (StatusCode::BAD_GATEWAY, Json(json!({ "error": "The account service is unavailable. Please try again later." }))).into_response()
            }
            Self::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Storage failure" }))).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/shoppers", get(list_shoppers).post(register_shopper))
        .route("/products", get(list_products).post(save_product).delete(reset_products))
        .route("/products/lookup", get(lookup_product))
        .route("/products/:id", get(get_product).delete(delete_product))
        .route("/categories", get(list_categories))
        .route("/categories/:category/subcategories", get(list_subcategories))
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_to_cart))
        .route("/cart/items/:id", put(update_cart_item).delete(remove_cart_item))
        .route("/checkout", post(checkout))
        .route("/checkout/quote", post(quote))
        .route("/checkout/test-cards/:brand", get(test_card))
        .route("/orders", get(list_orders))
        .route("/orders/current", get(current_order))
        .route("/returns", get(list_returns).post(submit_return))
        .route("/returns/draft", get(return_draft))
        .route("/returns/draft/items", post(add_return_item))
        .route("/returns/draft/items/:index", delete(remove_return_item))
        .route("/returns/draft/from-order/:order_id", post(draft_from_order));

    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy", "service": "campus-storefront"})) }))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

#[derive(Debug, Default, Deserialize)] pub struct SearchParams { #[serde(default)] pub search: Option<String> }
#[derive(Debug, Default, Deserialize)] pub struct LookupParams { #[serde(default)] pub term: String }
#[derive(Debug, Deserialize)] pub struct QuantityRequest { pub quantity: i64 }
#[derive(Debug, Serialize)] pub struct CategoryView { pub name: &'static str, pub subcategories: &'static [&'static str] }

async fn signup(State(s): State<AppState>, Json(f): Json<SignupForm>) -> ApiResult<(StatusCode, Json<CurrentUser>)> {
    Ok((StatusCode::CREATED, Json(s.signup(f).await?)))
}

async fn login(State(s): State<AppState>, Json(f): Json<LoginForm>) -> ApiResult<Json<CurrentUser>> { Ok(Json(s.login(f).await?)) }

async fn me(State(s): State<AppState>) -> ApiResult<Json<CurrentUser>> {
    s.current_user().await?.map(Json).ok_or(StorefrontError::NotFound("Current user"))
}

async fn list_shoppers(State(s): State<AppState>, Query(p): Query<SearchParams>) -> ApiResult<Json<Vec<Shopper>>> {
    match p.search {
        Some(term) => Ok(Json(s.search_shoppers(&term).await?)),
        None => Ok(Json(s.shoppers().await?)),
    }
}

async fn register_shopper(State(s): State<AppState>, Json(f): Json<ShopperForm>) -> ApiResult<(StatusCode, Json<Shopper>)> {
    Ok((StatusCode::CREATED, Json(s.register_shopper(f).await?)))
}

async fn list_products(State(s): State<AppState>, Query(p): Query<SearchParams>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(s.search_products(p.search.as_deref().unwrap_or("")).await?))
}

async fn save_product(State(s): State<AppState>, Json(f): Json<ProductForm>) -> ApiResult<(StatusCode, Json<Product>)> {
    let (product, outcome) = s.save_product(f).await?;
    let status = if outcome == UpsertOutcome::Inserted { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(product)))
}

async fn reset_products(State(s): State<AppState>) -> ApiResult<StatusCode> { s.reset_catalog().await?; Ok(StatusCode::NO_CONTENT) }

async fn lookup_product(State(s): State<AppState>, Query(p): Query<LookupParams>) -> ApiResult<Json<Product>> { Ok(Json(s.lookup_product(&p.term).await?)) }

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> { Ok(Json(s.product(&id).await?)) }

async fn delete_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> { s.delete_product(&id).await?; Ok(StatusCode::NO_CONTENT) }

async fn list_categories() -> Json<Vec<CategoryView>> {
    Json(category_names().into_iter().map(|name| CategoryView { name, subcategories: subcategories_for(name) }).collect())
}

async fn list_subcategories(Path(category): Path<String>) -> ApiResult<Json<&'static [&'static str]>> {
    let subs = subcategories_for(&category);
    if subs.is_empty() { return Err(StorefrontError::NotFound("Category")); }
    Ok(Json(subs))
}

async fn get_cart(State(s): State<AppState>) -> ApiResult<Json<CartDocument>> { Ok(Json(s.cart().await?)) }
async fn clear_cart(State(s): State<AppState>) -> ApiResult<Json<CartDocument>> { Ok(Json(s.clear_cart().await?)) }
async fn add_to_cart(State(s): State<AppState>, Json(r): Json<AddToCart>) -> ApiResult<Json<CartDocument>> { Ok(Json(s.add_to_cart(r).await?)) }

async fn update_cart_item(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<QuantityRequest>) -> ApiResult<Json<CartDocument>> {
    Ok(Json(s.update_cart_item(&id, r.quantity).await?))
}

async fn remove_cart_item(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<CartDocument>> { Ok(Json(s.remove_cart_item(&id).await?)) }

async fn quote(State(s): State<AppState>, Json(f): Json<ShippingForm>) -> ApiResult<Json<ShippingQuote>> { Ok(Json(s.quote(&f).await?)) }

async fn checkout(State(s): State<AppState>, Json(r): Json<CheckoutRequest>) -> ApiResult<(StatusCode, Json<Order>)> {
    Ok((StatusCode::CREATED, Json(s.place_order(r).await?)))
}

async fn test_card(Path(brand): Path<String>) -> ApiResult<Json<&'static MockCard>> { Ok(Json(mock_card(&brand)?)) }

async fn list_orders(State(s): State<AppState>) -> ApiResult<Json<Vec<Order>>> { Ok(Json(s.order_history().await?)) }

async fn current_order(State(s): State<AppState>) -> ApiResult<Json<Order>> {
    s.current_order().await?.map(Json).ok_or(StorefrontError::NotFound("Order"))
}

async fn list_returns(State(s): State<AppState>) -> ApiResult<Json<Vec<ReturnDocument>>> { Ok(Json(s.return_history().await?)) }

async fn submit_return(State(s): State<AppState>, Json(f): Json<ReturnHeaderForm>) -> ApiResult<(StatusCode, Json<ReturnDocument>)> {
    Ok((StatusCode::CREATED, Json(s.submit_return(f).await?)))
}

async fn return_draft(State(s): State<AppState>) -> ApiResult<Json<ReturnDraftView>> { Ok(Json(s.return_draft().await?)) }
async fn add_return_item(State(s): State<AppState>, Json(f): Json<ReturnItemForm>) -> ApiResult<Json<ReturnDraftView>> { Ok(Json(s.add_return_item(f).await?)) }
async fn remove_return_item(State(s): State<AppState>, Path(index): Path<usize>) -> ApiResult<Json<ReturnDraftView>> { Ok(Json(s.remove_return_item(index).await?)) }
async fn draft_from_order(State(s): State<AppState>, Path(order_id): Path<String>) -> ApiResult<Json<ReturnDraftView>> { Ok(Json(s.draft_from_order(&order_id).await?)) }
