//! Checkout route handlers.
//!
//! The checkout lives in a modal: every step renders a fragment into
//! `#modalRoot`. A plain (non-htmx) `GET /checkout` gets the same fragment
//! wrapped in the page chrome.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{Address, AddressForm, Order, PaymentMethod};

use crate::error::{Result, breadcrumb};
use crate::filters;
use crate::routes::{CART_UPDATED_EVENT, is_htmx};
use crate::services::checkout::REDIRECT_SECONDS;
use crate::services::{CheckoutError, CheckoutService, CheckoutState};
use crate::state::AppState;
use crate::storage::Storage;

/// Saved address display data for templates.
#[derive(Clone)]
pub struct AddressView {
    pub index: usize,
    pub name: String,
    pub street: String,
    pub city: String,
    pub zip: String,
    pub phone: String,
}

/// Payment choice display data for templates.
#[derive(Clone)]
pub struct PaymentOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

/// Address list step display data.
#[derive(Clone)]
pub struct CheckoutView {
    pub addresses: Vec<AddressView>,
    pub payments: Vec<PaymentOptionView>,
    pub total_items: usize,
    pub total: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl CheckoutView {
    fn from_state(state: &CheckoutState) -> Self {
        let addresses = state
            .addresses
            .iter()
            .enumerate()
            .map(|(index, a): (usize, &Address)| AddressView {
                index,
                name: a.name.clone(),
                street: a.street.clone(),
                city: a.city.clone(),
                zip: a.zip.clone(),
                phone: a.phone.clone(),
            })
            .collect();

        let payments = PaymentMethod::ALL
            .into_iter()
            .map(|m| PaymentOptionView {
                value: m.as_str(),
                label: m.label(),
                checked: m == PaymentMethod::default(),
            })
            .collect();

        Self {
            addresses,
            payments,
            total_items: state.cart.items.len(),
            total: state.cart.total.display(),
            error: None,
            notice: None,
        }
    }

    fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    fn with_notice(mut self, message: impl Into<String>) -> Self {
        self.notice = Some(message.into());
        self
    }
}

/// Address list fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/address_list.html")]
pub struct AddressListTemplate {
    pub view: CheckoutView,
}

/// Full checkout page (non-htmx requests).
#[derive(Template, WebTemplate)]
#[template(path = "checkout/page.html")]
pub struct CheckoutPageTemplate {
    pub view: CheckoutView,
}

/// Add address form fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/address_form.html")]
pub struct AddressFormTemplate {
    pub error: Option<String>,
}

/// Order confirmation fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/order_placed.html")]
pub struct OrderPlacedTemplate {
    pub order_id: String,
    pub total: String,
    pub payment: &'static str,
    pub address_name: String,
    pub redirect_seconds: u32,
}

impl From<&Order> for OrderPlacedTemplate {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.map(|id| id.to_string()).unwrap_or_default(),
            total: order.total.display(),
            payment: order.payment_method.label(),
            address_name: order.address_name().to_string(),
            redirect_seconds: REDIRECT_SECONDS,
        }
    }
}

/// Place order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    pub address: Option<String>,
    pub payment: Option<String>,
}

async fn checkout_view(state: &AppState, storage: &Storage) -> CheckoutView {
    let checkout = CheckoutService::new(storage, state.catalog()).state().await;
    CheckoutView::from_state(&checkout)
}

/// Display the address list step.
#[instrument(skip(state, storage, headers))]
pub async fn show(
    State(state): State<AppState>,
    storage: Storage,
    headers: HeaderMap,
) -> Response {
    let view = checkout_view(&state, &storage).await;
    if is_htmx(&headers) {
        AddressListTemplate { view }.into_response()
    } else {
        CheckoutPageTemplate { view }.into_response()
    }
}

/// Display the add address form.
#[instrument]
pub async fn new_address() -> impl IntoResponse {
    AddressFormTemplate { error: None }
}

/// Save a new address and return to the list.
#[instrument(skip(state, storage, form))]
pub async fn create_address(
    State(state): State<AppState>,
    storage: Storage,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    match CheckoutService::new(&storage, state.catalog())
        .save_address(&form)
        .await
    {
        Ok(_) => {
            let view = checkout_view(&state, &storage)
                .await
                .with_notice("Address saved successfully!");
            Ok(AddressListTemplate { view }.into_response())
        }
        Err(e @ CheckoutError::InvalidAddress(_)) => Ok(AddressFormTemplate {
            error: Some(e.to_string()),
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Remove the address at `index` and return to the list.
///
/// An index that is not a number or out of range leaves the list unchanged.
#[instrument(skip(state, storage))]
pub async fn remove_address(
    State(state): State<AppState>,
    storage: Storage,
    Path(index): Path<String>,
) -> Result<Response> {
    match index.parse::<usize>() {
        Ok(index) => {
            CheckoutService::new(&storage, state.catalog())
                .remove_address(index)
                .await?;
        }
        Err(_) => tracing::warn!(index = %index, "Invalid address index"),
    }

    let view = checkout_view(&state, &storage).await;
    Ok(AddressListTemplate { view }.into_response())
}

/// Place the order and show the confirmation.
///
/// Validation and backend rejections re-render the address list with the
/// message; no order is created.
#[instrument(skip(state, storage))]
pub async fn place_order(
    State(state): State<AppState>,
    storage: Storage,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Response> {
    let selection = form
        .address
        .as_deref()
        .and_then(|a| a.trim().parse::<usize>().ok());
    let payment = form
        .payment
        .as_deref()
        .and_then(|p| p.parse::<PaymentMethod>().ok())
        .unwrap_or_default();

    let result = CheckoutService::new(&storage, state.catalog())
        .place_order(selection, payment)
        .await;

    match result {
        Ok(order) => {
            let order_id = order.id.map(|id| id.to_string()).unwrap_or_default();
            breadcrumb("checkout", "Order placed", &[("order_id", &order_id)]);
            Ok((
                AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
                OrderPlacedTemplate::from(&order),
            )
                .into_response())
        }
        Err(e @ (CheckoutError::NoAddressSelected | CheckoutError::NoAddress)) => {
            let view = checkout_view(&state, &storage).await.with_error(e.to_string());
            Ok(AddressListTemplate { view }.into_response())
        }
        Err(e @ (CheckoutError::OrderRejected { .. } | CheckoutError::OrderFailed(_))) => {
            tracing::error!(error = %e, "Order not placed");
            let view = checkout_view(&state, &storage)
                .await
                .with_error(format!("Error placing order: {e}"));
            Ok(AddressListTemplate { view }.into_response())
        }
        Err(e) => Err(e.into()),
    }
}
