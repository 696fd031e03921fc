//! Checkout orchestration.
//!
//! Turns a checkout request into a pending order and a Stripe Checkout
//! session, in that order: validate, price, persist, then talk to Stripe.
//! The order exists before Stripe is involved, so a payment that never
//! completes leaves a pending order behind (swept later by the CLI) rather
//! than a charge with no order.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use orchidee_core::pricing::{self, CartTotals, LineItem, PricingError};
use orchidee_core::{DeliveryMethod, Email, OrderId};

use super::{CustomerInfo, normalize_optional};
use crate::config::StorefrontConfig;
use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::models::order::{NewOrder, Order};
use crate::stripe::{SessionLineItem, SessionParams, StripeClient, StripeError};

/// Highest per-line quantity accepted at checkout.
const MAX_ITEM_QUANTITY: i64 = 999;

/// Name of the synthetic delivery fee line on the payment page.
const DELIVERY_LINE_NAME: &str = "Livraison / Delivery";

/// Name of the synthetic tax line on the payment page.
const TAX_LINE_NAME: &str = "Taxes (TPS + TVQ)";

/// A checkout request as posted by the storefront.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer: CustomerInfo,
    pub delivery: DeliveryInfo,
    pub items: Vec<CheckoutItem>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "fr".to_owned()
}

/// Fulfilment details of a checkout request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInfo {
    pub method: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// One item of a checkout request. Quantities and prices arrive as plain
/// integers so validation can produce field-level messages instead of a
/// deserialization failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_category: Option<String>,
    pub unit_price: i64,
    pub quantity: i64,
}

/// A checkout request after validation, ready to price and persist.
#[derive(Debug, Clone)]
pub struct ValidatedCheckout {
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub delivery_method: DeliveryMethod,
    pub delivery_date: NaiveDate,
    pub delivery_time: String,
    pub delivery_address: Option<String>,
    pub delivery_instructions: Option<String>,
    pub notes: Option<String>,
    pub language: String,
    pub items: Vec<LineItem>,
}

/// What the storefront needs to redirect the customer to payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfirmation {
    pub order_id: OrderId,
    pub order_number: String,
    pub checkout_url: String,
    pub session_id: String,
}

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Request failed validation. `field` names the offending input in
    /// wire (camelCase) form.
    #[error("validation failed on {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The items could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Database failure while persisting the order.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Stripe refused or failed to create the Checkout session.
    #[error(transparent)]
    Gateway(#[from] StripeError),
}

/// Validate a checkout request into a priced-ready draft.
///
/// Checks run in a fixed order and the first failure wins: customer name,
/// email, phone, then delivery method, date, time, address (delivery
/// orders only), then the items.
///
/// # Errors
///
/// Returns [`CheckoutError::Validation`] naming the first invalid field.
pub fn validate(request: CheckoutRequest) -> Result<ValidatedCheckout, CheckoutError> {
    let customer_name = request.customer.name.trim().to_owned();
    if customer_name.is_empty() {
        return Err(CheckoutError::Validation {
            field: "customer.name",
            message: "name is required".to_owned(),
        });
    }

    let customer_email =
        Email::parse(request.customer.email.trim()).map_err(|e| CheckoutError::Validation {
            field: "customer.email",
            message: e.to_string(),
        })?;

    let customer_phone = request.customer.phone.trim().to_owned();
    if customer_phone.is_empty() {
        return Err(CheckoutError::Validation {
            field: "customer.phone",
            message: "phone is required".to_owned(),
        });
    }

    let delivery_method = DeliveryMethod::from_str(request.delivery.method.trim()).map_err(
        |message| CheckoutError::Validation {
            field: "delivery.method",
            message,
        },
    )?;

    let delivery_date = NaiveDate::parse_from_str(request.delivery.date.trim(), "%Y-%m-%d")
        .map_err(|_| CheckoutError::Validation {
            field: "delivery.date",
            message: "date must be in YYYY-MM-DD format".to_owned(),
        })?;

    let delivery_time = request.delivery.time.trim().to_owned();
    if delivery_time.is_empty() {
        return Err(CheckoutError::Validation {
            field: "delivery.time",
            message: "time is required".to_owned(),
        });
    }

    let delivery_address = normalize_optional(request.delivery.address);
    if delivery_method == DeliveryMethod::Delivery && delivery_address.is_none() {
        return Err(CheckoutError::Validation {
            field: "delivery.address",
            message: "address is required for delivery orders".to_owned(),
        });
    }

    if request.items.is_empty() {
        return Err(CheckoutError::Validation {
            field: "items",
            message: "at least one item is required".to_owned(),
        });
    }

    let mut items = Vec::with_capacity(request.items.len());
    for item in request.items {
        let product_id = item.product_id.trim().to_owned();
        if product_id.is_empty() {
            return Err(CheckoutError::Validation {
                field: "items",
                message: "every item needs a product id".to_owned(),
            });
        }
        let product_name = item.product_name.trim().to_owned();
        if product_name.is_empty() {
            return Err(CheckoutError::Validation {
                field: "items",
                message: format!("item {product_id} needs a product name"),
            });
        }
        if item.quantity < 1 || item.quantity > MAX_ITEM_QUANTITY {
            return Err(CheckoutError::Validation {
                field: "items",
                message: format!(
                    "quantity for {product_id} must be between 1 and {MAX_ITEM_QUANTITY}"
                ),
            });
        }
        let quantity = u32::try_from(item.quantity).map_err(|_| CheckoutError::Validation {
            field: "items",
            message: format!("quantity out of range for {product_id}"),
        })?;
        if item.unit_price < 0 {
            return Err(CheckoutError::Validation {
                field: "items",
                message: format!("unit price for {product_id} cannot be negative"),
            });
        }

        items.push(LineItem {
            product_id,
            product_name,
            product_category: normalize_optional(item.product_category),
            unit_price: item.unit_price.into(),
            quantity,
        });
    }

    Ok(ValidatedCheckout {
        customer_name,
        customer_email,
        customer_phone,
        delivery_method,
        delivery_date,
        delivery_time,
        delivery_address,
        delivery_instructions: normalize_optional(request.delivery.instructions),
        notes: normalize_optional(request.notes),
        language: request.language,
        items,
    })
}

/// Checkout orchestration service.
pub struct CheckoutService<'a> {
    orders: OrderRepository<'a>,
    stripe: &'a StripeClient,
    config: &'a StorefrontConfig,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, stripe: &'a StripeClient, config: &'a StorefrontConfig) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            stripe,
            config,
        }
    }

    /// Run a checkout end to end and return the payment redirect.
    ///
    /// Failing to record the Stripe session ID on the order is logged but
    /// not fatal: the customer is already paying at that point and staff
    /// can reconcile from the Stripe dashboard via the order number in the
    /// session metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] or [`CheckoutError::Pricing`]
    /// for bad input, [`CheckoutError::Repository`] if the order cannot be
    /// persisted, and [`CheckoutError::Gateway`] if Stripe fails.
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutConfirmation, CheckoutError> {
        let validated = validate(request)?;
        let totals = pricing::compute_totals(
            &validated.items,
            validated.delivery_method,
            &self.config.pricing,
        )?;

        let order = self.create_order(&validated, totals).await?;

        let params = build_session_params(
            &self.config.base_url,
            order.id,
            &order.order_number,
            order.customer_email.as_str(),
            &order.language,
            &validated.items,
            totals,
        );
        let session = self.stripe.create_checkout_session(&params).await?;
        let checkout_url = session.url.ok_or_else(|| {
            StripeError::Response("Checkout session is missing its redirect URL".to_owned())
        })?;

        if let Err(e) = self
            .orders
            .set_payment_session(order.id, &session.id, session.customer.as_deref())
            .await
        {
            warn!(
                error = %e,
                order_id = %order.id,
                session_id = %session.id,
                "failed to record payment session on order"
            );
        }

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total,
            "checkout session ready"
        );

        Ok(CheckoutConfirmation {
            order_id: order.id,
            order_number: order.order_number,
            checkout_url,
            session_id: session.id,
        })
    }

    /// Persist the pending order, retrying exactly once on an order number
    /// collision. Numbers embed a millisecond timestamp, so a second draw
    /// virtually never collides again; anything after that is a real
    /// problem worth surfacing.
    async fn create_order(
        &self,
        validated: &ValidatedCheckout,
        totals: CartTotals,
    ) -> Result<Order, CheckoutError> {
        let draft = NewOrder {
            order_number: OrderRepository::generate_order_number(
                &self.config.order_number_prefix,
            ),
            customer_name: validated.customer_name.clone(),
            customer_email: validated.customer_email.clone(),
            customer_phone: validated.customer_phone.clone(),
            delivery_method: validated.delivery_method,
            delivery_date: validated.delivery_date,
            delivery_time: validated.delivery_time.clone(),
            delivery_address: validated.delivery_address.clone(),
            delivery_instructions: validated.delivery_instructions.clone(),
            notes: validated.notes.clone(),
            language: validated.language.clone(),
            totals,
        };

        match self.orders.create(&draft, &validated.items).await {
            Err(RepositoryError::DuplicateOrderNumber(taken)) => {
                warn!(order_number = %taken, "order number collision, retrying once");
                let retry = NewOrder {
                    order_number: OrderRepository::generate_order_number(
                        &self.config.order_number_prefix,
                    ),
                    ..draft
                };
                Ok(self.orders.create(&retry, &validated.items).await?)
            }
            other => Ok(other?),
        }
    }
}

/// Assemble the Stripe session request for an order.
///
/// The payment page lines are the order items plus synthetic tax and
/// delivery fee lines, so the amount Stripe charges equals the order total
/// to the cent.
fn build_session_params(
    base_url: &Url,
    order_id: OrderId,
    order_number: &str,
    customer_email: &str,
    language: &str,
    items: &[LineItem],
    totals: CartTotals,
) -> SessionParams {
    let mut line_items: Vec<SessionLineItem> = items
        .iter()
        .map(|item| SessionLineItem {
            name: item.product_name.clone(),
            unit_amount: item.unit_price,
            quantity: item.quantity,
        })
        .collect();
    if !totals.tax.is_zero() {
        line_items.push(SessionLineItem {
            name: TAX_LINE_NAME.to_owned(),
            unit_amount: totals.tax,
            quantity: 1,
        });
    }
    if !totals.delivery_fee.is_zero() {
        line_items.push(SessionLineItem {
            name: DELIVERY_LINE_NAME.to_owned(),
            unit_amount: totals.delivery_fee,
            quantity: 1,
        });
    }

    SessionParams {
        success_url: format!(
            "{}?session_id={{CHECKOUT_SESSION_ID}}",
            page_url(base_url, "merci")
        ),
        cancel_url: page_url(base_url, "panier"),
        customer_email: customer_email.to_owned(),
        locale: stripe_locale(language).to_owned(),
        order_id,
        order_number: order_number.to_owned(),
        line_items,
    }
}

/// Resolve a storefront page URL under the configured base.
fn page_url(base: &Url, page: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(page);
    }
    url.to_string()
}

/// Map the customer's language to a Stripe Checkout locale.
fn stripe_locale(language: &str) -> &'static str {
    match language {
        "fr" => "fr",
        "en" => "en",
        _ => "auto",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use orchidee_core::Cents;

    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            customer: CustomerInfo {
                name: "Jean Bouchard".to_owned(),
                email: "jean@example.com".to_owned(),
                phone: "418-555-0142".to_owned(),
            },
            delivery: DeliveryInfo {
                method: "delivery".to_owned(),
                date: "2026-09-05".to_owned(),
                time: "11:30".to_owned(),
                address: Some("12 rue du Quai, Québec".to_owned()),
                instructions: None,
            },
            items: vec![
                CheckoutItem {
                    product_id: "tourtiere".to_owned(),
                    product_name: "Tourtière du Lac".to_owned(),
                    product_category: Some("plats".to_owned()),
                    unit_price: 950,
                    quantity: 2,
                },
                CheckoutItem {
                    product_id: "plateau-fromages".to_owned(),
                    product_name: "Plateau de fromages".to_owned(),
                    product_category: None,
                    unit_price: 1200,
                    quantity: 1,
                },
            ],
            notes: None,
            language: "fr".to_owned(),
        }
    }

    fn validation_field(err: CheckoutError) -> &'static str {
        match err {
            CheckoutError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_valid_request() {
        let validated = validate(request()).unwrap();

        assert_eq!(validated.customer_name, "Jean Bouchard");
        assert_eq!(validated.delivery_method, DeliveryMethod::Delivery);
        assert_eq!(validated.items.len(), 2);
        assert_eq!(validated.items.first().unwrap().unit_price, Cents::new(950));
        assert_eq!(validated.language, "fr");
    }

    #[test]
    fn test_validation_order_name_first() {
        let mut req = request();
        req.customer.name = String::new();
        req.customer.email = "invalide".to_owned();
        req.delivery.method = "drone".to_owned();

        assert_eq!(validation_field(validate(req).unwrap_err()), "customer.name");
    }

    #[test]
    fn test_unknown_delivery_method() {
        let mut req = request();
        req.delivery.method = "drone".to_owned();

        assert_eq!(
            validation_field(validate(req).unwrap_err()),
            "delivery.method"
        );
    }

    #[test]
    fn test_delivery_requires_address() {
        let mut req = request();
        req.delivery.address = Some("   ".to_owned());

        assert_eq!(
            validation_field(validate(req).unwrap_err()),
            "delivery.address"
        );
    }

    #[test]
    fn test_pickup_does_not_require_address() {
        let mut req = request();
        req.delivery.method = "pickup".to_owned();
        req.delivery.address = None;

        let validated = validate(req).unwrap();
        assert_eq!(validated.delivery_method, DeliveryMethod::Pickup);
        assert_eq!(validated.delivery_address, None);
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut req = request();
        req.items.clear();

        assert_eq!(validation_field(validate(req).unwrap_err()), "items");
    }

    #[test]
    fn test_quantity_bounds() {
        for bad in [0, -1, MAX_ITEM_QUANTITY + 1] {
            let mut req = request();
            req.items.first_mut().unwrap().quantity = bad;

            assert_eq!(validation_field(validate(req).unwrap_err()), "items");
        }
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut req = request();
        req.items.first_mut().unwrap().unit_price = -50;

        assert_eq!(validation_field(validate(req).unwrap_err()), "items");
    }

    #[test]
    fn test_stripe_locale_mapping() {
        assert_eq!(stripe_locale("fr"), "fr");
        assert_eq!(stripe_locale("en"), "en");
        assert_eq!(stripe_locale("de"), "auto");
        assert_eq!(stripe_locale(""), "auto");
    }

    #[test]
    fn test_page_url_joins_cleanly() {
        let root = Url::parse("https://commande.example.ca").unwrap();
        assert_eq!(page_url(&root, "merci"), "https://commande.example.ca/merci");

        let nested = Url::parse("https://example.ca/boutique/").unwrap();
        assert_eq!(
            page_url(&nested, "panier"),
            "https://example.ca/boutique/panier"
        );
    }

    #[test]
    fn test_session_lines_sum_to_order_total() {
        let validated = validate(request()).unwrap();
        let config = orchidee_core::pricing::PricingConfig {
            tax_rate: rust_decimal::Decimal::new(14975, 5),
            delivery_fee: Cents::new(1000),
            free_delivery_threshold: Cents::new(5000),
        };
        let totals =
            pricing::compute_totals(&validated.items, validated.delivery_method, &config)
                .unwrap();

        let params = build_session_params(
            &Url::parse("https://commande.example.ca").unwrap(),
            OrderId::new(1),
            "CMD-TEST-AAAA",
            validated.customer_email.as_str(),
            &validated.language,
            &validated.items,
            totals,
        );

        let charged: i64 = params
            .line_items
            .iter()
            .map(|l| l.unit_amount.as_i64() * i64::from(l.quantity))
            .sum();
        assert_eq!(charged, totals.total.as_i64());
        assert_eq!(charged, 4714);
        assert!(params.success_url.contains("{CHECKOUT_SESSION_ID}"));
        assert_eq!(params.locale, "fr");
    }

    #[test]
    fn test_no_fee_line_when_delivery_is_free() {
        let mut req = request();
        req.items.first_mut().unwrap().quantity = 6;
        let validated = validate(req).unwrap();
        let config = orchidee_core::pricing::PricingConfig {
            tax_rate: rust_decimal::Decimal::new(14975, 5),
            delivery_fee: Cents::new(1000),
            free_delivery_threshold: Cents::new(5000),
        };
        let totals =
            pricing::compute_totals(&validated.items, validated.delivery_method, &config)
                .unwrap();
        assert!(totals.delivery_fee.is_zero());

        let params = build_session_params(
            &Url::parse("https://commande.example.ca").unwrap(),
            OrderId::new(1),
            "CMD-TEST-AAAA",
            validated.customer_email.as_str(),
            &validated.language,
            &validated.items,
            totals,
        );

        assert!(params.line_items.iter().all(|l| l.name != DELIVERY_LINE_NAME));
        let charged: i64 = params
            .line_items
            .iter()
            .map(|l| l.unit_amount.as_i64() * i64::from(l.quantity))
            .sum();
        assert_eq!(charged, totals.total.as_i64());
    }
}
