//! Request and response types for the Stripe Checkout API.

use serde::Deserialize;

use orchidee_core::{Cents, OrderId};

/// A line shown on the hosted Checkout page.
///
/// These come from the order's items plus, when charged, a synthetic
/// delivery fee line, so what the customer pays on Stripe is exactly the
/// order total.
#[derive(Debug, Clone)]
pub struct SessionLineItem {
    /// Display name on the payment page.
    pub name: String,
    /// Unit amount in cents.
    pub unit_amount: Cents,
    /// Number of units.
    pub quantity: u32,
}

/// Everything needed to create a Checkout session.
#[derive(Debug, Clone)]
pub struct SessionParams {
    /// Where Stripe sends the customer after payment. Must contain the
    /// literal `{CHECKOUT_SESSION_ID}` placeholder, which Stripe expands.
    pub success_url: String,
    /// Where Stripe sends the customer if they back out.
    pub cancel_url: String,
    /// Pre-fills the email field on the payment page.
    pub customer_email: String,
    /// Payment page locale (`fr`, `en` or `auto`).
    pub locale: String,
    /// Order this session pays for, carried in session metadata.
    pub order_id: OrderId,
    /// Human-facing order number, carried in session metadata.
    pub order_number: String,
    /// Lines shown on the payment page.
    pub line_items: Vec<SessionLineItem>,
}

impl SessionParams {
    /// Flatten into the form-encoded key/value pairs the Stripe API takes.
    ///
    /// Stripe's REST API uses bracketed keys for nested fields, e.g.
    /// `line_items[0][price_data][unit_amount]`.
    #[must_use]
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_owned(), "payment".to_owned()),
            ("success_url".to_owned(), self.success_url.clone()),
            ("cancel_url".to_owned(), self.cancel_url.clone()),
            ("customer_email".to_owned(), self.customer_email.clone()),
            ("locale".to_owned(), self.locale.clone()),
            ("metadata[order_id]".to_owned(), self.order_id.to_string()),
            (
                "metadata[order_number]".to_owned(),
                self.order_number.clone(),
            ),
        ];

        for (i, item) in self.line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                "cad".to_owned(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount.as_i64().to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        form
    }
}

/// A created Checkout session, trimmed to the fields we read.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Session ID (`cs_...`), recorded on the order.
    pub id: String,
    /// Hosted payment page URL. Present for newly created sessions.
    pub url: Option<String>,
    /// Stripe customer (`cus_...`), when the session is tied to one.
    pub customer: Option<String>,
}

/// Error envelope Stripe wraps failures in.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiError,
}

/// The error body inside [`ErrorEnvelope`].
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params() -> SessionParams {
        SessionParams {
            success_url:
                "https://commande.example.ca/merci?session_id={CHECKOUT_SESSION_ID}".to_owned(),
            cancel_url: "https://commande.example.ca/panier".to_owned(),
            customer_email: "client@example.com".to_owned(),
            locale: "fr".to_owned(),
            order_id: OrderId::new(42),
            order_number: "CMD-MEB1X2K4-7QZA".to_owned(),
            line_items: vec![
                SessionLineItem {
                    name: "Tourtière du Lac".to_owned(),
                    unit_amount: Cents::new(950),
                    quantity: 2,
                },
                SessionLineItem {
                    name: "Livraison / Delivery".to_owned(),
                    unit_amount: Cents::new(1000),
                    quantity: 1,
                },
            ],
        }
    }

    fn value_of<'a>(form: &'a [(String, String)], key: &str) -> &'a str {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_form_keeps_session_id_placeholder() {
        let form = params().to_form();
        assert!(value_of(&form, "success_url").contains("{CHECKOUT_SESSION_ID}"));
    }

    #[test]
    fn test_form_is_payment_mode_in_cad() {
        let form = params().to_form();
        assert_eq!(value_of(&form, "mode"), "payment");
        assert_eq!(
            value_of(&form, "line_items[0][price_data][currency]"),
            "cad"
        );
        assert_eq!(
            value_of(&form, "line_items[1][price_data][currency]"),
            "cad"
        );
    }

    #[test]
    fn test_form_carries_order_metadata() {
        let form = params().to_form();
        assert_eq!(value_of(&form, "metadata[order_id]"), "42");
        assert_eq!(value_of(&form, "metadata[order_number]"), "CMD-MEB1X2K4-7QZA");
    }

    #[test]
    fn test_form_indexes_line_items() {
        let form = params().to_form();
        assert_eq!(
            value_of(&form, "line_items[0][price_data][product_data][name]"),
            "Tourtière du Lac"
        );
        assert_eq!(
            value_of(&form, "line_items[0][price_data][unit_amount]"),
            "950"
        );
        assert_eq!(value_of(&form, "line_items[0][quantity]"), "2");
        assert_eq!(
            value_of(&form, "line_items[1][price_data][product_data][name]"),
            "Livraison / Delivery"
        );
        assert_eq!(value_of(&form, "line_items[1][quantity]"), "1");
    }
}
