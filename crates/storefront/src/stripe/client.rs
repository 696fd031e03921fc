//! Stripe REST API client.
//!
//! Talks straight to the REST endpoint with form-encoded bodies; the only
//! call this application makes is creating Checkout sessions.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument};

use super::error::StripeError;
use super::types::{CheckoutSession, ErrorEnvelope, SessionParams};

/// Stripe API base URL.
const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    /// HTTP client.
    client: Client,
    /// Secret API key (`sk_...`).
    secret_key: SecretString,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("secret_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Create a new Stripe client.
    #[must_use]
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            secret_key,
        }
    }

    /// Create a hosted Checkout session.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the response cannot be parsed,
    /// or Stripe rejects the session.
    #[instrument(skip(self, params), fields(order_number = %params.order_number))]
    pub async fn create_checkout_session(
        &self,
        params: &SessionParams,
    ) -> Result<CheckoutSession, StripeError> {
        let form = params.to_form();

        let response = self
            .client
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await
            .map_err(|e| StripeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| StripeError::Response(e.to_string()))?;
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or(body);

            error!(
                status = status.as_u16(),
                message = %message,
                "Stripe rejected Checkout session"
            );
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| StripeError::Response(e.to_string()))?;

        debug!(session_id = %session.id, "Stripe Checkout session created");

        Ok(session)
    }
}
