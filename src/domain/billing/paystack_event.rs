//! Paystack webhook event types.
//!
//! Paystack posts `{ "event": "<name>", "data": { ... } }`. The envelope is
//! parsed eagerly; `data` is only interpreted once the event kind is known,
//! and every field the handlers read is optional so a missing field becomes
//! a logged precondition failure instead of a parse error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::webhook_errors::WebhookError;

/// Paystack webhook envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PaystackEvent {
    /// Dot-namespaced event name, e.g. `charge.success`.
    pub event: String,

    /// Event-specific object.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl PaystackEvent {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Parses the envelope from the raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(body).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// Classifies the event name.
    pub fn kind(&self) -> PaystackEventKind {
        PaystackEventKind::from_event_name(&self.event)
    }

    /// Interprets `data` as the given shape.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, WebhookError> {
        let data = if self.data.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            self.data.clone()
        };
        serde_json::from_value(data).map_err(|e| WebhookError::MalformedPayload(e.to_string()))
    }
}

/// Event kinds this service acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaystackEventKind {
    ChargeSuccess,
    SubscriptionCreate,
    SubscriptionDisable,
    SubscriptionNotRenew,
    InvoiceCreate,
    InvoiceUpdate,
    InvoicePaymentFailed,
    /// Any other event name, kept for logging.
    Unhandled(String),
}

impl PaystackEventKind {
    pub fn from_event_name(name: &str) -> Self {
        match name {
            "charge.success" => Self::ChargeSuccess,
            "subscription.create" => Self::SubscriptionCreate,
            "subscription.disable" => Self::SubscriptionDisable,
            "subscription.not_renew" => Self::SubscriptionNotRenew,
            "invoice.create" => Self::InvoiceCreate,
            "invoice.update" => Self::InvoiceUpdate,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            other => Self::Unhandled(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ChargeSuccess => "charge.success",
            Self::SubscriptionCreate => "subscription.create",
            Self::SubscriptionDisable => "subscription.disable",
            Self::SubscriptionNotRenew => "subscription.not_renew",
            Self::InvoiceCreate => "invoice.create",
            Self::InvoiceUpdate => "invoice.update",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::Unhandled(name) => name,
        }
    }
}

/// `data` of a `charge.success` event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChargeData {
    pub reference: Option<String>,
    /// Amount in minor units (kobo).
    pub amount: Option<i64>,
    pub currency: Option<String>,
    /// Payment channel: `card`, `bank`, `ussd`, `bank_transfer`, ...
    pub channel: Option<String>,
    /// Free-form; Paystack sends an empty string when no metadata was set.
    pub metadata: serde_json::Value,
}

impl ChargeData {
    /// `metadata.user_id`, accepting string or numeric ids.
    pub fn user_id(&self) -> Option<String> {
        match self.metadata.get("user_id")? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Plan {
    pub plan_code: Option<String>,
}

/// `data` of the `subscription.*` events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubscriptionData {
    pub subscription_code: Option<String>,
    pub customer: Option<Customer>,
    pub plan: Option<Plan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvoiceSubscription {
    pub subscription_code: Option<String>,
}

/// `data` of the `invoice.*` events.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvoiceData {
    pub paid: Option<bool>,
    pub subscription: Option<InvoiceSubscription>,
}

impl InvoiceData {
    pub fn subscription_code(&self) -> Option<&str> {
        self.subscription
            .as_ref()
            .and_then(|s| s.subscription_code.as_deref())
            .filter(|code| !code.is_empty())
    }
}
