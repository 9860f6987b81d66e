//! Orders and status mapping.

use serde::{Deserialize, Serialize};

use super::CartItem;

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "cod")]
    CashOnDelivery,
    #[serde(rename = "bank-transfer")]
    BankTransfer,
}

/// Order lifecycle status, derived from upstream fulfillment/financial
/// status via a fixed priority mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    InTransit,
    Delivered,
}

impl OrderStatus {
    /// Map upstream status strings to the local status.
    ///
    /// Priority order matters: fulfillment wins over financial status, and
    /// anything unrecognized falls back to pending.
    #[must_use]
    pub fn from_upstream(financial_status: &str, fulfillment_status: &str) -> Self {
        match fulfillment_status {
            "FULFILLED" => Self::Delivered,
            "PARTIALLY_FULFILLED" | "IN_PROGRESS" => Self::InTransit,
            _ => match financial_status {
                "PAID" | "PARTIALLY_PAID" => Self::Processing,
                _ => Self::Pending,
            },
        }
    }
}

/// Client-side shadow of an upstream order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub city: String,
    pub items: Vec<CartItem>,
    pub subtotal: f64,
    pub delivery_charge: f64,
    pub total: f64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopify_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopify_draft_order_id: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_priority() {
        // Fulfillment status takes priority over financial status.
        assert_eq!(
            OrderStatus::from_upstream("PAID", "FULFILLED"),
            OrderStatus::Delivered
        );
        assert_eq!(
            OrderStatus::from_upstream("PENDING", "PARTIALLY_FULFILLED"),
            OrderStatus::InTransit
        );
        assert_eq!(
            OrderStatus::from_upstream("PAID", "IN_PROGRESS"),
            OrderStatus::InTransit
        );
        assert_eq!(
            OrderStatus::from_upstream("PAID", "UNFULFILLED"),
            OrderStatus::Processing
        );
        assert_eq!(
            OrderStatus::from_upstream("PARTIALLY_PAID", ""),
            OrderStatus::Processing
        );
        assert_eq!(
            OrderStatus::from_upstream("PENDING", "UNFULFILLED"),
            OrderStatus::Pending
        );
        assert_eq!(OrderStatus::from_upstream("", ""), OrderStatus::Pending);
    }

    #[test]
    fn status_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(OrderStatus::InTransit).unwrap(),
            "in-transit"
        );
    }

    #[test]
    fn payment_method_wire_names() {
        assert_eq!(
            serde_json::to_value(PaymentMethod::CashOnDelivery).unwrap(),
            "cod"
        );
        assert_eq!(
            serde_json::to_value(PaymentMethod::BankTransfer).unwrap(),
            "bank-transfer"
        );
        let parsed: PaymentMethod = serde_json::from_str("\"bank-transfer\"").unwrap();
        assert_eq!(parsed, PaymentMethod::BankTransfer);
    }
}
