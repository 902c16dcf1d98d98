use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::token::random_alphanumeric;

/// Channel through which a purchase is completed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "gateway")]
    Gateway,
    #[sea_orm(string_value = "messaging-handoff")]
    MessagingHandoff,
    #[sea_orm(string_value = "manual")]
    Manual,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Gateway => "gateway",
            PaymentMethod::MessagingHandoff => "messaging-handoff",
            PaymentMethod::Manual => "manual",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "gateway" => Ok(PaymentMethod::Gateway),
            "messaging-handoff" => Ok(PaymentMethod::MessagingHandoff),
            "manual" => Ok(PaymentMethod::Manual),
            other => Err(format!(
                "The selected payment_method '{other}' is invalid. Expected one of: gateway, messaging-handoff, manual."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    /// Every charge succeeds with a fresh vendor id.
    Simulated,
    /// Every charge is declined.
    Declining,
}

impl FromStr for GatewayMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simulated" => Ok(GatewayMode::Simulated),
            "declining" => Ok(GatewayMode::Declining),
            other => Err(anyhow::anyhow!("unknown PAYMENT_GATEWAY mode: {other}")),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment declined by gateway")]
    Declined,
}

/// Stand-in for the external card processor.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedGateway {
    mode: GatewayMode,
}

impl SimulatedGateway {
    pub fn new(mode: GatewayMode) -> Self {
        Self { mode }
    }

    /// Charges the buyer and returns the vendor-assigned payment id.
    pub async fn charge(&self, purchase_id: Uuid, amount: Decimal) -> Result<String, GatewayError> {
        tracing::debug!(%purchase_id, %amount, "gateway charge");
        match self.mode {
            GatewayMode::Simulated => Ok(format!("MP_{}", random_alphanumeric(10))),
            GatewayMode::Declining => Err(GatewayError::Declined),
        }
    }
}

/// Synthetic payment id for administrator grants.
pub fn manual_payment_id(now: DateTime<Utc>) -> String {
    format!("manual-{}", now.timestamp())
}

/// Deep link into the messaging service with a canned purchase request.
pub fn messaging_link(phone: &str, buyer_name: &str, buyer_email: &str) -> String {
    let message = format!(
        "Hello, I'm {buyer_name}. I'm interested in buying your digital book. My email is {buyer_email}"
    );
    format!(
        "https://wa.me/{}?text={}",
        phone,
        urlencoding::encode(&message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn method_round_trips_through_wire_names() {
        for method in [
            PaymentMethod::Gateway,
            PaymentMethod::MessagingHandoff,
            PaymentMethod::Manual,
        ] {
            assert_eq!(method.as_str().parse::<PaymentMethod>(), Ok(method));
            assert_eq!(
                serde_json::to_value(method).unwrap(),
                serde_json::json!(method.as_str())
            );
        }
        assert!("mercado_pago".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn link_embeds_buyer_details() {
        let link = messaging_link("123456789", "Ana Díaz", "ana@example.com");
        assert!(link.starts_with("https://wa.me/123456789?text="));
        assert!(link.contains("Ana%20D%C3%ADaz"));
        assert!(link.contains("ana%40example.com"));
    }

    #[test]
    fn manual_id_uses_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 4, 7, 0, 0, 0).unwrap();
        assert_eq!(manual_payment_id(now), format!("manual-{}", now.timestamp()));
    }

    #[tokio::test]
    async fn gateway_modes() {
        let ok = SimulatedGateway::new(GatewayMode::Simulated)
            .charge(Uuid::new_v4(), Decimal::new(1999, 2))
            .await
            .unwrap();
        assert!(ok.starts_with("MP_"));
        assert_eq!(ok.len(), 13);

        let declined = SimulatedGateway::new(GatewayMode::Declining)
            .charge(Uuid::new_v4(), Decimal::new(1999, 2))
            .await;
        assert!(matches!(declined, Err(GatewayError::Declined)));
    }

    #[test]
    fn gateway_mode_parses() {
        assert_eq!("Declining".parse::<GatewayMode>().unwrap(), GatewayMode::Declining);
        assert!("stripe".parse::<GatewayMode>().is_err());
    }
}
