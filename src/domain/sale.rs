// src/domain/sale.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    WaitingContract,
    WaitingDownPayment,
    WaitingSevenDays,
    WaitingInvoice,
    Paid,
    Canceled,
}

impl SaleStatus {
    pub const ALL: [SaleStatus; 6] = [
        SaleStatus::WaitingContract,
        SaleStatus::WaitingDownPayment,
        SaleStatus::WaitingSevenDays,
        SaleStatus::WaitingInvoice,
        SaleStatus::Paid,
        SaleStatus::Canceled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SaleStatus::WaitingContract => "waiting_contract",
            SaleStatus::WaitingDownPayment => "waiting_down_payment",
            SaleStatus::WaitingSevenDays => "waiting_seven_days",
            SaleStatus::WaitingInvoice => "waiting_invoice",
            SaleStatus::Paid => "paid",
            SaleStatus::Canceled => "canceled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    pub fn label(self) -> &'static str {
        match self {
            SaleStatus::WaitingContract => "Waiting for contract",
            SaleStatus::WaitingDownPayment => "Waiting for down payment",
            SaleStatus::WaitingSevenDays => "Waiting seven days",
            SaleStatus::WaitingInvoice => "Waiting for invoice",
            SaleStatus::Paid => "Paid",
            SaleStatus::Canceled => "Canceled",
        }
    }
}

/// A buyer. Sales point at one or two of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// A closed lot sale and the commission it pays its broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub client_id: String,
    #[serde(default)]
    pub second_buyer_id: Option<String>,
    pub development_id: String,
    pub broker_id: String,
    #[serde(default)]
    pub block_number: String,
    #[serde(default)]
    pub lot_number: String,
    #[serde(deserialize_with = "money")]
    pub total_value: f64,
    #[serde(deserialize_with = "money", default)]
    pub commission_value: f64,
    #[serde(deserialize_with = "purchase_day")]
    pub purchase_date: NaiveDate,
    pub status: SaleStatus,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Amounts arrive as JSON numbers or as decimal strings; anything unreadable
/// counts as zero.
fn money<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null,
    }
    Ok(match Raw::deserialize(de)? {
        Raw::Number(n) if n.is_finite() => n,
        Raw::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    })
}

/// `YYYY-MM-DD`, or a full timestamp of which only the UTC date is kept.
fn purchase_day<'de, D: Deserializer<'de>>(de: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(de)?;
    parse_purchase_day(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("bad purchase date '{raw}'")))
}

pub fn parse_purchase_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc).date_naive())
    })
}
