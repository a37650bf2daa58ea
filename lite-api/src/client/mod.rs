//! Supplier contract: the wire shapes exchanged with the hotel inventory
//! supplier and the [`HotelSupplier`] capability the search service calls.

pub mod fake;
pub mod hotelbeds;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Occupancies;

pub use fake::FakeSupplier;
pub use hotelbeds::{HotelbedsClient, HotelbedsConfig};

// ------------------------------------------------------------------ //
//  Outbound request                                                   //
// ------------------------------------------------------------------ //

/// Availability request in the shape the supplier expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierSearchRequest {
    pub stay: Stay,
    pub occupancies: Occupancies,
    pub hotels: HotelIds,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stay {
    pub check_in: String,
    pub check_out: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelIds {
    pub hotel: Vec<i64>,
}

// ------------------------------------------------------------------ //
//  Inbound response                                                   //
// ------------------------------------------------------------------ //

// Every field is optional on decode: the supplier omits whatever does not
// apply and we only consume `code`, `currency` and `minRate`.

/// Full supplier availability response. Also used to decode error bodies,
/// which carry the nested `error` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplierSearchResponse {
    pub audit_data: AuditData,
    pub hotels: HotelsInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SupplierErrorBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditData {
    pub process_time: String,
    pub timestamp: String,
    pub request_host: String,
    pub server_id: String,
    pub environment: String,
    pub release: String,
    pub token: String,
    pub internal: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HotelsInfo {
    pub hotels: Vec<Hotel>,
    pub check_in: String,
    pub total: i64,
    pub check_out: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hotel {
    pub code: i64,
    pub name: String,
    pub category_code: String,
    pub category_name: String,
    pub destination_code: String,
    pub destination_name: String,
    pub zone_code: i64,
    pub zone_name: String,
    pub latitude: String,
    pub longitude: String,
    pub rooms: Vec<Room>,
    /// Decimal amount as text, e.g. `"364.22"`.
    pub min_rate: String,
    pub max_rate: String,
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Room {
    pub code: String,
    pub name: String,
    pub rates: Vec<Rate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rate {
    pub rate_key: String,
    pub rate_class: String,
    pub rate_type: String,
    pub net: String,
    pub allotment: i64,
    pub payment_type: String,
    pub packaging: bool,
    pub board_code: String,
    pub board_name: String,
    pub cancellation_policies: Vec<CancellationPolicy>,
    pub taxes: TaxInfo,
    pub rooms: i32,
    pub adults: i32,
    pub children: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CancellationPolicy {
    pub amount: String,
    pub from: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxInfo {
    pub taxes: Vec<Tax>,
    pub all_included: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tax {
    pub included: bool,
    pub amount: String,
    pub currency: String,
    pub client_amount: String,
    pub client_currency: String,
}

/// Nested error object of a non-2xx supplier response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupplierErrorBody {
    pub code: String,
    pub message: String,
}

/// Flat `{"error": "..."}` body sent with auth and throttling failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimpleErrorBody {
    pub error: String,
}

// ------------------------------------------------------------------ //
//  Errors                                                             //
// ------------------------------------------------------------------ //

#[derive(Debug, Error)]
pub enum SupplierError {
    /// The supplier answered with a non-200 status.
    #[error("code: {code} | message: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
    /// Connection, timeout, URL or request-building failure.
    #[error("supplier request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("error decoding supplier response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("error encoding supplier request: {0}")]
    Encode(#[source] serde_json::Error),
}

// ------------------------------------------------------------------ //
//  Trait                                                              //
// ------------------------------------------------------------------ //

/// Executes availability searches against the supplier.
///
/// Dropping the returned future aborts the call.
#[async_trait]
pub trait HotelSupplier: Send + Sync {
    async fn search(
        &self,
        request: &SupplierSearchRequest,
    ) -> Result<SupplierSearchResponse, SupplierError>;
}
