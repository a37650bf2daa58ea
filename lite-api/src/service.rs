//! Hotel search: turns a validated client request into a supplier call and
//! reshapes the supplier answer into the client response.

use std::sync::Arc;

use serde::Serialize;
use serde_json::value::RawValue;
use thiserror::Error;
use tracing::debug;

use crate::client::{Hotel, HotelSupplier, SupplierError};
use crate::dto::{HotelInfo, SearchRequest, SearchResponse, SupplierPayload, TransformError};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Supplier(#[from] SupplierError),
    #[error("error encoding supplier payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct HotelService {
    supplier: Arc<dyn HotelSupplier>,
}

impl HotelService {
    pub fn new(supplier: Arc<dyn HotelSupplier>) -> Self {
        Self { supplier }
    }

    /// Run one search. The request is expected to have passed
    /// [`SearchRequest::validate`].
    pub async fn search(&self, req: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let supplier_req = req.transform()?;
        let supplier_resp = self.supplier.search(&supplier_req).await?;

        let currency = req.currency.as_str();
        let data: Vec<HotelInfo> = supplier_resp
            .hotels
            .hotels
            .iter()
            .filter_map(|hotel| priced_in(hotel, currency))
            .collect();

        debug!(
            offered = supplier_resp.hotels.hotels.len(),
            kept = data.len(),
            currency,
            "filtered supplier hotels"
        );

        Ok(SearchResponse {
            data,
            supplier: SupplierPayload {
                request: raw_json(&supplier_req)?,
                response: raw_json(&supplier_resp)?,
            },
        })
    }
}

/// Keeps a hotel only when it is quoted in `currency` with a numeric minimum
/// rate.
fn priced_in(hotel: &Hotel, currency: &str) -> Option<HotelInfo> {
    if hotel.currency != currency {
        return None;
    }
    let price = hotel.min_rate.parse::<f64>().ok()?;
    if !price.is_finite() {
        return None;
    }
    Some(HotelInfo {
        hotel_id: hotel.code.to_string(),
        currency: hotel.currency.clone(),
        price,
    })
}

fn raw_json<T: Serialize>(value: &T) -> Result<Box<RawValue>, serde_json::Error> {
    RawValue::from_string(serde_json::to_string(value)?)
}

// ------------------------------------------------------------------ //
//  Tests                                                              //
// ------------------------------------------------------------------ //
