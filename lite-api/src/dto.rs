//! Client-facing request/response contract of the search endpoint.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

use crate::client::{HotelIds, Stay, SupplierSearchRequest};
use crate::model::{
    Country, Currency, DateString, IntegerList, OccupancyList, ParseError, ValidationError,
};

// ------------------------------------------------------------------ //
//  Errors                                                             //
// ------------------------------------------------------------------ //

/// First rule a [`SearchRequest`] breaks.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("same day check in and out is not allowed")]
    SameDayCheckInAndOut,
    #[error("check in after check out is not allowed")]
    CheckInAfterCheckOut,
    #[error("empty hotel ids")]
    EmptyHotelIds,
}

#[derive(Debug, Error)]
#[error("invalid search request: {0}")]
pub struct TransformError(#[from] pub ParseError);

// ------------------------------------------------------------------ //
//  Inbound (client → lite-api)                                        //
// ------------------------------------------------------------------ //

/// Query string of `GET /hotels/`.
///
/// Binding only checks that the required parameters are present and
/// non-empty; their content is checked by [`SearchRequest::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "checkin", deserialize_with = "required")]
    pub check_in: DateString,
    #[serde(rename = "checkout", deserialize_with = "required")]
    pub check_out: DateString,
    #[serde(deserialize_with = "required")]
    pub currency: Currency,
    #[serde(rename = "guestNationality", default)]
    pub guest_nationality: Country,
    #[serde(rename = "hotelIds", deserialize_with = "required")]
    pub hotel_ids: IntegerList,
    #[serde(deserialize_with = "required")]
    pub occupancies: OccupancyList,
}

fn required<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.trim().is_empty() {
        return Err(de::Error::custom("required value is empty"));
    }
    Ok(T::from(raw))
}

impl SearchRequest {
    /// Checks the request in a fixed order and stops at the first failure.
    pub fn validate(&self) -> Result<(), RequestError> {
        let check_in = self.check_in.parse()?;
        let check_out = self.check_out.parse()?;

        if check_in == check_out {
            return Err(RequestError::SameDayCheckInAndOut);
        }
        if check_in > check_out {
            return Err(RequestError::CheckInAfterCheckOut);
        }

        self.currency.validate()?;
        self.guest_nationality.validate()?;

        if self.hotel_ids.parse()?.is_empty() {
            return Err(RequestError::EmptyHotelIds);
        }

        self.occupancies.parse()?.validate()?;

        Ok(())
    }

    /// Build the supplier request. Re-parses hotel ids and occupancies, so
    /// an unvalidated request can still fail here.
    pub fn transform(&self) -> Result<SupplierSearchRequest, TransformError> {
        let occupancies = self.occupancies.parse()?;
        let hotel_ids = self.hotel_ids.parse()?;

        Ok(SupplierSearchRequest {
            stay: Stay {
                check_in: self.check_in.to_string(),
                check_out: self.check_out.to_string(),
            },
            occupancies,
            hotels: HotelIds { hotel: hotel_ids },
        })
    }
}

// ------------------------------------------------------------------ //
//  Outbound (lite-api → client)                                       //
// ------------------------------------------------------------------ //

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub data: Vec<HotelInfo>,
    pub supplier: SupplierPayload,
}

/// Price of one hotel in the requested currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelInfo {
    pub hotel_id: String,
    pub currency: String,
    pub price: f64,
}

/// Verbatim supplier exchange, embedded as JSON rather than as strings.
#[derive(Debug, Serialize, Deserialize)]
pub struct SupplierPayload {
    pub request: Box<RawValue>,
    pub response: Box<RawValue>,
}

// ------------------------------------------------------------------ //
//  Tests                                                              //
// ------------------------------------------------------------------ //
