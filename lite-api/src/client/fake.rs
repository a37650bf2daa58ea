//! In-memory [`HotelSupplier`] that records requests and replays a canned
//! outcome.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{HotelSupplier, SupplierError, SupplierSearchRequest, SupplierSearchResponse};

#[derive(Debug, Clone)]
enum Outcome {
    Respond(SupplierSearchResponse),
    Reject {
        status: StatusCode,
        code: String,
        message: String,
    },
    Panic,
}

#[derive(Debug, Clone)]
pub struct FakeSupplier {
    outcome: Outcome,
    pub requests: Arc<Mutex<Vec<SupplierSearchRequest>>>,
}

impl FakeSupplier {
    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            requests: Arc::default(),
        }
    }

    /// Answers every search with `response`.
    pub fn responding(response: SupplierSearchResponse) -> Self {
        Self::with_outcome(Outcome::Respond(response))
    }

    /// Fails every search with [`SupplierError::Api`].
    pub fn rejecting(status: StatusCode, code: &str, message: &str) -> Self {
        Self::with_outcome(Outcome::Reject {
            status,
            code: code.to_string(),
            message: message.to_string(),
        })
    }

    /// Panics inside every search.
    pub fn panicking() -> Self {
        Self::with_outcome(Outcome::Panic)
    }

    /// Requests received so far, oldest first.
    pub fn snapshot(&self) -> Vec<SupplierSearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HotelSupplier for FakeSupplier {
    async fn search(
        &self,
        request: &SupplierSearchRequest,
    ) -> Result<SupplierSearchResponse, SupplierError> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.outcome {
            Outcome::Respond(response) => Ok(response.clone()),
            Outcome::Reject {
                status,
                code,
                message,
            } => Err(SupplierError::Api {
                status: *status,
                code: code.clone(),
                message: message.clone(),
            }),
            Outcome::Panic => panic!("fake supplier panicked"),
        }
    }
}
