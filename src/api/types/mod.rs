//! API request and response types

pub mod decision;
pub mod error;
pub mod json;

pub use decision::{
    CleanupQueryParams, CleanupResponse, DecisionRequest, DecisionResponse, ProcessResponse,
    ProcessStartResponse, ProcessesListResponse, ProcessesQueryParams, RunQueryParams,
};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
