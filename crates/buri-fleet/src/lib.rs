pub mod address;
pub mod client;
pub mod error;
pub mod http;

pub use client::{DrainOutcome, DrainPolicy, FleetClient, Registration, PAGE_LIMIT};
pub use error::{FleetError, HttpError};
pub use http::{HttpClient, HttpRequest, Method, UreqClient};
