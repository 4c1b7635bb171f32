pub mod config;
pub mod encoding;
pub mod endpoint;
pub mod error;
pub mod router;
pub mod service;

pub use config::ServiceConfig;
pub use endpoint::{Endpoint, HttpHeaders, HttpMethod, HttpTask, Parameters};
pub use error::{EncodingError, NetworkError};
pub use router::{build_request, Router, Transport, TransportResponse, REQUEST_TIMEOUT};
pub use service::{TopGamesRoute, TopGamesService};
