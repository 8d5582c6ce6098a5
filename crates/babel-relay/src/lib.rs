//! # Babel Relay
//!
//! The forwarding half of a REST gateway for Babel services. Routes come
//! from the REST bindings of a validated tree; inbound values are coerced
//! into a JSON argument object and relayed to the Babel endpoint by a fixed
//! pool of workers sharing one keep-alive client.
//!
//! ```text
//! ValidatedIdl ──plan_routes──▶ [Route { REST | Babel, method, path, binding }]
//!
//! RequestInputs ──assemble_arguments──▶ { "param": value, .. }
//!               ──relay_request──────▶ RelayRequest ──▶ RelayClient::submit
//!                                                          │
//!                     slot + mpsc(pool_size) ◀─────────────┘
//!                                    │
//!                    worker 0..pool_size ──Transport::send──▶ Babel service
//!                                    │
//!                  oneshot reply ◀───┘
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod pool;
pub mod transport;

pub use config::{RelayConfig, parse_duration};
pub use error::RelayError;
pub use gateway::{
    RequestInputs, Route, RouteKind, assemble_arguments, babel_path, destination_url, plan_routes,
    relay_request, route_path,
};
pub use pool::{RelayClient, RelayPool};
pub use transport::{HttpTransport, RelayRequest, RelayResponse, Transport, is_forwarded};
