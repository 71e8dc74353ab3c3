//! # pay-api
//!
//! HTTP API layer for pay-adapter-rs.
//!
//! Exposes the Amazon Pay adapter operations as JSON endpoints. Gateway
//! results pass through with the gateway's status code.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | PUT/GET | `/api/v1/quotes/{id}` | Register / fetch a quote |
//! | GET/PATCH | `/api/v1/checkout-sessions/{id}` | Read / update a checkout session |
//! | POST | `/api/v1/checkout-sessions/{id}/complete` | Complete a checkout session |
//! | GET | `/api/v1/charge-permissions/{id}` | Read a charge permission |
//! | POST | `/api/v1/charge-permissions/{id}/close` | Close a charge permission |
//! | POST | `/api/v1/charges` | Create a charge |
//! | GET | `/api/v1/charges/{id}` | Read a charge |
//! | POST | `/api/v1/charges/{id}/capture` | Capture a charge |
//! | POST | `/api/v1/charges/{id}/cancel` | Cancel a charge |
//! | POST | `/api/v1/refunds` | Refund a charge |
//! | GET | `/api/v1/refunds/{id}` | Read a refund |
//! | POST | `/api/v1/authorize` | Authorize payment for a quote |
//! | GET | `/api/v1/buyers/{token}` | Buyer profile |
//! | GET | `/api/v1/buttons/{login,checkout}` | Signed button payload |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
