//! # pay-adapter
//!
//! Amazon Pay v2 payment-lifecycle service.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export AMAZON_PAY_CLIENT_ID=amzn1.application-oa2-client.xxxx
//! export AMAZON_PAY_CHECKOUT_REVIEW_URL=https://shop.example.com/checkout/review
//! export STORES_CONFIG=config/stores.toml
//!
//! # Run the server
//! pay-adapter
//! ```

use pay_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Default store: {}", state.config.default_store_id);
    if state.offline {
        info!("Offline mode: gateway calls are recorded, not sent");
    }

    let app = routes::create_router(state);

    info!("pay-adapter listening on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Authorize: POST http://{}/api/v1/authorize", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  pay-adapter
  -----------
  Amazon Pay v2 payment lifecycle
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
