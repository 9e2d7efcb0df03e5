//! `geo-courier` -- native core daemon for the hosted-web companion app.
//!
//! On a device this binary is embedded by the platform shell, which owns the
//! browser view and forwards its message channel into the runtime. Without an
//! embedding it starts headlessly: it selects the startup screen from the
//! persisted identity and, when `GEO_COURIER_SYNTHETIC_TICKS` is set, drives
//! the full sampling pipeline with the deterministic synthetic source.
//!
//! # Environment variables
//!
//! | Variable                           | Default                   | Description                              |
//! |------------------------------------|---------------------------|------------------------------------------|
//! | `GEO_COURIER_DOMAIN`               | `http://127.0.0.1:8080`   | Hosted-content domain and collect host   |
//! | `GEO_COURIER_DEFERRAL_INTERVAL_MS` | `10000`                   | Minimum interval between updates         |
//! | `GEO_COURIER_STORE_PATH`           | `geo-courier-store.json`  | Durable store file                       |
//! | `GEO_COURIER_FOREGROUND_GRANTED`   | granted                   | Foreground location permission override  |
//! | `GEO_COURIER_BACKGROUND_GRANTED`   | granted                   | Background location permission override  |
//! | `GEO_COURIER_SYNTHETIC_TICKS`      | unset                     | Headless drive: relay this many samples  |

use std::sync::Arc;
use std::time::Duration;

use geo_courier_app::runtime::{Runtime, RuntimeEvent};
use geo_courier_app::{
    AppContext, app_version, collect_endpoint, deferral_interval_from_env, domain_from_env,
    permission_grant_from_env, startup_shell, store_path_from_env, synthetic_ticks_from_env,
};
use geo_courier_core::{Coordinates, PositionReading};
use geo_courier_dispatch::{DispatchClient, HttpCollectTransport};
use geo_courier_sampler::{AccuracyTier, SamplerConfig, SyntheticPositionSource};
use geo_courier_store::FileStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geo_courier=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let domain = domain_from_env();
    let endpoint = collect_endpoint(&domain);
    let interval_ms = deferral_interval_from_env();
    let grant = permission_grant_from_env();

    tracing::info!(
        version = app_version(),
        domain = %domain,
        interval_ms,
        ?grant,
        "Starting geo-courier",
    );

    let store = match FileStore::open(store_path_from_env()) {
        Ok(store) => Arc::new(store),
        Err(error) => {
            tracing::error!(error = %error, "durable store unavailable");
            std::process::exit(1);
        }
    };

    let client = match DispatchClient::new(endpoint, Arc::new(HttpCollectTransport::new())) {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(error = %error, "collect endpoint rejected");
            std::process::exit(1);
        }
    };

    let context = AppContext::new(store, client);

    match startup_shell(&context.identity) {
        Ok(shell) => tracing::info!(screen = ?shell.screen(), "startup screen selected"),
        Err(error) => tracing::warn!(error = %error, "identity load failed; capture screen assumed"),
    }

    let Some(ticks) = synthetic_ticks_from_env() else {
        tracing::info!(
            "no platform embedding attached; set GEO_COURIER_SYNTHETIC_TICKS to drive the pipeline"
        );
        return;
    };

    let config = match SamplerConfig::new(AccuracyTier::BestForNavigation, interval_ms) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(error = %error, "invalid sampler configuration");
            std::process::exit(1);
        }
    };

    let source = match SyntheticPositionSource::new(demo_route(interval_ms)) {
        Ok(source) => Arc::new(source),
        Err(error) => {
            tracing::error!(error = %error, "synthetic source rejected");
            std::process::exit(1);
        }
    };

    let runtime = Runtime::start(context, config, source, grant);
    drive(&runtime, ticks, interval_ms);
    runtime.shutdown();
}

/// Drains runtime events until `ticks` samples were relayed.
fn drive(runtime: &Runtime, ticks: u64, interval_ms: u64) {
    let deadline = Duration::from_millis(interval_ms.saturating_mul(4).max(1_000));
    let mut relayed = 0_u64;

    while relayed < ticks {
        match runtime.events().recv_timeout(deadline) {
            Ok(RuntimeEvent::SampleRelayed {
                provenance,
                outcome,
            }) => {
                relayed += 1;
                tracing::info!(?provenance, ?outcome, relayed, "sample relayed");
            }
            Ok(RuntimeEvent::BridgeOutbound(response)) => {
                tracing::info!(response = %response, "bridge response");
            }
            Err(_) => {
                tracing::warn!(relayed, "no sample within deadline; stopping drive");
                break;
            }
        }
    }

    runtime.bridge_send(r#"{"type":"coordinate"}"#);
    if let Ok(RuntimeEvent::BridgeOutbound(response)) = runtime.events().recv_timeout(deadline) {
        tracing::info!(response = %response, "cached coordinate answer");
    }
}

/// Short scripted walk used by the headless drive.
fn demo_route(interval_ms: u64) -> Vec<PositionReading> {
    [
        (37.5665, 126.978),
        (37.5668, 126.9785),
        (37.5672, 126.979),
        (37.5675, 126.9796),
    ]
    .iter()
    .enumerate()
    .filter_map(|(index, (lat, lng))| {
        Coordinates::new(*lat, *lng)
            .ok()
            .map(|coordinates| PositionReading::new(coordinates, interval_ms * index as u64))
    })
    .collect()
}
