//! Message-passing runtime connecting sampler triggers, the relay, and the
//! bridge protocol handler.
//!
//! Each trigger publishes readings onto a typed command channel consumed by a
//! single worker thread; the embedding feeds web-originated messages through
//! the same channel and drains responses from the event channel. Publishing
//! never blocks on delivery, which preserves the fire-and-forget contract for
//! both triggers and removes the background-send stall the OS execution
//! window cannot afford.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use geo_courier_core::{PositionReading, Provenance};
use geo_courier_dispatch::RelayOutcome;
use geo_courier_sampler::{
    BACKGROUND_TASK_NAME, PermissionGrant, PositionSource, SamplerConfig, active_triggers,
};

use crate::AppContext;

/// Commands consumed by the runtime worker.
#[derive(Debug)]
pub enum RuntimeCommand {
    /// One position reading from a trigger.
    Sample {
        /// Raw reading delivered by the position source.
        reading: PositionReading,
        /// Trigger that produced the reading.
        provenance: Provenance,
    },
    /// One raw message from the hosted web content.
    BridgeInbound(String),
    /// Stop the worker loop.
    Shutdown,
}

/// Events emitted by the runtime worker.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// One reading went through the relay.
    SampleRelayed {
        /// Trigger that produced the reading.
        provenance: Provenance,
        /// Cache/transmission outcome.
        outcome: RelayOutcome,
    },
    /// Response to post back over the browser message channel.
    BridgeOutbound(String),
}

/// Running pipeline: one worker thread plus the permitted trigger runners.
pub struct Runtime {
    command_tx: Sender<RuntimeCommand>,
    event_rx: Receiver<RuntimeEvent>,
    worker_join: JoinHandle<()>,
    trigger_stops: Vec<Sender<()>>,
    trigger_joins: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Starts the worker and every trigger the permission grant allows.
    ///
    /// Trigger activation follows the startup grant: no foreground permission
    /// means no triggers at all; the background runner additionally requires
    /// the background grant.
    pub fn start(
        context: AppContext,
        config: SamplerConfig,
        source: Arc<dyn PositionSource>,
        grant: PermissionGrant,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker_join = std::thread::spawn(move || worker_loop(&context, &command_rx, &event_tx));

        let mut trigger_stops = Vec::new();
        let mut trigger_joins = Vec::new();
        for provenance in active_triggers(grant) {
            let (stop_tx, stop_rx) = mpsc::channel();
            trigger_stops.push(stop_tx);
            trigger_joins.push(spawn_trigger(
                provenance,
                config,
                source.clone(),
                command_tx.clone(),
                stop_rx,
            ));
        }

        Self {
            command_tx,
            event_rx,
            worker_join,
            trigger_stops,
            trigger_joins,
        }
    }

    /// Forwards one raw message from the hosted web content.
    pub fn bridge_send(&self, raw: impl Into<String>) {
        if self
            .command_tx
            .send(RuntimeCommand::BridgeInbound(raw.into()))
            .is_err()
        {
            tracing::warn!("bridge message dropped: runtime worker is gone");
        }
    }

    /// Returns the event channel drained by the embedding.
    pub fn events(&self) -> &Receiver<RuntimeEvent> {
        &self.event_rx
    }

    /// Stops triggers and the worker, then joins all threads.
    pub fn shutdown(self) {
        drop(self.trigger_stops);
        for join in self.trigger_joins {
            let _ = join.join();
        }

        let _ = self.command_tx.send(RuntimeCommand::Shutdown);
        let _ = self.worker_join.join();
    }
}

fn worker_loop(
    context: &AppContext,
    command_rx: &Receiver<RuntimeCommand>,
    event_tx: &Sender<RuntimeEvent>,
) {
    while let Ok(command) = command_rx.recv() {
        match command {
            RuntimeCommand::Sample {
                reading,
                provenance,
            } => match context.relay.relay(reading, provenance) {
                Ok(outcome) => {
                    let _ = event_tx.send(RuntimeEvent::SampleRelayed {
                        provenance,
                        outcome,
                    });
                }
                Err(error) => {
                    tracing::error!(error = %error, ?provenance, "sample relay failed");
                }
            },
            RuntimeCommand::BridgeInbound(raw) => {
                if let Some(response) = context.bridge.handle(&raw) {
                    let _ = event_tx.send(RuntimeEvent::BridgeOutbound(response));
                }
            }
            RuntimeCommand::Shutdown => break,
        }
    }
}

fn spawn_trigger(
    provenance: Provenance,
    config: SamplerConfig,
    source: Arc<dyn PositionSource>,
    command_tx: Sender<RuntimeCommand>,
    stop_rx: Receiver<()>,
) -> JoinHandle<()> {
    if provenance == Provenance::Background {
        tracing::info!(task = BACKGROUND_TASK_NAME, "background trigger registered");
    }

    std::thread::spawn(move || {
        let interval = Duration::from_millis(config.deferral_interval_ms);

        loop {
            match source.current_position() {
                Ok(reading) => {
                    if command_tx
                        .send(RuntimeCommand::Sample {
                            reading,
                            provenance,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(error) => {
                    // Each tick is an independent attempt; no backoff.
                    tracing::error!(error = %error, ?provenance, "position source failed; tick aborted");
                }
            }

            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {}
                _ => break,
            }
        }
    })
}
