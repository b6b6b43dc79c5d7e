//! Application service: the hexagonal core.
//!
//! [`GatewayService`] owns the configuration reconciler, the data fetch
//! scheduler and the telemetry dictionary. All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! an in-memory bank.
//!
//! ```text
//!  AppCommand ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │        GatewayService        │
//!   PortBank ◀────│ reconcile · schedule · watch │
//!                 └──────────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::GatewayConfig;
use crate::pins::{PortIndex, PortKind};
use crate::reconcile::ConfigManager;
use crate::scheduler::DataFetchScheduler;
use crate::telemetry::TelemetryDictionary;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{EventSink, PortBank};

// ───────────────────────────────────────────────────────────────
// GatewayService
// ───────────────────────────────────────────────────────────────

pub struct GatewayService {
    config: GatewayConfig,
    manager: ConfigManager,
    scheduler: DataFetchScheduler,
    dictionary: TelemetryDictionary,
    tick_count: u64,
}

impl GatewayService {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            manager: ConfigManager::new(config.bank),
            scheduler: DataFetchScheduler::new(&config),
            dictionary: TelemetryDictionary::new(),
            tick_count: 0,
            config,
        }
    }

    // ── Commands ──────────────────────────────────────────────

    pub fn handle_command<B: PortBank>(&mut self, cmd: AppCommand, bank: &mut B, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::ApplyDesired(payload) => {
                let outcome = self.manager.load_and_apply(&payload, &mut self.dictionary);
                if outcome.accepted {
                    self.scheduler.reinit(
                        self.manager.fetch_items(),
                        self.manager.watch_items(),
                        self.manager.output_items(),
                        bank,
                    );
                    self.manager.clear_pending_flags();
                }
                sink.emit(&AppEvent::PropertiesReported {
                    status: outcome.status,
                    acks: outcome.acks,
                });
            }
            AppCommand::WriteOutput { port, level } => {
                let layout = self.config.bank;
                let Some(index) = PortIndex::from_key_number(layout, PortKind::Output, port) else {
                    warn!("write to unknown output port {}", port);
                    return;
                };
                match bank.write_level(layout.output_pin(index), level) {
                    Ok(()) => {
                        info!("{}{} written {}", layout.output_token(), port, u8::from(level));
                        sink.emit(&AppEvent::OutputWritten { port, level });
                    }
                    Err(e) => warn!("{}{} write failed: {}", layout.output_token(), port, e),
                }
            }
            AppCommand::QueryVersion => match bank.read_version() {
                Ok(version) => sink.emit(&AppEvent::Version(version)),
                Err(e) => warn!("version query failed: {}", e),
            },
        }
    }

    // ── Tick ──────────────────────────────────────────────────

    /// One host tick. Emits a telemetry event when anything was sampled.
    pub fn tick<B: PortBank>(&mut self, bank: &mut B, sink: &mut impl EventSink) {
        self.tick_count += 1;
        let batch = self.scheduler.tick(bank);
        if !batch.is_empty() {
            sink.emit(&AppEvent::Telemetry(batch));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn manager(&self) -> &ConfigManager {
        &self.manager
    }

    pub fn scheduler(&self) -> &DataFetchScheduler {
        &self.scheduler
    }

    pub fn dictionary(&self) -> &TelemetryDictionary {
        &self.dictionary
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
