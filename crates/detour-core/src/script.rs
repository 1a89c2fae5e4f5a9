//! The content script reactor
//!
//! A single-threaded state owner. Every input is a [`PageEvent`]; the only scheduled
//! work is the debounced embed scan. [`ContentScript::handle`] and
//! [`ContentScript::fire_due`] are synchronous, and [`ContentScript::run`] drives both
//! from a channel and the scan deadline on one task.

use tokio::sync::mpsc;
use tokio::time::Instant;

use detour_embeds::{Document, EmbedInterceptor, ScanOutcome};
use detour_navigation::{ClickDecision, ClickEvent, LinkInterceptor};
use detour_storage::Database;

use crate::config::Config;
use crate::events::{Disposition, Mutation, PageEvent};
use crate::host::Host;
use crate::messages::{
    ConfigUpdate, EmbedAction, ExternalLaunch, FrameMessage, OutboundMessage, PlaceholderMessage,
};
use crate::scheduler::ScanScheduler;
use crate::settings::Settings;
use crate::Result;

/// Preference key holding the last-used button label.
pub const BUTTON_LABEL_KEY: &str = "buttonLabel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Detached,
    /// No body yet; retrying on the next animation frame
    WaitingForRoot,
    Attached,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Debounced scans that fired, including ones skipped by the readiness gate
    pub scans: usize,
    pub intercepted: usize,
    pub restored: usize,
    /// Triggers absorbed by an already pending scan
    pub coalesced: usize,
}

pub struct ContentScript<D: Document, H: Host> {
    config: Config,
    document: D,
    host: H,
    storage: Database,
    settings: Settings,
    interceptor: EmbedInterceptor<D::Frame>,
    scheduler: ScanScheduler,
    observer: ObserverState,
    stats: ScanStats,
}

impl<D: Document, H: Host> ContentScript<D, H> {
    pub fn new(config: Config, document: D, host: H, storage: Database) -> Result<Self> {
        config.validate()?;

        let placeholder = config.placeholder()?;
        let label = load_label(&storage, &config.default_button_label);

        Ok(Self {
            settings: Settings::new(label),
            interceptor: EmbedInterceptor::new(placeholder),
            scheduler: ScanScheduler::new(config.scan_debounce()),
            observer: ObserverState::Detached,
            stats: ScanStats::default(),
            config,
            document,
            host,
            storage,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn interceptor(&self) -> &EmbedInterceptor<D::Frame> {
        &self.interceptor
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn observer_state(&self) -> ObserverState {
        self.observer
    }

    pub fn stats(&self) -> ScanStats {
        ScanStats {
            coalesced: self.scheduler.coalesced(),
            ..self.stats
        }
    }

    pub fn scan_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Startup work that does not wait for the DOM: the initial theme report.
    pub fn start(&mut self) {
        if self.config.is_top_level {
            let is_dark = self.host.prefers_dark();
            self.host.send(OutboundMessage::ThemeChanged { is_dark });
        }

        tracing::info!(top_level = self.config.is_top_level, "Content script started");
    }

    pub fn handle(&mut self, event: PageEvent, now: Instant) -> Disposition {
        tracing::trace!(kind = event.kind(), "Handling page event");

        match event {
            PageEvent::DomReady => {
                self.start_observer();
                self.schedule_scan(now);
            }
            PageEvent::AnimationFrame => {
                if self.observer == ObserverState::WaitingForRoot {
                    self.start_observer();
                }
            }
            PageEvent::Mutations(mutations) => self.handle_mutations(&mutations, now),
            PageEvent::Config(update) => self.handle_config(&update, now),
            PageEvent::FrameMessage(message) => self.handle_frame_message(&message),
            PageEvent::Click { event, reply } => {
                let disposition = self.handle_click(&event);
                if let Some(reply) = reply {
                    let _ = reply.send(disposition);
                }
                return disposition;
            }
            PageEvent::ThemeChanged { is_dark } => {
                if self.config.is_top_level {
                    self.host.send(OutboundMessage::ThemeChanged { is_dark });
                }
            }
        }

        Disposition::Continue
    }

    /// Run the pending scan if its deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> Option<ScanOutcome> {
        if self.scheduler.take_due(now) {
            Some(self.run_scan())
        } else {
            None
        }
    }

    /// Drive the script from `events` until the sender side closes.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<PageEvent>) -> Self {
        self.start();

        loop {
            let deadline = self.scheduler.deadline();

            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle(event, Instant::now());
                    }
                    None => break,
                },
                _ = sleep_until(deadline) => {
                    self.fire_due(Instant::now());
                }
            }
        }

        tracing::debug!(stats = ?self.stats(), "Content script event loop finished");

        self
    }

    fn start_observer(&mut self) {
        if self.observer == ObserverState::Attached {
            return;
        }

        if !self.document.has_observation_root() {
            tracing::debug!("No observation root yet, retrying next frame");
            self.observer = ObserverState::WaitingForRoot;
            self.host.request_animation_frame();
            return;
        }

        self.observer = ObserverState::Attached;
        tracing::debug!("Mutation observer attached");
    }

    fn schedule_scan(&mut self, now: Instant) {
        if self.scheduler.schedule(now) {
            tracing::debug!("Scheduled embed scan");
        }
    }

    fn handle_mutations(&mut self, mutations: &[Mutation], now: Instant) {
        if self.observer != ObserverState::Attached || !self.settings.monitors_mutations() {
            return;
        }

        if mutations.iter().any(Mutation::affects_embeds) {
            self.schedule_scan(now);
        }
    }

    fn handle_config(&mut self, update: &ConfigUpdate, now: Instant) {
        let change = self.settings.apply(update);

        if let Some(label) = change.label.as_deref() {
            if let Err(e) = self.storage.set_setting(BUTTON_LABEL_KEY, label) {
                tracing::warn!(error = %e, "Failed to persist button label");
            }
        }

        if change.rescan {
            self.schedule_scan(now);
        }
    }

    fn run_scan(&mut self) -> ScanOutcome {
        self.stats.scans += 1;

        if !self.settings.is_ready() {
            tracing::debug!("Skipping scan until settings arrive");
            return ScanOutcome::default();
        }

        let Some(behavior) = self.settings.behavior() else {
            tracing::debug!("Skipping scan, interception behavior unknown");
            return ScanOutcome::default();
        };

        let outcome =
            self.interceptor
                .scan(&self.document, behavior, self.settings.button_label());

        self.stats.intercepted += outcome.intercepted;
        self.stats.restored += outcome.restored;

        tracing::debug!(
            behavior = %behavior,
            intercepted = outcome.intercepted,
            restored = outcome.restored,
            "Embed scan finished"
        );

        outcome
    }

    fn handle_frame_message(&mut self, message: &FrameMessage) {
        if message.origin != self.interceptor.placeholder().origin() {
            tracing::debug!(origin = %message.origin, "Dropping message from foreign origin");
            return;
        }

        let Some(PlaceholderMessage::EmbedAction { action }) = message.placeholder_message() else {
            tracing::debug!("Dropping malformed placeholder message");
            return;
        };

        let Some(frame) = message
            .source
            .and_then(|window| self.interceptor.find_by_window(window))
        else {
            tracing::debug!("No tracked embed for placeholder message");
            return;
        };

        match action {
            EmbedAction::OpenExternal => {
                let Some(original) = self.interceptor.original_source(&frame) else {
                    return;
                };
                let launch = ExternalLaunch::new(&self.config, original);
                tracing::info!(uri = %launch.player_uri, "Opening embed in alternate player");
                self.host.launch_external(&launch);
            }
            EmbedAction::KeepOriginal => {
                self.interceptor.restore(&frame, true);
            }
        }
    }

    fn handle_click(&mut self, event: &ClickEvent) -> Disposition {
        if !self.config.is_top_level {
            return Disposition::Continue;
        }

        let location = self.document.location();
        let decision = LinkInterceptor::new(
            &location,
            self.settings.rules(),
            self.settings.auto_redirect(),
        )
        .decide(event);

        match decision {
            ClickDecision::Redirect(url) => {
                self.host.send(OutboundMessage::LinkRedirect { url });
                Disposition::PreventDefault
            }
            ClickDecision::Ignore(_) => Disposition::Continue,
        }
    }
}

fn load_label(storage: &Database, default_label: &str) -> String {
    match storage.get_setting(BUTTON_LABEL_KEY) {
        Ok(Some(label)) if !label.is_empty() => label,
        Ok(_) => default_label.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stored button label");
            default_label.to_string()
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
