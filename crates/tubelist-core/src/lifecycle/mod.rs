//! Navigation and lifecycle controller.
//!
//! The controller owns the page and the per-navigation [`Session`]. It reacts
//! to host events, reconciles discovered items in small batches, pumps the
//! fetch queue into spawned engine lookups, and applies their results only if
//! the navigation that requested them is still current.

mod events;
mod liveness;
mod route;
mod session;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::config::SchedulerConfig;
use crate::describe::DescriptionEngine;
use crate::dom::{Document, NodeId};
use crate::feed::{self, DescriptionSlot, Outcome};
use crate::kv::KvStore;
use crate::settings::{Settings, ViewMode};

pub use events::{HostEvent, HostMutation};
pub use liveness::{Liveness, NavToken};
pub use route::Route;
pub use session::Session;

/// A finished lookup, tagged with the generation that requested it.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub generation: u64,
    pub id: String,
    pub text: String,
}

/// What a rescan found to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescanReport {
    /// Loading placeholders filled straight from cache.
    pub refilled: usize,
    /// Loading placeholders whose ids went back into the fetch queue.
    pub enqueued: usize,
    /// Items put back into the discovery queue.
    pub rediscovered: usize,
}

pub struct Controller {
    doc: Document,
    engine: DescriptionEngine,
    settings: Settings,
    kv: Option<KvStore>,
    cfg: SchedulerConfig,
    liveness: Arc<Liveness>,
    session: Option<Session>,
    navigating: bool,
    last_location: String,
    resolved_tx: mpsc::UnboundedSender<Resolved>,
    resolved_rx: Option<mpsc::UnboundedReceiver<Resolved>>,
}

impl Controller {
    pub fn new(
        doc: Document,
        engine: DescriptionEngine,
        settings: Settings,
        cfg: SchedulerConfig,
    ) -> Self {
        let (resolved_tx, resolved_rx) = mpsc::unbounded_channel();
        Self {
            last_location: String::new(),
            doc,
            engine,
            settings,
            kv: None,
            cfg,
            liveness: Liveness::new(),
            session: None,
            navigating: false,
            resolved_tx,
            resolved_rx: Some(resolved_rx),
        }
    }

    /// Persist view-mode changes to `kv`.
    pub fn with_kv(mut self, kv: KvStore) -> Self {
        self.kv = Some(kv);
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn engine(&self) -> &DescriptionEngine {
        &self.engine
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.token.is_live())
    }

    fn augmenting(&self) -> bool {
        !self.navigating && self.settings.augments() && self.is_active()
    }

    /// Evaluate the current location and (de)activate accordingly. Called on
    /// navigation finish and when polling sees a new location.
    pub async fn activate(&mut self) {
        if self.navigating {
            return;
        }
        self.last_location = self.doc.location().to_string();
        let route = Route::parse(self.doc.location());
        let signature = match route.signature() {
            Some(sig) if self.settings.enabled => sig.to_string(),
            _ => {
                self.deactivate();
                return;
            }
        };
        if let Some(s) = &self.session {
            if s.signature == signature && s.token.is_live() {
                return;
            }
        }
        if let Some(mut old) = self.session.take() {
            let reset = old.reconciler.teardown(&mut self.doc);
            tracing::debug!(reset, "leaving previous feed instance");
        }

        let token = self.liveness.begin();
        self.engine.begin_navigation();
        self.engine.store().ensure_loaded().await;
        tracing::info!(generation = token.generation(), %signature, "feed page activated");
        self.session = Some(Session::new(token, signature, self.settings.show_descriptions));
        self.apply_view_mode();
    }

    /// Full teardown: restore the page, drop the session, stale every token.
    pub fn deactivate(&mut self) {
        self.liveness.invalidate();
        feed::set_list_layout(&mut self.doc, false);
        if let Some(mut s) = self.session.take() {
            let reset = s.reconciler.teardown(&mut self.doc);
            tracing::info!(reset, "feed page deactivated");
        }
    }

    fn apply_view_mode(&mut self) {
        let list = self.settings.view_mode == ViewMode::List;
        let Some(s) = self.session.as_mut() else {
            return;
        };
        feed::set_list_layout(&mut self.doc, list);
        if list {
            let queued = s.discovery.extend(feed::scan_items(&self.doc));
            tracing::debug!(queued, "initial feed scan");
        } else {
            s.clear_queues();
            let reset = s.reconciler.teardown(&mut self.doc);
            tracing::debug!(reset, "grid view, augmentation removed");
        }
    }

    /// Handle one host event. Returns false on shutdown.
    pub async fn handle_event(&mut self, event: HostEvent) -> bool {
        tracing::trace!(?event, "host event");
        match event {
            HostEvent::NavigateStart => {
                self.navigating = true;
                self.liveness.invalidate();
                feed::set_list_layout(&mut self.doc, false);
            }
            HostEvent::NavigateFinish { url } => {
                self.navigating = false;
                self.doc.set_location(url);
                self.activate().await;
            }
            HostEvent::Popstate { url } => self.doc.set_location(url),
            HostEvent::ItemsInserted(nodes) => self.observe(&nodes),
            HostEvent::HostMutation(mutate) => {
                let inserted = mutate(&mut self.doc);
                self.observe(&inserted);
            }
            HostEvent::SetViewMode(mode) => self.set_view_mode(mode).await,
            HostEvent::Shutdown => {
                self.shutdown().await;
                return false;
            }
        }
        true
    }

    fn observe(&mut self, nodes: &[NodeId]) {
        if !self.augmenting() {
            return;
        }
        let items = feed::collect_items(&self.doc, nodes);
        if let Some(s) = self.session.as_mut() {
            let queued = s.discovery.extend(items);
            if queued > 0 {
                tracing::trace!(queued, "feed items observed");
            }
        }
    }

    pub async fn set_view_mode(&mut self, mode: ViewMode) {
        if self.settings.view_mode == mode {
            return;
        }
        self.settings.view_mode = mode;
        if let Some(kv) = &self.kv {
            if let Err(e) = self.settings.save(kv).await {
                tracing::warn!(error = %e, "failed to save view mode");
            }
        }
        tracing::info!(%mode, "view mode changed");
        if !self.navigating {
            self.apply_view_mode();
        }
    }

    /// Location polling: a changed location without lifecycle events.
    pub async fn poll_location(&mut self) {
        if self.navigating || self.doc.location() == self.last_location {
            return;
        }
        tracing::debug!(from = %self.last_location, to = %self.doc.location(), "location changed");
        self.activate().await;
    }

    pub fn has_discovery_work(&self) -> bool {
        self.augmenting() && self.session.as_ref().is_some_and(|s| !s.discovery.is_empty())
    }

    /// Lookups the current navigation still expects results for.
    fn fetches_pending(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.token.is_live() && !s.fetches.is_idle())
    }

    /// Reconcile one batch of discovered items. Returns how many changed state.
    pub fn run_discovery_batch(&mut self) -> usize {
        if !self.augmenting() {
            return 0;
        }
        let Self {
            doc,
            engine,
            session,
            cfg,
            ..
        } = self;
        let Some(s) = session.as_mut() else {
            return 0;
        };
        let mut changed = 0;
        for item in s.discovery.next_batch(cfg.discovery_batch_size) {
            let outcome = s
                .reconciler
                .reconcile(doc, item, |id| engine.cached(id.as_str()));
            match outcome {
                Outcome::Augmented {
                    video_id,
                    description,
                } => {
                    changed += 1;
                    if description == DescriptionSlot::Loading {
                        s.fetches.enqueue(video_id.as_str());
                    }
                }
                Outcome::Ignored(kind) => {
                    changed += 1;
                    tracing::trace!(item = item.index(), kind = kind.as_str(), "item not augmented");
                }
                Outcome::Skipped(reason) => {
                    tracing::debug!(item = item.index(), ?reason, "item skipped, will retry");
                }
                Outcome::AlreadyProcessed => {}
            }
        }
        self.pump();
        changed
    }

    /// Start queued lookups while under the engine's concurrency cap.
    pub fn pump(&mut self) {
        if !self.augmenting() {
            return;
        }
        let Some(s) = self.session.as_mut() else {
            return;
        };
        while let Some(id) = s.fetches.start_next(self.engine.max_concurrent()) {
            let engine = self.engine.clone();
            let token = s.token.clone();
            let tx = self.resolved_tx.clone();
            tokio::spawn(async move {
                let text = engine.fetch_description_while(&id, &token).await;
                let _ = tx.send(Resolved {
                    generation: token.generation(),
                    id,
                    text,
                });
            });
        }
    }

    /// Apply a finished lookup to every mounted placeholder for its id, unless
    /// the navigation that asked for it is over.
    pub fn apply_resolved(&mut self, resolved: Resolved) {
        let Some(s) = self.session.as_mut() else {
            tracing::trace!(id = %resolved.id, "discarding description, no session");
            return;
        };
        if s.token.generation() != resolved.generation || !s.token.is_live() {
            tracing::trace!(id = %resolved.id, "discarding stale description");
            return;
        }
        s.fetches.complete(&resolved.id);
        if self.settings.view_mode == ViewMode::List {
            let filled = feed::fill_placeholders(&mut self.doc, &resolved.id, &resolved.text);
            tracing::debug!(id = %resolved.id, filled, "description applied");
        }
        self.pump();
    }

    /// Self-healing pass: refill or re-enqueue loading placeholders that no
    /// fetch is working on, and re-discover items that are unmarked or were
    /// recycled for another video.
    pub fn rescan(&mut self) -> RescanReport {
        let mut report = RescanReport::default();
        if !self.augmenting() {
            return report;
        }
        let Self {
            doc,
            engine,
            session,
            ..
        } = self;
        let Some(s) = session.as_mut() else {
            return report;
        };
        for (_, id) in feed::loading_placeholders(doc) {
            if s.fetches.is_tracked(&id) {
                continue;
            }
            match engine.cached(&id) {
                Some(text) => {
                    report.refilled += feed::fill_placeholders(doc, &id, &text);
                }
                None => {
                    if s.fetches.enqueue(&id) {
                        report.enqueued += 1;
                    }
                }
            }
        }
        for item in feed::scan_items(doc) {
            if s.reconciler.needs_reconcile(doc, item) && s.discovery.push(item) {
                report.rediscovered += 1;
            }
        }
        if report != RescanReport::default() {
            tracing::debug!(?report, "rescan");
        }
        self.pump();
        report
    }

    /// Stop: restore the page and write the store.
    pub async fn shutdown(&mut self) {
        self.deactivate();
        if let Err(e) = self.engine.store().flush().await {
            tracing::warn!(error = %e, "final description store write failed");
        }
    }

    async fn drain_discovery(&mut self) -> usize {
        let mut changed = 0;
        while self.has_discovery_work() {
            changed += self.run_discovery_batch();
            tokio::task::yield_now().await;
        }
        changed
    }

    /// Drive discovery, fetches and rescans until nothing is left to do.
    pub async fn run_until_idle(&mut self) {
        let Some(mut resolved_rx) = self.resolved_rx.take() else {
            return;
        };
        loop {
            self.poll_location().await;
            let changed = self.drain_discovery().await;
            if self.fetches_pending() {
                match resolved_rx.recv().await {
                    Some(r) => self.apply_resolved(r),
                    None => break,
                }
                continue;
            }
            if changed > 0 {
                continue;
            }
            let report = self.rescan();
            let changed = self.drain_discovery().await;
            if report.refilled + report.enqueued + changed == 0 && !self.fetches_pending() {
                break;
            }
        }
        self.resolved_rx = Some(resolved_rx);
    }

    /// Event loop: host events, finished lookups, idle discovery batches and
    /// the rescan, location-poll and store-prune ticks. Returns on shutdown or
    /// when the event channel closes.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<HostEvent>) {
        let Some(mut resolved_rx) = self.resolved_rx.take() else {
            return;
        };
        let mut rescan = tokio::time::interval(self.cfg.rescan_interval());
        let mut poll = tokio::time::interval(self.cfg.url_poll_interval());
        let mut prune = tokio::time::interval(self.engine.store().config().prune_interval());
        for tick in [&mut rescan, &mut poll, &mut prune] {
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        loop {
            let idle_work = self.has_discovery_work();
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        self.shutdown().await;
                        break;
                    };
                    if !self.handle_event(event).await {
                        break;
                    }
                }
                Some(resolved) = resolved_rx.recv() => self.apply_resolved(resolved),
                _ = tokio::task::yield_now(), if idle_work => {
                    self.run_discovery_batch();
                }
                _ = rescan.tick() => {
                    self.rescan();
                }
                _ = poll.tick() => self.poll_location().await,
                _ = prune.tick() => {
                    self.engine.store().prune();
                }
            }
        }
        self.resolved_rx = Some(resolved_rx);
    }
}
