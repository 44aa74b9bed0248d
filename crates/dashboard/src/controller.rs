//! Top-level state machine tying the globe, the country list and the detail
//! panel together.
//!
//! Selection changes apply synchronously, except clearing: the panel hides at
//! once and the selected country is dropped after `panel_clear_delay`, so the
//! panel can animate out with its content. Any newer selection request cancels
//! a pending clear, and a generation counter makes a clear that already
//! started running a no-op.

use std::sync::Arc;
use std::time::Duration;

use datasync::{
    CollectionAck, CountryDetailFeed, FetchError, GlobalSentiment, GlobalSentimentFeed, HealthFeed,
    SourceStatsFeed, SyncClient, TrendsFeed,
};
use foundation::{CountryCode, SentimentBucket};
use parking_lot::{Mutex, MutexGuard};
use runtime::{Deferred, Frame, FrameClock, KeyEvent, KeyboardHub, ScopedListener};
use scene::{GlobeScene, SceneEvent};
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::filter::SentimentFilter;
use crate::layout::placement_for;
use crate::shortcuts::{Shortcut, shortcut_for};
use crate::view::{DashboardView, ViewInputs};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub selected_country: Option<CountryCode>,
    /// Only ever true while `selected_country` is set.
    pub panel_visible: bool,
    pub filter: SentimentFilter,
}

struct Selection {
    state: SelectionState,
    generation: u64,
}

/// State reachable from keyboard handlers and the deferred clear.
///
/// Lock order: `pending_clear`, `selection`, `scene`, `detail`.
struct Shared {
    panel_clear_delay: Duration,
    filter_headlines: bool,
    selection: Mutex<Selection>,
    pending_clear: Mutex<Deferred>,
    scene: Mutex<GlobeScene>,
    detail: Mutex<CountryDetailFeed>,
    global: GlobalSentimentFeed,
}

impl Shared {
    fn select_country(self: &Arc<Self>, code: Option<CountryCode>) {
        let mut pending = self.pending_clear.lock();
        if pending.cancel() {
            debug!("pending selection clear cancelled");
        }

        let mut sel = self.selection.lock();
        sel.generation += 1;
        let generation = sel.generation;

        match code {
            Some(code) => {
                info!(%code, "country selected");
                sel.state.selected_country = Some(code);
                sel.state.panel_visible = true;
                self.sync_subscribers(&sel.state);
            }
            None => {
                sel.state.panel_visible = false;
                if sel.state.selected_country.is_none() {
                    return;
                }
                debug!(
                    delay_ms = self.panel_clear_delay.as_millis() as u64,
                    "panel hidden, selection clear scheduled"
                );
                let shared = Arc::downgrade(self);
                pending.schedule(self.panel_clear_delay, move || {
                    if let Some(shared) = shared.upgrade() {
                        shared.finish_clear(generation);
                    }
                });
            }
        }
    }

    fn finish_clear(&self, generation: u64) {
        let mut sel = self.selection.lock();
        if sel.generation != generation {
            debug!(generation, current = sel.generation, "superseded selection clear ignored");
            return;
        }
        sel.state.selected_country = None;
        info!("selection cleared");
        self.sync_subscribers(&sel.state);
    }

    fn click_bucket(&self, bucket: SentimentBucket) {
        let mut sel = self.selection.lock();
        sel.state.filter = sel.state.filter.toggled(bucket);
        info!(filter = sel.state.filter.as_str(), "bucket filter changed");
        self.sync_subscribers(&sel.state);
    }

    /// Points the scene highlight and the detail feed at the current selection.
    fn sync_subscribers(&self, state: &SelectionState) {
        self.scene.lock().set_selected(state.selected_country.as_ref());
        let mut detail = self.detail.lock();
        detail.set_country(state.selected_country.clone());
        if self.filter_headlines {
            detail.set_headline_filter(state.filter.bucket());
        }
    }
}

struct Listeners {
    clear_selection: ScopedListener<Option<CountryCode>>,
    refresh: ScopedListener<()>,
}

pub struct DashboardController {
    shared: Arc<Shared>,
    client: SyncClient,
    health: HealthFeed,
    trends: TrendsFeed,
    sources: SourceStatsFeed,
    listeners: Option<Listeners>,
    clock: FrameClock,
    viewport_px: [f64; 2],
    breakpoint_px: f64,
    synced_global: Option<Arc<GlobalSentiment>>,
}

impl DashboardController {
    /// Starts every feed. Must be called from within a Tokio runtime.
    pub fn new(client: SyncClient, config: &DashboardConfig) -> Self {
        let scene = GlobeScene::default().with_rotation_speed(config.rotation_speed);
        let shared = Arc::new(Shared {
            panel_clear_delay: config.panel_clear_delay,
            filter_headlines: config.filter_headlines,
            selection: Mutex::new(Selection {
                state: SelectionState::default(),
                generation: 0,
            }),
            pending_clear: Mutex::new(Deferred::new()),
            scene: Mutex::new(scene),
            detail: Mutex::new(client.country_detail(None)),
            global: client.global_sentiment(),
        });
        Self {
            shared,
            health: client.health(),
            trends: client.trends(config.trend_hours),
            sources: client.sources(),
            client,
            listeners: None,
            clock: FrameClock::new(),
            viewport_px: [1280.0, 720.0],
            breakpoint_px: config.mobile_breakpoint_px,
            synced_global: None,
        }
    }

    /// Installs the global keyboard shortcuts on `hub`.
    pub fn mount(&mut self, hub: &KeyboardHub) {
        self.listeners = Some(Listeners {
            clear_selection: ScopedListener::new(hub.clone()),
            refresh: ScopedListener::new(hub.clone()),
        });
        self.sync_listeners();
        info!("dashboard mounted");
    }

    /// Removes the keyboard shortcuts.
    pub fn unmount(&mut self) {
        if self.listeners.take().is_some() {
            info!("dashboard unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.listeners.is_some()
    }

    pub fn select_country(&mut self, code: Option<CountryCode>) {
        self.shared.select_country(code);
        self.sync_listeners();
    }

    /// Marker click by country code: toggles that country's selection.
    pub fn click_marker(&mut self, code: &CountryCode) {
        let _ = self.shared.scene.lock().click(code);
        self.process_scene_events();
    }

    /// Click at a viewport position; selects the marker under it, if any.
    pub fn click_at(&mut self, pos_px: [f64; 2]) {
        {
            let mut scene = self.shared.scene.lock();
            if let Some(ray) = scene.camera().ray_through(pos_px) {
                let _ = scene.click_at(&ray);
            }
        }
        self.process_scene_events();
    }

    /// Hover tracking; `None` means the pointer left the viewport.
    pub fn pointer_move(&mut self, pos_px: Option<[f64; 2]>) -> Option<CountryCode> {
        let mut scene = self.shared.scene.lock();
        let ray = pos_px.and_then(|p| scene.camera().ray_through(p));
        scene.pointer_move(ray.as_ref())
    }

    pub fn drag_start(&mut self, pos_px: [f64; 2]) {
        self.shared.scene.lock().camera_mut().on_pointer_down(pos_px);
    }

    pub fn drag_move(&mut self, pos_px: [f64; 2]) {
        self.shared.scene.lock().camera_mut().on_pointer_move(pos_px);
    }

    pub fn drag_end(&mut self) {
        self.shared.scene.lock().camera_mut().on_pointer_up();
    }

    pub fn wheel(&mut self, delta: f64) {
        self.shared.scene.lock().camera_mut().on_wheel(delta);
    }

    pub fn click_bucket(&mut self, bucket: SentimentBucket) {
        self.shared.click_bucket(bucket);
    }

    pub fn set_viewport(&mut self, width_px: f64, height_px: f64) {
        self.viewport_px = [width_px, height_px];
        self.shared.scene.lock().camera_mut().set_viewport(width_px, height_px);
    }

    /// The view regained foreground focus.
    pub fn on_focus(&self) {
        debug!("focus regained, revalidating");
        self.shared.global.on_focus();
    }

    pub fn refresh(&self) {
        info!("manual refresh");
        self.shared.global.refresh();
    }

    pub fn set_trend_hours(&mut self, hours: u32) -> bool {
        self.trends.set_hours(hours)
    }

    pub async fn trigger_collection(&self) -> Result<CollectionAck, FetchError> {
        self.client.trigger_collection().await
    }

    /// One animation frame: places markers from the latest snapshot, advances
    /// the globe, and applies any selection the scene raised.
    pub fn frame(&mut self, dt_s: f64) -> Frame {
        let frame = self.clock.tick(dt_s);
        self.sync_markers();
        self.shared.scene.lock().advance(&frame);
        self.process_scene_events();
        frame
    }

    /// Re-derives listeners from current state, then the view.
    pub fn render(&mut self) -> DashboardView {
        self.sync_listeners();
        self.view()
    }

    pub fn view(&self) -> DashboardView {
        let detail = self.shared.detail.lock().state();
        DashboardView::build(ViewInputs {
            selection: self.selection(),
            placement: placement_for(self.viewport_px[0], self.breakpoint_px),
            global: self.shared.global.state(),
            detail,
            health: self.health.state(),
            trends: self.trends.state(),
            sources: self.sources.state(),
        })
    }

    pub fn selection(&self) -> SelectionState {
        self.shared.selection.lock().state.clone()
    }

    pub fn is_clear_pending(&self) -> bool {
        self.shared.pending_clear.lock().is_pending()
    }

    pub fn scene(&self) -> MutexGuard<'_, GlobeScene> {
        self.shared.scene.lock()
    }

    fn sync_markers(&mut self) {
        let Some(global) = self.shared.global.state().data else {
            return;
        };
        if self.synced_global.as_ref().is_some_and(|prev| Arc::ptr_eq(prev, &global)) {
            return;
        }
        let placed = self.shared.scene.lock().sync_markers(
            global
                .countries
                .iter()
                .map(|c| (c.country_code.clone(), c.sentiment_score)),
        );
        debug!(placed, reported = global.countries.len(), "markers synced");
        self.synced_global = Some(global);
    }

    fn process_scene_events(&mut self) {
        let events = self.shared.scene.lock().drain_events();
        let mut selection_changed = false;
        for event in events {
            match event {
                SceneEvent::Select(code) => {
                    self.shared.select_country(code);
                    selection_changed = true;
                }
                SceneEvent::CursorChanged(cursor) => debug!(?cursor, "cursor changed"),
            }
        }
        if selection_changed {
            self.sync_listeners();
        }
    }

    /// Attaches or re-attaches shortcuts whose handlers depend on state.
    fn sync_listeners(&mut self) {
        let Some(listeners) = &mut self.listeners else {
            return;
        };
        let selected = self.shared.selection.lock().state.selected_country.clone();

        let shared = Arc::downgrade(&self.shared);
        listeners.clear_selection.sync(selected, |selected| {
            let has_selection = selected.is_some();
            move |event: &KeyEvent| {
                if has_selection
                    && shortcut_for(event) == Some(Shortcut::ClearSelection)
                    && let Some(shared) = shared.upgrade()
                {
                    shared.select_country(None);
                }
            }
        });

        let shared = Arc::downgrade(&self.shared);
        listeners.refresh.sync((), |_| {
            move |event: &KeyEvent| {
                if shortcut_for(event) == Some(Shortcut::Refresh)
                    && let Some(shared) = shared.upgrade()
                {
                    info!("refresh shortcut");
                    shared.global.refresh();
                }
            }
        });
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        self.listeners = None;
        self.shared.pending_clear.lock().cancel();
    }
}
