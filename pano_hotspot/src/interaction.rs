//! Pointer and selector handling for one viewer.
//!
//! The controller owns every piece of the hotspot pipeline and is the only
//! thing that mutates [`NavigationState`]. Pointer listeners are bound to the
//! viewer surface that was on screen when the last transition settled; any
//! other surface (a reload in flight, or a viewer recreated behind our back)
//! means the listeners are detached and pointer events are ignored.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec2;

use crate::catalog::SceneCatalog;
use crate::classify::{HotspotClassifier, HotspotKey};
use crate::config::InteractionConfig;
use crate::contour::ContourHighlighter;
use crate::error::CatalogError;
use crate::navigation::NavigationState;
use crate::overlay::OverlaySurface;
use crate::reference::{ImageFetcher, ReferenceImageStore};
use crate::viewer::{Cursor, Orientation, SurfaceId, Viewer, ViewerEvent};

/// Drops pointer moves that arrive within `window` of the last accepted one.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn admit(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        self.last = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Reload in flight after a navigation change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Reference store generation requested for this transition.
    pub generation: u64,
    /// Navigation revision the assets were derived from.
    pub revision: u64,
    /// Surface the viewer minted for the new visible image.
    pub surface: SurfaceId,
    pub visible_settled: bool,
    pub reference_settled: bool,
}

impl Transition {
    fn is_settled(&self) -> bool {
        self.visible_settled && self.reference_settled
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Hovering(HotspotKey),
    Transitioning(Transition),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Listeners are not bound to the current surface.
    Ignored,
    /// Dropped by the move throttle.
    Throttled,
    /// Nothing interactive under the pointer.
    Idle,
    Hover {
        key: HotspotKey,
        label: Option<String>,
        /// Whether an outline is currently drawn.
        highlighted: bool,
    },
    /// A click started a transition (or was already satisfied).
    Activated(HotspotKey),
}

pub struct InteractionController<V: Viewer, O: OverlaySurface> {
    navigation: NavigationState,
    references: ReferenceImageStore,
    classifier: HotspotClassifier,
    highlighter: ContourHighlighter<O>,
    viewer: V,
    throttle: Throttle,
    default_orientation: Orientation,
    state: InteractionState,
    bound_surface: Option<SurfaceId>,
}

impl<V: Viewer, O: OverlaySurface> InteractionController<V, O> {
    /// Validates the catalog and wires the pipeline. Nothing is loaded until
    /// [`InteractionController::start`].
    pub fn new(
        catalog: Arc<SceneCatalog>,
        config: &InteractionConfig,
        fetcher: Arc<dyn ImageFetcher>,
        viewer: V,
        overlay: O,
    ) -> Result<Self, CatalogError> {
        catalog.validate()?;
        let classifier = HotspotClassifier::new(&catalog);
        let navigation = NavigationState::new(catalog)?;
        Ok(Self {
            navigation,
            references: ReferenceImageStore::new(fetcher),
            classifier,
            highlighter: ContourHighlighter::new(overlay, config.contour.clone()),
            viewer,
            throttle: Throttle::new(config.throttle_window()),
            default_orientation: config.default_orientation,
            state: InteractionState::Idle,
            bound_surface: None,
        })
    }

    /// Loads the first room, or `start_room` when it names a catalog room.
    pub fn start(&mut self, start_room: Option<&str>) {
        if let Some(room) = start_room {
            self.navigation.switch_room(room);
        }
        self.begin_transition(self.default_orientation);
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn references(&self) -> &ReferenceImageStore {
        &self.references
    }

    pub fn classifier(&self) -> &HotspotClassifier {
        &self.classifier
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    /// Camera input goes straight to the viewer; follow it with
    /// [`InteractionController::camera_changed`].
    pub fn viewer_mut(&mut self) -> &mut V {
        &mut self.viewer
    }

    pub fn overlay(&self) -> &O {
        self.highlighter.overlay()
    }

    pub fn highlighter(&self) -> &ContourHighlighter<O> {
        &self.highlighter
    }

    pub fn bound_surface(&self) -> Option<SurfaceId> {
        self.bound_surface
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, InteractionState::Transitioning(_))
    }

    /// True when pointer events will be processed.
    pub fn listeners_armed(&self) -> bool {
        !self.is_transitioning()
            && self.bound_surface.is_some()
            && self.bound_surface == self.viewer.surface_id()
    }

    pub fn pointer_move(&mut self, point: Vec2, now: Instant) -> PointerOutcome {
        if !self.listeners_armed() {
            return PointerOutcome::Ignored;
        }
        if !self.throttle.admit(now) {
            log::debug!("pointer move at ({:.1}, {:.1}) throttled", point.x, point.y);
            return PointerOutcome::Throttled;
        }
        match self.hit_test(point) {
            Some(key) => self.hover(key),
            None => {
                self.go_idle();
                PointerOutcome::Idle
            }
        }
    }

    pub fn pointer_leave(&mut self) -> PointerOutcome {
        if !self.listeners_armed() {
            return PointerOutcome::Ignored;
        }
        self.go_idle();
        PointerOutcome::Idle
    }

    pub fn pointer_click(&mut self, point: Vec2) -> PointerOutcome {
        if !self.listeners_armed() {
            return PointerOutcome::Ignored;
        }
        let Some(key) = self.hit_test(point) else {
            self.go_idle();
            return PointerOutcome::Idle;
        };
        log::info!("activated hotspot {key}");
        self.go_idle();
        match &key {
            HotspotKey::Room(id) => {
                if self.navigation.switch_room(id) {
                    self.begin_transition(self.default_orientation);
                } else {
                    log::debug!("already in room '{id}'");
                }
            }
            HotspotKey::Furniture(slot) => {
                let orientation = self.viewer.orientation();
                let before = self.navigation.revision();
                if self.navigation.cycle_furniture_variant(slot).is_some()
                    && self.navigation.revision() != before
                {
                    self.begin_transition(orientation);
                }
            }
        }
        PointerOutcome::Activated(key)
    }

    /// Redraws the outline after the camera moved. Returns whether an
    /// outline is drawn.
    pub fn camera_changed(&mut self) -> bool {
        if !self.listeners_armed() {
            return false;
        }
        match self.state {
            InteractionState::Hovering(_) => {
                let mapper = self.viewer.projection();
                self.highlighter.update(&mapper)
            }
            _ => false,
        }
    }

    /// Manual room selector.
    pub fn switch_room(&mut self, room_id: &str) -> bool {
        if !self.navigation.switch_room(room_id) {
            return false;
        }
        self.begin_transition(self.default_orientation);
        true
    }

    /// Manual room selector advancing in catalog order.
    pub fn next_room(&mut self) -> bool {
        if !self.navigation.next_room() {
            return false;
        }
        self.begin_transition(self.default_orientation);
        true
    }

    /// Manual variant selector. The camera is kept where it is.
    pub fn set_furniture_variant(&mut self, slot: &str, variant: &str) -> bool {
        let orientation = self.viewer.orientation();
        if !self.navigation.set_furniture_variant(slot, variant) {
            return false;
        }
        self.begin_transition(orientation);
        true
    }

    pub fn cycle_furniture_variant(&mut self, slot: &str) -> Option<String> {
        let orientation = self.viewer.orientation();
        let before = self.navigation.revision();
        let variant = self.navigation.cycle_furniture_variant(slot)?;
        if self.navigation.revision() != before {
            self.begin_transition(orientation);
        }
        Some(variant)
    }

    /// Applies viewer notifications and finished reference loads without
    /// blocking. Returns true when a transition completed during this call.
    pub fn pump(&mut self) -> bool {
        while let Some(event) = self.viewer.poll_event() {
            self.on_viewer_event(event);
        }
        self.references.poll();

        let InteractionState::Transitioning(transition) = &mut self.state else {
            return false;
        };
        if !transition.reference_settled
            && self.references.generation() == transition.generation
            && !self.references.is_loading()
        {
            transition.reference_settled = true;
        }
        if !transition.is_settled() {
            return false;
        }
        self.finish_transition();
        true
    }

    /// Pumps until the current transition settles or `timeout` elapses.
    /// Returns whether the controller is idle again.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if !self.is_transitioning() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                log::warn!("transition did not settle within {timeout:?}");
                return false;
            }
            let slice = remaining.min(Duration::from_millis(10));
            if self.references.is_loading() {
                self.references.wait(slice);
            } else {
                thread::sleep(slice);
            }
        }
    }

    fn on_viewer_event(&mut self, event: ViewerEvent) {
        let InteractionState::Transitioning(transition) = &mut self.state else {
            log::debug!("viewer event {event:?} outside a transition");
            return;
        };
        if event.surface() != transition.surface {
            log::debug!(
                "ignoring viewer event for stale surface {:?} (expecting {:?})",
                event.surface(),
                transition.surface
            );
            return;
        }
        if let ViewerEvent::Failed { reason, .. } = &event {
            log::warn!("visible image failed to load: {reason}");
        }
        transition.visible_settled = true;
    }

    fn begin_transition(&mut self, orientation: Orientation) {
        self.highlighter.hide();
        self.viewer.set_cursor(Cursor::Default);
        self.bound_surface = None;
        self.throttle.reset();

        let paths = self.navigation.asset_paths().clone();
        self.viewer.destroy();
        let surface = self.viewer.load(&paths.visible, orientation);
        let generation = self.references.load_for(&paths);
        log::info!(
            "transition to {} (revision {}, surface {:?}, generation {generation})",
            paths.visible,
            paths.revision,
            surface
        );
        self.state = InteractionState::Transitioning(Transition {
            generation,
            revision: paths.revision,
            surface,
            visible_settled: false,
            reference_settled: false,
        });
    }

    fn finish_transition(&mut self) {
        self.state = InteractionState::Idle;
        self.bound_surface = self.viewer.surface_id();
        let bounds = self.viewer.bounds();
        self.highlighter.overlay_mut().resize(
            (bounds.x + bounds.width).max(0.0).ceil() as u32,
            (bounds.y + bounds.height).max(0.0).ceil() as u32,
        );
        log::info!(
            "pointer listeners bound to surface {:?} in room '{}'",
            self.bound_surface,
            self.navigation.current_room_id()
        );
    }

    fn hit_test(&self, point: Vec2) -> Option<HotspotKey> {
        let image = self.references.image()?;
        let mapper = self.viewer.projection();
        let pixel = mapper.viewport_to_pixel(point, image.width(), image.height())?;
        let color = image.sample(pixel.x, pixel.y)?;
        self.classifier.classify(color, &self.navigation)
    }

    fn hover(&mut self, key: HotspotKey) -> PointerOutcome {
        let mapper = self.viewer.projection();
        let highlighted = if self.state == InteractionState::Hovering(key.clone()) {
            self.highlighter.update(&mapper)
        } else {
            self.viewer.set_cursor(Cursor::Interactive);
            match (
                self.classifier.reference_color(&key),
                self.references.image(),
            ) {
                (Some(color), Some(image)) => {
                    let highlight = self.classifier.highlight_color(&key);
                    self.highlighter
                        .show(&key, &color, highlight, image, &mapper)
                }
                _ => {
                    self.highlighter.hide();
                    false
                }
            }
        };
        let label = self.classifier.label(&key).map(str::to_string);
        self.state = InteractionState::Hovering(key.clone());
        PointerOutcome::Hover {
            key,
            label,
            highlighted,
        }
    }

    fn go_idle(&mut self) {
        if let InteractionState::Hovering(key) = &self.state {
            log::debug!("left hotspot {key}");
            self.viewer.set_cursor(Cursor::Default);
            self.state = InteractionState::Idle;
        }
        self.highlighter.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::reference::MemoryFetcher;
    use crate::testing::{paint_rect, FakeViewer, RecordingOverlay};
    use image::RgbImage;

    const SETTLE: Duration = Duration::from_secs(5);
    const CENTER: Vec2 = Vec2::new(45.0, 45.0);

    const YELLOW: Rgb = Rgb::new(255, 255, 0);
    const BLUE: Rgb = Rgb::new(0, 0, 255);
    const GREEN: Rgb = Rgb::new(0, 255, 0);

    type Controller = InteractionController<FakeViewer, RecordingOverlay>;

    /// 360x180 ID image with `color` painted straight ahead of a camera at
    /// yaw 0, pitch 0.
    fn id_image(color: Rgb) -> RgbImage {
        let mut pixels = RgbImage::new(360, 180);
        paint_rect(&mut pixels, 170, 80, 20, 20, color);
        pixels
    }

    fn fetcher() -> MemoryFetcher {
        let fetcher = MemoryFetcher::new();
        fetcher.insert("living-room_A-sofa_A-table_ID.jpg", id_image(YELLOW));
        fetcher.insert("master-bedroom_ID.jpg", id_image(BLUE));
        fetcher.insert("guest-bedroom_ID.jpg", RgbImage::new(360, 180));
        fetcher
    }

    fn controller_with(fetcher: MemoryFetcher) -> Controller {
        InteractionController::new(
            Arc::new(SceneCatalog::builtin()),
            &InteractionConfig::default(),
            Arc::new(fetcher),
            FakeViewer::new(),
            RecordingOverlay::default(),
        )
        .expect("valid catalog")
    }

    fn started() -> Controller {
        let mut controller = controller_with(fetcher());
        controller.start(None);
        assert!(controller.settle(SETTLE));
        controller
    }

    #[test]
    fn pointer_is_ignored_until_the_first_load_settles() {
        let mut controller = controller_with(fetcher());
        assert_eq!(
            controller.pointer_move(CENTER, Instant::now()),
            PointerOutcome::Ignored
        );

        controller.start(None);
        assert!(controller.is_transitioning());
        assert_eq!(
            controller.pointer_move(CENTER, Instant::now()),
            PointerOutcome::Ignored
        );

        assert!(controller.settle(SETTLE));
        assert_eq!(controller.state(), &InteractionState::Idle);
        assert_eq!(controller.bound_surface(), controller.viewer().surface_id());
        assert_eq!(controller.overlay().size, Some((90, 90)));
    }

    #[test]
    fn hovering_outlines_the_hotspot_and_sets_the_cursor() {
        let mut controller = started();
        let outcome = controller.pointer_move(CENTER, Instant::now());
        assert_eq!(
            outcome,
            PointerOutcome::Hover {
                key: HotspotKey::room("master-bedroom"),
                label: Some("Go to the master bedroom".to_string()),
                highlighted: true,
            }
        );
        assert_eq!(controller.viewer().cursor, Cursor::Interactive);
        assert_eq!(controller.overlay().strokes.len(), 1);
        assert!(!controller.overlay().is_clear());
    }

    #[test]
    fn moving_within_the_same_hotspot_only_updates_the_outline() {
        let mut controller = started();
        let t0 = Instant::now();
        controller.pointer_move(CENTER, t0);
        let outcome =
            controller.pointer_move(Vec2::new(47.0, 44.0), t0 + Duration::from_millis(100));
        assert!(matches!(outcome, PointerOutcome::Hover { highlighted: true, .. }));
        assert_eq!(controller.overlay().strokes.len(), 2);
        assert_eq!(
            controller.state(),
            &InteractionState::Hovering(HotspotKey::room("master-bedroom"))
        );
    }

    #[test]
    fn moving_onto_a_neighbouring_hotspot_swaps_the_outline() {
        let mut pixels = RgbImage::new(360, 180);
        paint_rect(&mut pixels, 150, 80, 20, 20, YELLOW);
        paint_rect(&mut pixels, 170, 80, 20, 20, BLUE);
        let fetcher = fetcher();
        fetcher.insert("living-room_A-sofa_A-table_ID.jpg", pixels);
        let mut controller = controller_with(fetcher);
        controller.start(None);
        assert!(controller.settle(SETTLE));

        let t0 = Instant::now();
        assert!(matches!(
            controller.pointer_move(Vec2::new(25.0, 45.0), t0),
            PointerOutcome::Hover { ref key, .. } if *key == HotspotKey::room("master-bedroom")
        ));
        let clears_before = controller.overlay().clears;

        let outcome = controller.pointer_move(CENTER, t0 + Duration::from_millis(100));
        assert_eq!(
            outcome,
            PointerOutcome::Hover {
                key: HotspotKey::room("guest-bedroom"),
                label: Some("Go to the guest bedroom".to_string()),
                highlighted: true,
            }
        );
        assert_eq!(
            controller.state(),
            &InteractionState::Hovering(HotspotKey::room("guest-bedroom"))
        );
        assert_eq!(controller.viewer().cursor, Cursor::Interactive);

        let overlay = controller.overlay();
        assert!(overlay.clears > clears_before);
        assert_eq!(overlay.strokes.len(), 2);
        assert!(overlay.strokes[0].0.iter().all(|point| point.x < 35.0));
        assert!(overlay.strokes[1].0.iter().all(|point| point.x > 35.0));
        assert_eq!(overlay.strokes[1].1.color, [0, 0, 255, 204]);

        let scan = controller.highlighter().scan().expect("cached scan");
        assert_eq!(scan.key, HotspotKey::room("guest-bedroom"));
        assert_eq!(scan.generation, controller.references().generation());
    }

    #[test]
    fn leaving_the_hotspot_resets_cursor_and_overlay() {
        let mut controller = started();
        let t0 = Instant::now();
        controller.pointer_move(CENTER, t0);
        let outcome = controller.pointer_move(Vec2::new(5.0, 5.0), t0 + Duration::from_millis(100));
        assert_eq!(outcome, PointerOutcome::Idle);
        assert_eq!(controller.state(), &InteractionState::Idle);
        assert_eq!(controller.viewer().cursor, Cursor::Default);
        assert!(controller.overlay().is_clear());

        controller.pointer_move(CENTER, t0 + Duration::from_millis(200));
        assert_eq!(controller.pointer_leave(), PointerOutcome::Idle);
        assert!(controller.overlay().is_clear());
        assert_eq!(controller.viewer().cursor, Cursor::Default);
    }

    #[test]
    fn moves_inside_the_throttle_window_are_dropped() {
        let mut controller = started();
        let t0 = Instant::now();
        assert!(matches!(
            controller.pointer_move(CENTER, t0),
            PointerOutcome::Hover { .. }
        ));
        assert_eq!(
            controller.pointer_move(Vec2::new(5.0, 5.0), t0 + Duration::from_millis(30)),
            PointerOutcome::Throttled
        );
        assert_eq!(
            controller.state(),
            &InteractionState::Hovering(HotspotKey::room("master-bedroom"))
        );
        assert_eq!(
            controller.pointer_move(Vec2::new(5.0, 5.0), t0 + Duration::from_millis(100)),
            PointerOutcome::Idle
        );
    }

    #[test]
    fn pointer_outside_the_viewer_is_never_a_hotspot() {
        let mut controller = started();
        let t0 = Instant::now();
        for (idx, point) in [
            Vec2::new(-1.0, 45.0),
            Vec2::new(90.0, 45.0),
            Vec2::new(45.0, 120.0),
            Vec2::new(-30.0, -30.0),
        ]
        .into_iter()
        .enumerate()
        {
            let now = t0 + Duration::from_millis(100 * idx as u64);
            assert_eq!(controller.pointer_move(point, now), PointerOutcome::Idle);
            assert_eq!(controller.pointer_click(point), PointerOutcome::Idle);
        }
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn room_click_reloads_and_rearms_on_the_new_reference_image() {
        let mut controller = started();
        let first_surface = controller.bound_surface();
        controller.pointer_move(CENTER, Instant::now());

        assert_eq!(
            controller.pointer_click(CENTER),
            PointerOutcome::Activated(HotspotKey::room("master-bedroom"))
        );
        assert!(controller.is_transitioning());
        assert!(controller.overlay().is_clear());
        assert_eq!(controller.viewer().cursor, Cursor::Default);
        assert_eq!(controller.navigation().current_room_id(), "master-bedroom");
        assert_eq!(
            controller.viewer().loads.last().map(|(path, _)| path.as_str()),
            Some("master-bedroom.jpg")
        );
        assert_eq!(
            controller.pointer_move(CENTER, Instant::now()),
            PointerOutcome::Ignored
        );

        assert!(controller.settle(SETTLE));
        assert_ne!(controller.bound_surface(), first_surface);
        let outcome = controller.pointer_move(CENTER, Instant::now());
        assert!(matches!(
            outcome,
            PointerOutcome::Hover { key, .. } if key == HotspotKey::room("guest-bedroom")
        ));
    }

    #[test]
    fn furniture_click_cycles_and_keeps_the_camera() {
        let fetcher = fetcher();
        let mut sofa = RgbImage::new(360, 180);
        paint_rect(&mut sofa, 160, 70, 60, 40, GREEN);
        fetcher.insert("living-room_A-sofa_A-table_ID.jpg", sofa.clone());
        fetcher.insert("living-room_B-sofa_A-table_ID.jpg", sofa);
        let mut controller = controller_with(fetcher);
        controller.start(None);
        assert!(controller.settle(SETTLE));

        controller.viewer_mut().orientation.yaw = 10.0;
        assert_eq!(
            controller.pointer_click(CENTER),
            PointerOutcome::Activated(HotspotKey::furniture("sofa"))
        );
        assert_eq!(controller.navigation().furniture_variant("sofa"), Some("B"));
        let (path, orientation) = controller.viewer().loads.last().cloned().expect("reload");
        assert_eq!(path, "living-room_B-sofa_A-table.jpg");
        assert_eq!(orientation.yaw, 10.0);

        assert!(controller.settle(SETTLE));
        assert_eq!(
            controller.references().image().map(|image| image.path().to_string()),
            Some("living-room_B-sofa_A-table_ID.jpg".to_string())
        );
    }

    #[test]
    fn superseded_transition_never_binds_listeners() {
        let mut controller = started();
        controller.viewer_mut().hold_events = true;

        assert!(controller.switch_room("master-bedroom"));
        let stale_surface = controller.viewer().surface_id();
        assert!(controller.switch_room("guest-bedroom"));
        let current_surface = controller.viewer().surface_id();
        assert_ne!(stale_surface, current_surface);

        // Reference loads finish but the viewer has not reported yet.
        controller.references.wait(SETTLE);
        assert!(!controller.pump());
        assert!(controller.is_transitioning());

        controller.viewer_mut().release_events();
        assert!(controller.settle(SETTLE));
        assert_eq!(controller.bound_surface(), current_surface);
        assert_eq!(controller.navigation().current_room_id(), "guest-bedroom");
        assert_eq!(
            controller.references().image().map(|image| image.path().to_string()),
            Some("guest-bedroom_ID.jpg".to_string())
        );
    }

    #[test]
    fn missing_reference_image_disables_hotspots() {
        let fetcher = MemoryFetcher::new();
        let mut controller = controller_with(fetcher);
        controller.start(None);
        assert!(controller.settle(SETTLE));
        assert!(!controller.references().is_ready());
        assert_eq!(
            controller.pointer_move(CENTER, Instant::now()),
            PointerOutcome::Idle
        );
        assert_eq!(controller.pointer_click(CENTER), PointerOutcome::Idle);
    }

    #[test]
    fn failed_visible_load_still_returns_to_idle() {
        let mut controller = controller_with(fetcher());
        controller.viewer_mut().fail_loads = true;
        controller.start(None);
        assert!(controller.settle(SETTLE));
        assert!(controller.listeners_armed());
    }

    #[test]
    fn recreated_surface_detaches_listeners() {
        let mut controller = started();
        controller
            .viewer_mut()
            .load("elsewhere.jpg", Orientation::default());
        assert!(!controller.listeners_armed());
        assert_eq!(
            controller.pointer_move(CENTER, Instant::now()),
            PointerOutcome::Ignored
        );
        assert_eq!(controller.pointer_leave(), PointerOutcome::Ignored);
    }

    #[test]
    fn manual_selectors_reload_only_on_change() {
        let mut controller = started();
        let loads = controller.viewer().loads.len();

        assert!(!controller.switch_room("living-room"));
        assert!(!controller.switch_room("attic"));
        assert!(!controller.set_furniture_variant("sofa", "Z"));
        assert_eq!(controller.viewer().loads.len(), loads);

        assert!(controller.set_furniture_variant("sofa", "C"));
        assert_eq!(
            controller.viewer().loads.last().map(|(path, _)| path.as_str()),
            Some("living-room_C-sofa_A-table.jpg")
        );
        assert_eq!(controller.cycle_furniture_variant("table").as_deref(), Some("B"));

        assert!(controller.next_room());
        assert_eq!(controller.navigation().current_room_id(), "master-bedroom");
        assert!(!controller.set_furniture_variant("sofa", "B"));
        assert_eq!(controller.cycle_furniture_variant("sofa"), None);
        assert!(controller.settle(SETTLE));
    }

    #[test]
    fn camera_motion_reprojects_the_outline() {
        let mut controller = started();
        controller.pointer_move(CENTER, Instant::now());
        let before = controller.overlay().strokes[0].0.clone();

        controller.viewer_mut().orientation.yaw = 5.0;
        assert!(controller.camera_changed());
        let after = &controller.overlay().strokes[1].0;
        let mean = |points: &[Vec2]| points.iter().map(|p| p.x).sum::<f32>() / points.len() as f32;
        assert!((mean(&before) - mean(after) - 5.0).abs() < 1.0);
    }

    #[test]
    fn start_room_is_honored() {
        let mut controller = controller_with(fetcher());
        controller.start(Some("guest-bedroom"));
        assert!(controller.settle(SETTLE));
        assert_eq!(controller.navigation().current_room_id(), "guest-bedroom");
        assert_eq!(controller.viewer().loads.len(), 1);
    }

    #[test]
    fn ambiguous_catalog_is_rejected() {
        let mut catalog = SceneCatalog::builtin();
        let living_room = catalog.hotspots()[0].color;
        catalog.hotspots_mut()[1].color = living_room;
        let result = InteractionController::new(
            Arc::new(catalog),
            &InteractionConfig::default(),
            Arc::new(MemoryFetcher::new()),
            FakeViewer::new(),
            RecordingOverlay::default(),
        );
        assert!(matches!(result, Err(CatalogError::AmbiguousColors { .. })));
    }

    #[test]
    fn throttle_admits_after_window() {
        let mut throttle = Throttle::new(Duration::from_millis(80));
        let t0 = Instant::now();
        assert!(throttle.admit(t0));
        assert!(!throttle.admit(t0 + Duration::from_millis(79)));
        assert!(throttle.admit(t0 + Duration::from_millis(80)));
        throttle.reset();
        assert!(throttle.admit(t0));
    }
}
