//! Animation engine
//!
//! Owns every managed window's animation record and drives the per-window
//! state machine:
//!
//! ```text
//!   idle ──event──▶ running ──timer expired──▶ cleanup ──▶ idle
//!                    │   ▲
//!          opposite  │   │  reversed in place
//!            event   └───┘
//! ```
//!
//! The host feeds lifecycle and restack notifications, calls
//! [`prepare_frame`](AnimationEngine::prepare_frame) once per displayed frame
//! and [`paint_window`](AnimationEngine::paint_window) for each window it
//! draws. Postponed host actions (unmap, destroy) come back through
//! [`EventOutcome`] and [`FrameReport`].

use crate::cleanup::finish_animation;
use crate::config::AnimationConfig;
use crate::dodge::plan_dodge;
use crate::event::{DirectionOverride, WindowEvent};
use crate::matching::{CompiledRules, WindowInfo};
use crate::paint::{PaintAttrib, PaintOutput, ParticleLayer};
use crate::paint_chain::PaintChain;
use crate::random::RandomEffectPool;
use crate::registry::{EffectEnv, EffectId, EffectRegistry, EffectVariant};
use crate::timing::AnimationTimer;
use crate::window::{AnimatedWindow, DeferredAction, DodgeRole, EffectState, WindowId};
use kinesis_3d::{ModelGeometry, PaintClip};
use kinesis_core::{EngineError, Mat4, Rect, Result, Size, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    /// Arena key of an animated window
    pub struct AnimKey;
}

/// Result of a lifecycle notification
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventOutcome {
    /// An animation is now running for the window
    pub animating: bool,
    /// The host must keep the window mapped until the animation finishes
    pub defer_unmap: bool,
    /// Actions flushed from an interrupted animation, to perform now
    pub finished: Vec<DeferredAction>,
}

/// An animation that completed during a frame
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedAnimation {
    pub window: WindowId,
    pub event: WindowEvent,
    pub effect: EffectId,
    pub actions: Vec<DeferredAction>,
}

/// Summary of one [`prepare_frame`](AnimationEngine::prepare_frame)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    pub finished: Vec<FinishedAnimation>,
    /// Windows removed after their deferred destroy ran
    pub destroyed: Vec<WindowId>,
    /// Animations still running
    pub animating: usize,
}

impl FrameReport {
    /// Whether the host must schedule another frame
    pub fn needs_redraw(&self) -> bool {
        self.animating > 0
    }
}

#[derive(Clone, Debug)]
struct PendingRestack {
    subject: WindowId,
    /// Windows the subject crossed, topmost first
    passed: Vec<WindowId>,
    raised: bool,
}

/// Parameters of one animation start
struct Launch {
    event: WindowEvent,
    effect: EffectId,
    duration_ms: f32,
    direction: DirectionOverride,
    delay_ms: f32,
    state: EffectState,
}

impl Launch {
    fn new(event: WindowEvent, effect: EffectId, duration_ms: f32) -> Self {
        Self {
            event,
            effect,
            duration_ms,
            direction: DirectionOverride::None,
            delay_ms: 0.0,
            state: EffectState::None,
        }
    }
}

/// Window animation engine
pub struct AnimationEngine {
    config: AnimationConfig,
    registry: EffectRegistry,
    rules: FxHashMap<WindowEvent, CompiledRules>,
    random_pools: FxHashMap<WindowEvent, RandomEffectPool>,
    windows: SlotMap<AnimKey, AnimatedWindow>,
    index: FxHashMap<WindowId, AnimKey>,
    /// Bottom to top
    stacking: Vec<WindowId>,
    pending_restacks: Vec<PendingRestack>,
    chain: PaintChain,
    rng: StdRng,
    screen: Size,
}

impl AnimationEngine {
    /// Create an engine with the built-in effects
    pub fn new(config: AnimationConfig, screen: Size) -> Self {
        Self::with_registry(config, screen, EffectRegistry::builtin())
    }

    pub fn with_registry(config: AnimationConfig, screen: Size, registry: EffectRegistry) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut engine = Self {
            config,
            registry,
            rules: FxHashMap::default(),
            random_pools: FxHashMap::default(),
            windows: SlotMap::with_key(),
            index: FxHashMap::default(),
            stacking: Vec::new(),
            pending_restacks: Vec::new(),
            chain: PaintChain::new(),
            rng,
            screen,
        };
        engine.compile_rules();
        engine
    }

    /// Swap in a new configuration, recompiling every event's rules
    ///
    /// Running animations keep the parameters they started with.
    pub fn set_config(&mut self, config: AnimationConfig) {
        if let Some(seed) = config.random_seed {
            if self.config.random_seed != Some(seed) {
                self.rng = StdRng::seed_from_u64(seed);
            }
        }
        self.config = config;
        self.compile_rules();
    }

    fn compile_rules(&mut self) {
        self.rules.clear();
        self.random_pools.clear();
        for event in WindowEvent::ALL {
            let Some(lists) = self.config.events.get(event) else {
                continue;
            };
            let rules =
                CompiledRules::compile(event, &lists.effects, &lists.durations, &lists.matches);
            for row in &rules.rows {
                if !row.effect.is_concrete() {
                    continue;
                }
                match self.registry.get(row.effect) {
                    None => tracing::warn!("{}: effect {} is not registered", event.name(), row.effect),
                    Some(descriptor) if !descriptor.allows(event) => {
                        tracing::warn!("{}: effect {} cannot run for this event", event.name(), row.effect)
                    }
                    Some(_) => {}
                }
            }
            let pool = RandomEffectPool::build(&lists.random_effects, event, &self.registry);
            self.rules.insert(event, rules);
            self.random_pools.insert(event, pool);
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn screen_size(&self) -> Size {
        self.screen
    }

    pub fn set_screen_size(&mut self, screen: Size) {
        self.screen = screen;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Window tracking
    // ─────────────────────────────────────────────────────────────────────────

    /// Start tracking a window, placing it on top of the stacking order
    ///
    /// A window that is already tracked only has its info and geometry updated.
    pub fn add_window(&mut self, id: WindowId, info: WindowInfo, geometry: ModelGeometry) {
        if let Some(window) = self.window_mut(id) {
            window.info = info;
            window.geometry = geometry;
            return;
        }
        let key = self.windows.insert(AnimatedWindow::new(id, info, geometry));
        self.index.insert(id, key);
        self.stacking.push(id);
        tracing::trace!("tracking window {}", id);
    }

    /// Stop tracking a window immediately, returning any postponed actions
    pub fn remove_window(&mut self, id: WindowId) -> Vec<DeferredAction> {
        let Some(key) = self.index.remove(&id) else {
            return Vec::new();
        };
        self.stacking.retain(|w| *w != id);
        self.pending_restacks.retain(|p| p.subject != id);
        self.chain.unlink(id);
        match self.windows.remove(key) {
            Some(mut window) => window.deferred.drain(..).collect(),
            None => Vec::new(),
        }
    }

    pub fn window(&self, id: WindowId) -> Option<&AnimatedWindow> {
        self.index.get(&id).and_then(|key| self.windows.get(*key))
    }

    fn window_mut(&mut self, id: WindowId) -> Option<&mut AnimatedWindow> {
        let key = *self.index.get(&id)?;
        self.windows.get_mut(key)
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn is_animating(&self, id: WindowId) -> bool {
        self.window(id).is_some_and(AnimatedWindow::is_animating)
    }

    pub fn animating_count(&self) -> usize {
        self.windows.values().filter(|w| w.is_animating()).count()
    }

    /// Move or resize a window; the next animation rebuilds its model
    pub fn update_geometry(&mut self, id: WindowId, geometry: ModelGeometry) {
        if let Some(window) = self.window_mut(id) {
            window.geometry = geometry;
        }
    }

    pub fn set_window_info(&mut self, id: WindowId, info: WindowInfo) {
        if let Some(window) = self.window_mut(id) {
            window.info = info;
        }
    }

    /// Taskbar or dock rectangle the window minimizes into
    pub fn set_icon_geometry(&mut self, id: WindowId, icon: Option<Rect>) {
        if let Some(window) = self.window_mut(id) {
            window.icon = icon;
        }
    }

    pub fn set_mapped(&mut self, id: WindowId, mapped: bool) {
        if let Some(window) = self.window_mut(id) {
            window.mapped = mapped;
        }
    }

    /// Replace the stacking order without animating, bottom to top
    pub fn set_stacking(&mut self, order: Vec<WindowId>) {
        self.stacking = order;
    }

    pub fn stacking(&self) -> &[WindowId] {
        &self.stacking
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle events
    // ─────────────────────────────────────────────────────────────────────────

    /// React to a lifecycle event
    ///
    /// The opposite of the running event reverses the animation in place. Any
    /// other running animation is finished first and its postponed actions are
    /// returned in [`EventOutcome::finished`].
    pub fn on_lifecycle_event(&mut self, id: WindowId, event: WindowEvent) -> EventOutcome {
        let mut outcome = EventOutcome::default();
        if event.is_idle() {
            return outcome;
        }
        let Some(&key) = self.index.get(&id) else {
            tracing::debug!("{} for unknown window {}", event.name(), id);
            return outcome;
        };

        if let Some(window) = self.windows.get_mut(key) {
            if matches!(event, WindowEvent::Open | WindowEvent::Unminimize) {
                window.mapped = true;
            }
            if window.is_animating() {
                if window.event.opposite() == Some(event) {
                    reverse_in_place(window, event);
                    outcome.animating = true;
                    outcome.defer_unmap = event.hides_window();
                    return outcome;
                }
                tracing::debug!(
                    "window {}: {} interrupted by {}",
                    id,
                    window.event.name(),
                    event.name()
                );
                outcome.finished = finish_animation(window, &mut self.chain);
            }
        }

        if outcome.finished.contains(&DeferredAction::Destroy) {
            self.remove_window(id);
            return outcome;
        }

        let Some((effect, duration_ms)) = self.select_effect(key, event) else {
            return outcome;
        };
        if self.registry.get(effect).map(|d| d.variant) == Some(EffectVariant::Restack) {
            tracing::trace!("window {}: {} only runs on restack", id, effect);
            return outcome;
        }

        match self.start_animation(key, Launch::new(event, effect, duration_ms)) {
            Ok(()) => {
                if let Some(window) = self.windows.get_mut(key) {
                    if event.hides_window() {
                        window.deferred.push_back(DeferredAction::Unmap);
                        outcome.defer_unmap = true;
                    }
                }
                outcome.animating = true;
            }
            Err(err) => {
                tracing::error!("window {}: {} failed to start: {}", id, effect, err);
                if let Some(window) = self.windows.get_mut(key) {
                    outcome.finished.extend(finish_animation(window, &mut self.chain));
                }
            }
        }
        outcome
    }

    /// Destroy notification
    ///
    /// Returns `true` when the destroy is postponed until the running
    /// animation finishes; otherwise the window is forgotten right away.
    pub fn on_destroy(&mut self, id: WindowId) -> bool {
        if let Some(window) = self.window_mut(id) {
            if window.is_animating() {
                if !window.has_deferred(DeferredAction::Destroy) {
                    window.deferred.push_back(DeferredAction::Destroy);
                }
                tracing::debug!("window {}: destroy postponed", id);
                return true;
            }
        }
        self.remove_window(id);
        false
    }

    /// Stacking change, bottom to top; `subject` is the window that moved
    ///
    /// Focus effects for the restack run at the next
    /// [`prepare_frame`](Self::prepare_frame).
    pub fn on_restack(&mut self, subject: WindowId, new_order: Vec<WindowId>) {
        let old_pos = self.stacking.iter().position(|w| *w == subject);
        let new_pos = new_order.iter().position(|w| *w == subject);
        let (Some(old_pos), Some(new_pos)) = (old_pos, new_pos) else {
            self.stacking = new_order;
            return;
        };

        let old_above = &self.stacking[old_pos + 1..];
        let new_above = &new_order[new_pos + 1..];
        let raised = new_above.len() < old_above.len();
        let passed: Vec<WindowId> = if raised {
            old_above.iter().rev().filter(|w| !new_above.contains(w)).copied().collect()
        } else {
            new_above.iter().rev().filter(|w| !old_above.contains(w)).copied().collect()
        };

        if !passed.is_empty() {
            self.pending_restacks.retain(|p| p.subject != subject);
            self.pending_restacks.push(PendingRestack {
                subject,
                passed,
                raised,
            });
        }
        self.stacking = new_order;
    }

    fn select_effect(&mut self, key: AnimKey, event: WindowEvent) -> Option<(EffectId, f32)> {
        let rules = self.rules.get(&event)?;
        if let Some(problem) = &rules.problem {
            tracing::trace!("{} rules unusable: {}", event.name(), problem);
            return None;
        }
        let window = self.windows.get(key)?;
        let row = rules.select(&window.info)?;
        let effect = match row.effect {
            EffectId::None => return None,
            EffectId::Random => self.random_pools.get(&event)?.pick(&mut self.rng)?,
            effect => effect,
        };
        let descriptor = self.registry.get(effect)?;
        if !descriptor.allows(event) {
            return None;
        }
        if row.duration_ms <= 0.0 {
            return None;
        }
        Some((effect, row.duration_ms))
    }

    fn start_animation(&mut self, key: AnimKey, launch: Launch) -> Result<()> {
        let descriptor = *self
            .registry
            .get(launch.effect)
            .ok_or_else(|| EngineError::UnknownEffect(launch.effect.name().to_string()))?;
        let window = self
            .windows
            .get_mut(key)
            .ok_or_else(|| EngineError::StaleState("window is no longer tracked".to_string()))?;

        if !window.event.is_idle() {
            window.prev_event = window.event;
        }
        window.event = launch.event;
        window.effect = launch.effect;
        window.timer = AnimationTimer::new(launch.duration_ms, self.config.time_step_ms)
            .with_delay(launch.delay_ms);
        window.direction = launch.direction;
        window.state = launch.state;

        if let Some(grid_size) = descriptor.grid_size {
            let size = grid_size(&self.config.effects);
            let shade = launch.event.is_shade();
            let reusable = window
                .model
                .as_ref()
                .is_some_and(|model| model.matches(size, &window.geometry, shade));
            if !reusable {
                window.model = None;
                window.model = Some(kinesis_3d::GridModel::new(size, window.geometry, shade)?);
            }
            if let Some(model) = window.model.as_mut() {
                let rect = window.geometry.rect;
                model.init_objects(rect, Vec2::ONE, rect.origin);
            }
        }

        let mut env = EffectEnv {
            settings: &self.config.effects,
            screen: self.screen,
            rng: &mut self.rng,
            max_polygons: self.config.max_polygons,
            max_clips: self.config.max_clips,
        };
        if let Some(init) = descriptor.init {
            init(window, &mut env)?;
        }
        // first frame must already show the starting pose
        if let Some(step) = descriptor.step {
            step(window, &mut env);
        }

        tracing::debug!(
            "window {}: {} started for {} ({} ms)",
            window.id,
            launch.effect,
            launch.event.name(),
            launch.duration_ms
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Restack effects
    // ─────────────────────────────────────────────────────────────────────────

    fn process_restacks(&mut self, report: &mut FrameReport) {
        if self.pending_restacks.is_empty() {
            return;
        }
        let mut pending = std::mem::take(&mut self.pending_restacks);
        let stacking = &self.stacking;
        pending.sort_by_key(|p| std::cmp::Reverse(stacking.iter().position(|w| *w == p.subject)));
        for restack in pending {
            self.process_restack(restack, report);
        }
    }

    fn process_restack(&mut self, restack: PendingRestack, report: &mut FrameReport) {
        let Some(&key) = self.index.get(&restack.subject) else {
            return;
        };
        let Some(window) = self.windows.get(key) else {
            return;
        };
        if !window.mapped {
            return;
        }
        if window.is_animating() && window.event != WindowEvent::Focus {
            tracing::trace!("window {}: restack ignored during {}", restack.subject, window.event.name());
            return;
        }
        let Some((effect, duration_ms)) = self.select_effect(key, WindowEvent::Focus) else {
            return;
        };

        // Restack effects coordinate several windows, so their orchestration
        // lives here rather than behind descriptor callbacks.
        match (effect, restack.raised) {
            (EffectId::Dodge, true) => self.start_dodge(key, &restack.passed, duration_ms, report),
            (EffectId::FocusFade, true) => self.start_focus_fade(key, &restack.passed, duration_ms, report),
            (EffectId::Dodge | EffectId::FocusFade, false) => {
                // the window now covering the lowered one plays the raised part
                let Some(cover) = self.lowered_cover(key, &restack.passed) else {
                    return;
                };
                let lowered = [restack.subject];
                if effect == EffectId::Dodge {
                    self.start_dodge(cover, &lowered, duration_ms, report);
                } else {
                    self.start_focus_fade(cover, &lowered, duration_ms, report);
                }
            }
            (effect, true) => {
                self.interrupt(key, report);
                if let Err(err) = self.start_animation(key, Launch::new(WindowEvent::Focus, effect, duration_ms)) {
                    tracing::error!("window {}: {} failed to start: {}", restack.subject, effect, err);
                    self.interrupt(key, report);
                }
            }
            (_, false) => {}
        }
    }

    /// Topmost window of `above` overlapping `key` that is free to animate
    fn lowered_cover(&self, key: AnimKey, above: &[WindowId]) -> Option<AnimKey> {
        let rect = self.windows.get(key)?.rect();
        above.iter().find_map(|id| {
            let cover_key = *self.index.get(id)?;
            let window = self.windows.get(cover_key)?;
            let free = !window.is_animating() || window.event == WindowEvent::Focus;
            let overlaps = window.rect().intersection(&rect).is_some_and(|r| !r.is_empty());
            (window.mapped && free && overlaps).then_some(cover_key)
        })
    }

    /// Finish whatever runs on `key`, reporting its postponed actions
    fn interrupt(&mut self, key: AnimKey, report: &mut FrameReport) {
        let Some(window) = self.windows.get_mut(key) else {
            return;
        };
        if window.event.is_idle() {
            return;
        }
        let event = window.event;
        let effect = window.effect;
        let actions = finish_animation(window, &mut self.chain);
        report.finished.push(FinishedAnimation {
            window: window.id,
            event,
            effect,
            actions,
        });
    }

    /// Move the overlapping windows of `passed` aside while `key` comes up
    fn start_dodge(&mut self, key: AnimKey, passed: &[WindowId], duration_ms: f32, report: &mut FrameReport) {
        let Some((subject_id, subject_rect)) = self.windows.get(key).map(|w| (w.id, w.rect())) else {
            return;
        };
        let candidates: Vec<(WindowId, Rect)> = passed
            .iter()
            .filter_map(|id| {
                let window = self.windows.get(*self.index.get(id)?)?;
                let free = !window.is_animating() || window.effect == EffectId::Dodge;
                (window.mapped && free).then(|| (*id, window.rect()))
            })
            .collect();

        let settings = &self.config.effects.dodge;
        let plan = plan_dodge(&subject_rect, &candidates, settings.stagger_ms, settings.gap);
        if plan.is_empty() {
            tracing::trace!("window {}: nothing to dodge", subject_id);
            return;
        }

        self.interrupt(key, report);
        let subject = Launch {
            direction: DirectionOverride::Forward,
            state: EffectState::Dodge(DodgeRole::Subject),
            ..Launch::new(WindowEvent::Focus, EffectId::Dodge, duration_ms)
        };
        if let Err(err) = self.start_animation(key, subject) {
            tracing::error!("window {}: dodge failed to start: {}", subject_id, err);
            self.interrupt(key, report);
            return;
        }

        let mut host = subject_id;
        for assignment in plan {
            let Some(&dodger_key) = self.index.get(&assignment.window) else {
                continue;
            };
            self.interrupt(dodger_key, report);
            let launch = Launch {
                direction: DirectionOverride::Forward,
                delay_ms: assignment.delay_ms,
                state: EffectState::Dodge(DodgeRole::Dodger {
                    subject: subject_id,
                    direction: assignment.direction,
                    displacement: assignment.displacement,
                }),
                ..Launch::new(WindowEvent::Focus, EffectId::Dodge, duration_ms)
            };
            if let Err(err) = self.start_animation(dodger_key, launch) {
                tracing::warn!("window {}: dodge failed to start: {}", assignment.window, err);
                self.interrupt(dodger_key, report);
                continue;
            }
            self.chain.link(host, assignment.window);
            host = assignment.window;
        }
    }

    /// Fade `key` in above the first window of `passed` it overlaps
    fn start_focus_fade(&mut self, key: AnimKey, passed: &[WindowId], duration_ms: f32, report: &mut FrameReport) {
        let Some((subject_id, subject_rect)) = self.windows.get(key).map(|w| (w.id, w.rect())) else {
            return;
        };
        let covering = passed.iter().copied().find(|id| {
            self.window(*id)
                .is_some_and(|w| w.mapped && w.rect().intersection(&subject_rect).is_some_and(|r| !r.is_empty()))
        });
        let Some(covering) = covering else {
            return;
        };

        self.interrupt(key, report);
        if let Err(err) = self.start_animation(key, Launch::new(WindowEvent::Focus, EffectId::FocusFade, duration_ms)) {
            tracing::error!("window {}: focus fade failed to start: {}", subject_id, err);
            self.interrupt(key, report);
            return;
        }
        // fade in right above the window that used to cover it
        self.chain.link(covering, subject_id);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame driving
    // ─────────────────────────────────────────────────────────────────────────

    /// Advance every running animation by `dt_ms`
    pub fn prepare_frame(&mut self, dt_ms: f32) -> FrameReport {
        let mut report = FrameReport::default();
        self.process_restacks(&mut report);

        let mut destroyed = Vec::new();
        for (key, window) in self.windows.iter_mut() {
            if window.event.is_idle() {
                continue;
            }
            let descriptor = self.registry.get(window.effect).copied();

            if window.timer.is_running() {
                let steps = window.timer.advance(dt_ms);
                if steps > 0 {
                    if let Some(step) = descriptor.and_then(|d| d.step) {
                        let mut env = EffectEnv {
                            settings: &self.config.effects,
                            screen: self.screen,
                            rng: &mut self.rng,
                            max_polygons: self.config.max_polygons,
                            max_clips: self.config.max_clips,
                        };
                        step(window, &mut env);
                    }
                }
            }

            if descriptor.is_some() && !window.timer.is_finished() {
                report.animating += 1;
                continue;
            }

            let event = window.event;
            let effect = window.effect;
            let actions = finish_animation(window, &mut self.chain);
            if actions.contains(&DeferredAction::Destroy) {
                destroyed.push(key);
            }
            report.finished.push(FinishedAnimation {
                window: window.id,
                event,
                effect,
                actions,
            });
        }

        for key in destroyed {
            if let Some(window) = self.windows.remove(key) {
                self.index.remove(&window.id);
                self.stacking.retain(|w| *w != window.id);
                self.chain.unlink(window.id);
                tracing::debug!("window {}: destroyed after animation", window.id);
                report.destroyed.push(window.id);
            }
        }

        for window in self.windows.values_mut() {
            if let Some(polygons) = window.polygons.as_mut() {
                polygons.begin_frame();
            }
        }
        report
    }

    /// Paint parameters for one window
    ///
    /// `clips` are the damaged parts of the window the host is about to
    /// draw, each with its texture mapping.
    pub fn paint_window(&mut self, id: WindowId, clips: &[PaintClip]) -> PaintOutput<'_> {
        let Some(&key) = self.index.get(&id) else {
            return PaintOutput::Untouched;
        };
        let Some(window) = self.windows.get_mut(key) else {
            return PaintOutput::Untouched;
        };
        if !window.is_animating() {
            return PaintOutput::Untouched;
        }
        let Some(descriptor) = self.registry.get(window.effect).copied() else {
            return PaintOutput::Untouched;
        };

        let settings = &self.config.effects;
        let mut attrib = PaintAttrib::default();
        if let Some(update) = descriptor.update_attrib {
            update(window, settings, &mut attrib);
        }
        let transform = descriptor
            .transform
            .map_or(Mat4::IDENTITY, |transform| transform(window, settings));

        if let (Some(store), Some(draw)) = (descriptor.custom_geometry, descriptor.draw_custom_geometry) {
            let drawn = clips
                .iter()
                .try_for_each(|clip| store(window, clip))
                .and_then(|()| draw(window, &attrib, self.screen));
            return match drawn {
                Ok(()) => PaintOutput::Polygons {
                    attrib,
                    frame: &window.polygon_frame,
                },
                Err(EngineError::StaleState(reason)) => {
                    tracing::warn!("window {}: skipped frame: {}", id, reason);
                    PaintOutput::Skipped
                }
                Err(err) => {
                    tracing::error!("window {}: {} aborted: {}", id, window.effect, err);
                    window.timer.finish();
                    PaintOutput::Untouched
                }
            };
        }

        if !descriptor.lets_others_draw_geometry {
            if let Some(model) = window.model.as_ref() {
                let visible = window.clip_override;
                window.clip_scratch.clear();
                window.clip_scratch.extend(clips.iter().filter_map(|clip| match visible {
                    None => Some(*clip),
                    Some(visible) => clip
                        .rect
                        .intersection(&visible)
                        .map(|rect| PaintClip::new(rect, clip.texture_matrix)),
                }));
                window
                    .emitter
                    .emit(model, &window.clip_scratch, descriptor.needs_q_coord, &mut window.quads);
                return PaintOutput::Quads {
                    attrib,
                    transform,
                    batch: &window.quads,
                };
            }
        }

        if attrib.is_identity() && transform == Mat4::IDENTITY {
            return PaintOutput::Untouched;
        }
        PaintOutput::Transformed { attrib, transform }
    }

    /// Particle systems to draw after the window itself
    pub fn particle_layers(&mut self, id: WindowId) -> SmallVec<[ParticleLayer<'_>; 2]> {
        let mut layers = SmallVec::new();
        let Some(&key) = self.index.get(&id) else {
            return layers;
        };
        let Some(window) = self.windows.get_mut(key) else {
            return layers;
        };
        for pool in &mut window.particles {
            pool.build_vertices();
        }
        for pool in &window.particles {
            if pool.is_active() {
                layers.push(ParticleLayer {
                    batch: pool.vertices(),
                    additive: pool.emitter.additive,
                });
            }
        }
        layers
    }

    /// Windows to paint consecutively, starting with `head`
    pub fn paint_order(&mut self, head: WindowId) -> Vec<WindowId> {
        let index = &self.index;
        self.chain.chain_from(head, |id| index.contains_key(&id))
    }

    /// Screen area the window's animation may touch this frame
    pub fn damage_rect(&self, id: WindowId) -> Option<Rect> {
        let window = self.window(id)?;
        let mut damage = window.rect();
        if !window.is_animating() {
            return Some(damage);
        }
        if let Some(model) = window.model.as_ref() {
            damage = damage.union(&model.bounding_rect());
        }
        if let Some(rect) = window.polygons.as_ref().and_then(|p| p.damage_rect()) {
            damage = damage.union(&rect);
        }
        for pool in &window.particles {
            if let Some(rect) = pool.bounding_box().to_rect() {
                damage = damage.union(&rect);
            }
        }
        if let Some(transform) = self.registry.get(window.effect).and_then(|d| d.transform) {
            let matrix = transform(window, &self.config.effects);
            damage = damage.union(&transformed_bounds(&window.rect(), &matrix));
        }
        Some(damage)
    }
}

fn reverse_in_place(window: &mut AnimatedWindow, event: WindowEvent) {
    tracing::debug!(
        "window {}: {} reversed into {}",
        window.id,
        window.event.name(),
        event.name()
    );
    window.timer.reverse();
    window.prev_event = window.event;
    window.event = event;
    window.direction = DirectionOverride::for_event(event);
    window.deferred.retain(|action| *action != DeferredAction::Unmap);
    if event.hides_window() {
        window.deferred.push_back(DeferredAction::Unmap);
    }
}

fn transformed_bounds(rect: &Rect, matrix: &Mat4) -> Rect {
    let corners = [
        (rect.x(), rect.y()),
        (rect.right(), rect.y()),
        (rect.x(), rect.bottom()),
        (rect.right(), rect.bottom()),
    ];
    let mut min = (f32::MAX, f32::MAX);
    let mut max = (f32::MIN, f32::MIN);
    for (x, y) in corners {
        let p = matrix.transform_point(Vec3::new(x, y, 0.0));
        min = (min.0.min(p.x), min.1.min(p.y));
        max = (max.0.max(p.x), max.1.max(p.y));
    }
    Rect::from_edges(min.0, min.1, max.0, max.1)
}
