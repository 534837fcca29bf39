//! Effect registry
//!
//! Each effect is described by a table of optional callbacks. The engine never
//! matches on a concrete effect: it looks the descriptor up and calls whatever
//! hooks the effect provides.

use crate::config::EffectSettings;
use crate::event::{EventSet, WindowEvent};
use crate::paint::PaintAttrib;
use crate::window::AnimatedWindow;
use kinesis_3d::{GridSize, PaintClip};
use kinesis_core::{EngineError, Mat4, Result, Size};
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::str::FromStr;

/// Effect identifier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectId {
    /// No animation
    #[default]
    None,
    /// Pick from the event's random pool
    Random,
    Fade,
    Zoom,
    MagicLamp,
    Wave,
    RollUp,
    Explode,
    Burn,
    BeamUp,
    FocusFade,
    Dodge,
}

impl EffectId {
    /// Effects with a descriptor in [`EffectRegistry::builtin`]
    pub const BUILTIN: [EffectId; 10] = [
        EffectId::Fade,
        EffectId::Zoom,
        EffectId::MagicLamp,
        EffectId::Wave,
        EffectId::RollUp,
        EffectId::Explode,
        EffectId::Burn,
        EffectId::BeamUp,
        EffectId::FocusFade,
        EffectId::Dodge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectId::None => "none",
            EffectId::Random => "random",
            EffectId::Fade => "fade",
            EffectId::Zoom => "zoom",
            EffectId::MagicLamp => "magic_lamp",
            EffectId::Wave => "wave",
            EffectId::RollUp => "roll_up",
            EffectId::Explode => "explode",
            EffectId::Burn => "burn",
            EffectId::BeamUp => "beam_up",
            EffectId::FocusFade => "focus_fade",
            EffectId::Dodge => "dodge",
        }
    }

    /// Whether this names a real effect rather than a selection keyword
    pub fn is_concrete(self) -> bool {
        !matches!(self, EffectId::None | EffectId::Random)
    }
}

impl FromStr for EffectId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        [EffectId::None, EffectId::Random]
            .into_iter()
            .chain(EffectId::BUILTIN)
            .find(|id| id.name() == name)
            .ok_or_else(|| EngineError::UnknownEffect(s.to_string()))
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Broad family of an effect, deciding which resources the engine sets up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectVariant {
    /// Attribute or transform changes only
    Plain,
    /// Deforms a grid model
    Grid,
    /// Tessellates the window into polygons
    Polygon,
    /// Emits particles
    Particle,
    /// Runs on restack rather than on a lifecycle event
    Restack,
}

/// Shared inputs for init and step callbacks
pub struct EffectEnv<'a> {
    pub settings: &'a EffectSettings,
    pub screen: Size,
    pub rng: &'a mut StdRng,
    pub max_polygons: usize,
    pub max_clips: usize,
}

/// Allocate per-run resources; an error aborts the effect
pub type InitFn = fn(&mut AnimatedWindow, &mut EffectEnv<'_>) -> Result<()>;
/// Advance effect state to the window's current progress
pub type StepFn = fn(&mut AnimatedWindow, &mut EffectEnv<'_>);
pub type AttribFn = fn(&AnimatedWindow, &EffectSettings, &mut PaintAttrib);
pub type TransformFn = fn(&AnimatedWindow, &EffectSettings) -> Mat4;
pub type GridSizeFn = fn(&EffectSettings) -> GridSize;
/// Called once per painted clip
pub type CustomGeometryFn = fn(&mut AnimatedWindow, &PaintClip) -> Result<()>;
/// Build the window's custom geometry for the clips stored so far
pub type DrawCustomGeometryFn = fn(&mut AnimatedWindow, &PaintAttrib, Size) -> Result<()>;

/// Callback table of one effect
#[derive(Clone, Copy)]
pub struct EffectDescriptor {
    pub id: EffectId,
    pub variant: EffectVariant,
    /// Events this effect may be configured for
    pub events: EventSet,
    pub init: Option<InitFn>,
    pub step: Option<StepFn>,
    pub update_attrib: Option<AttribFn>,
    pub transform: Option<TransformFn>,
    pub grid_size: Option<GridSizeFn>,
    pub custom_geometry: Option<CustomGeometryFn>,
    pub draw_custom_geometry: Option<DrawCustomGeometryFn>,
    /// Emit projective texture coordinates
    pub needs_q_coord: bool,
    /// The host may draw the window geometry itself
    pub lets_others_draw_geometry: bool,
}

impl EffectDescriptor {
    pub fn new(id: EffectId, variant: EffectVariant) -> Self {
        Self {
            id,
            variant,
            events: EventSet::ALL,
            init: None,
            step: None,
            update_attrib: None,
            transform: None,
            grid_size: None,
            custom_geometry: None,
            draw_custom_geometry: None,
            needs_q_coord: false,
            lets_others_draw_geometry: true,
        }
    }

    pub fn with_events(mut self, events: &[WindowEvent]) -> Self {
        self.events = EventSet::of(events);
        self
    }

    pub fn with_init(mut self, init: InitFn) -> Self {
        self.init = Some(init);
        self
    }

    pub fn with_step(mut self, step: StepFn) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_attrib(mut self, update: AttribFn) -> Self {
        self.update_attrib = Some(update);
        self
    }

    pub fn with_transform(mut self, transform: TransformFn) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Deform a grid model; the host no longer draws the plain window
    pub fn with_grid(mut self, grid_size: GridSizeFn, needs_q_coord: bool) -> Self {
        self.grid_size = Some(grid_size);
        self.needs_q_coord = needs_q_coord;
        self.lets_others_draw_geometry = false;
        self
    }

    pub fn with_custom_geometry(
        mut self,
        store: CustomGeometryFn,
        draw: DrawCustomGeometryFn,
    ) -> Self {
        self.custom_geometry = Some(store);
        self.draw_custom_geometry = Some(draw);
        self.lets_others_draw_geometry = false;
        self
    }

    pub fn allows(&self, event: WindowEvent) -> bool {
        self.events.contains(event)
    }
}

impl std::fmt::Debug for EffectDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDescriptor")
            .field("id", &self.id)
            .field("variant", &self.variant)
            .field("events", &self.events)
            .field("needs_q_coord", &self.needs_q_coord)
            .field("lets_others_draw_geometry", &self.lets_others_draw_geometry)
            .finish_non_exhaustive()
    }
}

/// Immutable table of effect descriptors
#[derive(Clone, Debug, Default)]
pub struct EffectRegistry {
    descriptors: FxHashMap<EffectId, EffectDescriptor>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in effect
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in crate::effects::builtin() {
            registry.register(descriptor);
        }
        registry
    }

    /// Add or replace a descriptor
    pub fn register(&mut self, descriptor: EffectDescriptor) {
        if self.descriptors.insert(descriptor.id, descriptor).is_some() {
            tracing::debug!("replaced descriptor for effect {}", descriptor.id);
        }
    }

    pub fn get(&self, id: EffectId) -> Option<&EffectDescriptor> {
        self.descriptors.get(&id)
    }

    pub fn contains(&self, id: EffectId) -> bool {
        self.descriptors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Registered ids in a stable order
    pub fn ids(&self) -> Vec<EffectId> {
        let mut ids: Vec<_> = self.descriptors.keys().copied().collect();
        ids.sort();
        ids
    }
}
