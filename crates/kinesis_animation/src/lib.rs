//! Kinesis Animation
//!
//! Window animation engine for compositors. The host reports window lifecycle
//! events (minimize, close, open, shade, focus...) and the engine animates
//! them with configurable effects, postponing unmap and destroy until the
//! animation is over.
//!
//! # Features
//!
//! - **State machine**: start, in-place reversal on the opposite event, interruption and cleanup
//! - **Effects**: fade, zoom, magic lamp, wave, roll up, explode, burn, beam up, focus fade, dodge
//! - **Rules**: per-event effect selection by window type, class and title
//! - **Restack effects**: dodging and fading windows raised through overlapping ones
//! - **Configuration**: TOML or JSON files with per-effect parameters
//!
//! # Example
//!
//! ```rust
//! use kinesis_animation::{
//!     AnimationConfig, AnimationEngine, DeferredAction, ModelGeometry, WindowEvent, WindowId,
//!     WindowInfo, WindowKind,
//! };
//! use kinesis_core::{Rect, Size};
//!
//! let mut engine = AnimationEngine::new(AnimationConfig::default(), Size::new(1920.0, 1080.0));
//! let id = WindowId(1);
//! engine.add_window(
//!     id,
//!     WindowInfo::new(WindowKind::Normal),
//!     ModelGeometry::new(Rect::new(200.0, 150.0, 800.0, 600.0)),
//! );
//!
//! let outcome = engine.on_lifecycle_event(id, WindowEvent::Minimize);
//! assert!(outcome.defer_unmap);
//!
//! // drive frames until the host is told to unmap
//! let mut unmapped = false;
//! while !unmapped {
//!     let report = engine.prepare_frame(16.0);
//!     unmapped = report
//!         .finished
//!         .iter()
//!         .any(|f| f.actions.contains(&DeferredAction::Unmap));
//! }
//! assert!(!engine.is_animating(id));
//! ```

pub mod cleanup;
pub mod config;
pub mod dodge;
pub mod easing;
mod effects;
pub mod engine;
pub mod error;
pub mod event;
pub mod matching;
pub mod paint;
pub mod paint_chain;
pub mod random;
pub mod registry;
pub mod timing;
pub mod window;

pub use config::{AnimationConfig, EffectSettings, EventRules, EventTable};
pub use dodge::{DodgeAssignment, DodgeDirection};
pub use engine::{AnimKey, AnimationEngine, EventOutcome, FinishedAnimation, FrameReport};
pub use error::ConfigError;
pub use event::{DirectionOverride, EventSet, WindowEvent};
pub use matching::{WindowInfo, WindowKind, WindowMatch};
pub use paint::{PaintAttrib, PaintOutput, ParticleLayer};
pub use registry::{EffectDescriptor, EffectEnv, EffectId, EffectRegistry, EffectVariant};
pub use timing::AnimationTimer;
pub use window::{AnimatedWindow, DeferredAction, EffectState, WindowId};

pub use kinesis_3d::{ModelGeometry, PaintClip};
