//! Engine configuration
//!
//! Loaded from TOML or JSON. Every field has a default, so a partial file only
//! overrides what it names.
//!
//! ```toml
//! time_step_ms = 10
//!
//! [events.close]
//! effects = ["explode", "fade"]
//! durations = [500, 150]
//! matches = ["type=normal", "any"]
//!
//! [effects.explode]
//! shape = "hexagonal"
//! grid_x = 16
//! ```

use crate::error::{ConfigError, Result};
use crate::event::WindowEvent;
use crate::timing::DEFAULT_TIME_STEP_MS;
use kinesis_3d::polygon::{CorrectPerspective, TessellationShape, DEFAULT_MAX_CLIPS, DEFAULT_MAX_POLYGONS};
use kinesis_core::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Length of one animation step in milliseconds
    pub time_step_ms: f32,
    /// Seed for effect selection and particle jitter; entropy when unset
    pub random_seed: Option<u64>,
    pub max_polygons: usize,
    pub max_clips: usize,
    pub events: EventTable,
    pub effects: EffectSettings,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            time_step_ms: DEFAULT_TIME_STEP_MS,
            random_seed: None,
            max_polygons: DEFAULT_MAX_POLYGONS,
            max_clips: DEFAULT_MAX_CLIPS,
            events: EventTable::default(),
            effects: EffectSettings::default(),
        }
    }
}

impl AnimationConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the format by extension (`.json`, otherwise TOML)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        tracing::debug!("loading animation config from {}", path.display());
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Reject values no engine could run with
    ///
    /// Option list mismatches are not rejected here: they only disable the
    /// affected event, see [`crate::matching::CompiledRules`].
    pub fn validate(&self) -> Result<()> {
        if self.time_step_ms.is_nan() || self.time_step_ms <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time_step_ms must be positive, got {}",
                self.time_step_ms
            )));
        }
        if self.max_polygons == 0 || self.max_clips == 0 {
            return Err(ConfigError::Invalid(
                "max_polygons and max_clips must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Builder-style override of one event's rules
    pub fn with_event(mut self, event: WindowEvent, rules: EventRules) -> Self {
        if let Some(slot) = self.events.get_mut(event) {
            *slot = rules;
        }
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Per-event rules
// ─────────────────────────────────────────────────────────────────────────────

/// Parallel option lists for one lifecycle event
///
/// Row `i` applies `effects[i]` for `durations[i]` milliseconds to windows
/// matching `matches[i]`. `random_effects` is the pool `random` draws from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventRules {
    pub effects: Vec<String>,
    pub durations: Vec<f32>,
    pub matches: Vec<String>,
    pub random_effects: Vec<String>,
}

impl EventRules {
    /// A single row matching `rule`
    pub fn single(effect: &str, duration_ms: f32, rule: &str) -> Self {
        Self {
            effects: vec![effect.to_string()],
            durations: vec![duration_ms],
            matches: vec![rule.to_string()],
            random_effects: Vec::new(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, effect: &str, duration_ms: f32, rule: &str) -> Self {
        self.effects.push(effect.to_string());
        self.durations.push(duration_ms);
        self.matches.push(rule.to_string());
        self
    }

    pub fn with_random_effects(mut self, effects: &[&str]) -> Self {
        self.random_effects = effects.iter().map(|s| s.to_string()).collect();
        self
    }
}

const NORMAL_WINDOWS: &str = "type=normal|dialog|utility";

/// Rules for every lifecycle event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTable {
    pub minimize: EventRules,
    pub unminimize: EventRules,
    pub close: EventRules,
    pub open: EventRules,
    pub focus: EventRules,
    pub shade: EventRules,
    pub unshade: EventRules,
}

impl Default for EventTable {
    fn default() -> Self {
        Self {
            minimize: EventRules::single("magic_lamp", 300.0, NORMAL_WINDOWS),
            unminimize: EventRules::single("magic_lamp", 300.0, NORMAL_WINDOWS),
            close: EventRules::single("fade", 200.0, "any"),
            open: EventRules::single("fade", 200.0, "any"),
            focus: EventRules::single("dodge", 250.0, NORMAL_WINDOWS),
            shade: EventRules::single("roll_up", 250.0, "any"),
            unshade: EventRules::single("roll_up", 250.0, "any"),
        }
    }
}

impl EventTable {
    pub fn get(&self, event: WindowEvent) -> Option<&EventRules> {
        match event {
            WindowEvent::None => None,
            WindowEvent::Minimize => Some(&self.minimize),
            WindowEvent::Unminimize => Some(&self.unminimize),
            WindowEvent::Close => Some(&self.close),
            WindowEvent::Open => Some(&self.open),
            WindowEvent::Focus => Some(&self.focus),
            WindowEvent::Shade => Some(&self.shade),
            WindowEvent::Unshade => Some(&self.unshade),
        }
    }

    pub fn get_mut(&mut self, event: WindowEvent) -> Option<&mut EventRules> {
        match event {
            WindowEvent::None => None,
            WindowEvent::Minimize => Some(&mut self.minimize),
            WindowEvent::Unminimize => Some(&mut self.unminimize),
            WindowEvent::Close => Some(&mut self.close),
            WindowEvent::Open => Some(&mut self.open),
            WindowEvent::Focus => Some(&mut self.focus),
            WindowEvent::Shade => Some(&mut self.shade),
            WindowEvent::Unshade => Some(&mut self.unshade),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Effect parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters of the built-in effects
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectSettings {
    pub fade: FadeSettings,
    pub zoom: ZoomSettings,
    pub magic_lamp: MagicLampSettings,
    pub wave: WaveSettings,
    pub roll_up: RollUpSettings,
    pub explode: ExplodeSettings,
    pub burn: BurnSettings,
    pub beam_up: BeamUpSettings,
    pub focus_fade: FocusFadeSettings,
    pub dodge: DodgeSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeSettings {
    /// Dim towards this brightness while fading
    pub dim_to: f32,
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self { dim_to: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    /// Zoom around the window center even when an icon rect is known
    pub from_center: bool,
    /// Smallest scale reached when zooming around the center
    pub min_scale: f32,
    pub deceleration: f32,
    /// Also fade out while zooming
    pub fade: bool,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            from_center: false,
            min_scale: 0.0,
            deceleration: 0.6,
            fade: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagicLampSettings {
    pub grid_height: u32,
    /// Number of sine half-waves along the window height
    pub waves: f32,
    /// Peak horizontal wobble in pixels
    pub wave_amplitude: f32,
}

impl Default for MagicLampSettings {
    fn default() -> Self {
        Self {
            grid_height: 100,
            waves: 2.0,
            wave_amplitude: 30.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSettings {
    pub grid_height: u32,
    /// Peak outward displacement in pixels
    pub amplitude: f32,
    /// Half the wave's extent, as a fraction of the window height
    pub half_width: f32,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            grid_height: 40,
            amplitude: 16.0,
            half_width: 0.25,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollUpSettings {
    pub grid_width: u32,
}

impl Default for RollUpSettings {
    fn default() -> Self {
        Self { grid_width: 2 }
    }
}

/// Serialized form of [`TessellationShape`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TessellationKind {
    #[default]
    Rectangular,
    Hexagonal,
}

impl From<TessellationKind> for TessellationShape {
    fn from(kind: TessellationKind) -> Self {
        match kind {
            TessellationKind::Rectangular => TessellationShape::Rectangular,
            TessellationKind::Hexagonal => TessellationShape::Hexagonal,
        }
    }
}

/// Serialized form of [`CorrectPerspective`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerspectiveKind {
    None,
    #[default]
    Polygon,
    Window,
}

impl From<PerspectiveKind> for CorrectPerspective {
    fn from(kind: PerspectiveKind) -> Self {
        match kind {
            PerspectiveKind::None => CorrectPerspective::None,
            PerspectiveKind::Polygon => CorrectPerspective::Polygon,
            PerspectiveKind::Window => CorrectPerspective::Window,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplodeSettings {
    pub shape: TessellationKind,
    pub grid_x: u32,
    pub grid_y: u32,
    /// Extrusion depth in pixels
    pub thickness: f32,
    /// Scales how far pieces fly
    pub spoke_multiplier: f32,
    /// Fraction of the run during which all pieces fade together
    pub fade_duration: f32,
    pub correct_perspective: PerspectiveKind,
}

impl Default for ExplodeSettings {
    fn default() -> Self {
        Self {
            shape: TessellationKind::Rectangular,
            grid_x: 13,
            grid_y: 10,
            thickness: 15.0,
            spoke_multiplier: 1.0,
            fade_duration: 0.3,
            correct_perspective: PerspectiveKind::Polygon,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurnSettings {
    pub particles: usize,
    pub size: f32,
    pub slowdown: f32,
    /// `#rrggbb` or `#rrggbbaa`
    pub color: String,
    pub smoke: bool,
}

impl Default for BurnSettings {
    fn default() -> Self {
        Self {
            particles: 1000,
            size: 10.0,
            slowdown: 0.5,
            color: "#ff8019ff".to_string(),
            smoke: true,
        }
    }
}

impl BurnSettings {
    pub fn color(&self) -> Color {
        parse_color(&self.color, Color::rgb(1.0, 0.5, 0.1))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamUpSettings {
    pub particles: usize,
    pub size: f32,
    pub slowdown: f32,
    pub color: String,
}

impl Default for BeamUpSettings {
    fn default() -> Self {
        Self {
            particles: 400,
            size: 6.0,
            slowdown: 0.6,
            color: "#b3b3b3ff".to_string(),
        }
    }
}

impl BeamUpSettings {
    pub fn color(&self) -> Color {
        parse_color(&self.color, Color::rgb(0.7, 0.7, 0.7))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusFadeSettings {
    /// Opacity the raised window starts from
    pub start_opacity: f32,
}

impl Default for FocusFadeSettings {
    fn default() -> Self {
        Self { start_opacity: 0.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgeSettings {
    /// Delay between consecutive dodging windows
    pub stagger_ms: f32,
    /// Extra clearance beyond the overlap, in pixels
    pub gap: f32,
}

impl Default for DodgeSettings {
    fn default() -> Self {
        Self {
            stagger_ms: 40.0,
            gap: 0.0,
        }
    }
}

fn parse_color(source: &str, fallback: Color) -> Color {
    Color::from_hex_str(source).unwrap_or_else(|| {
        tracing::warn!("invalid color '{}', using default", source);
        fallback
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnimationConfig::default();
        assert_eq!(config.time_step_ms, 10.0);
        assert_eq!(config.max_polygons, 4096);
        assert_eq!(config.events.minimize.effects, vec!["magic_lamp".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = AnimationConfig::from_toml_str(
            r#"
            time_step_ms = 20
            random_seed = 7

            [events.close]
            effects = ["explode", "fade"]
            durations = [500, 150]
            matches = ["type=normal", "any"]

            [effects.explode]
            shape = "hexagonal"
            grid_x = 16
            "#,
        )
        .unwrap();

        assert_eq!(config.time_step_ms, 20.0);
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.events.close.durations, vec![500.0, 150.0]);
        assert_eq!(config.effects.explode.shape, TessellationKind::Hexagonal);
        assert_eq!(config.effects.explode.grid_x, 16);
        // untouched fields keep defaults
        assert_eq!(config.effects.explode.grid_y, 10);
        assert_eq!(config.events.open.effects, vec!["fade".to_string()]);
    }

    #[test]
    fn test_json() {
        let config = AnimationConfig::from_json_str(
            r#"{ "events": { "minimize": { "effects": ["random"], "durations": [300],
                 "random_effects": ["zoom", "wave"] } } }"#,
        )
        .unwrap();
        assert_eq!(config.events.minimize.random_effects.len(), 2);
        assert!(config.events.minimize.matches.is_empty());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AnimationConfig::from_toml_str("time_step_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AnimationConfig::from_toml_str("time_step_ms = \"fast\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            AnimationConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let config = AnimationConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(AnimationConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_color_fallback() {
        let mut burn = BurnSettings::default();
        assert!((burn.color().r - 1.0).abs() < 0.001);
        burn.color = "orange".to_string();
        assert!((burn.color().g - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            AnimationConfig::load("/nonexistent/kinesis.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
