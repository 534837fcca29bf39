//! Window lifecycle events
//!
//! Provides the event kinds that trigger animations and the helpers the state
//! machine uses to decide direction and reversal.

use serde::{Deserialize, Serialize};

/// Lifecycle event driving a window's animation
///
/// `None` doubles as the idle state between runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowEvent {
    /// Idle, no animation running
    #[default]
    None,
    Minimize,
    Unminimize,
    Close,
    Open,
    Focus,
    Shade,
    Unshade,
}

impl WindowEvent {
    /// Every event that can trigger an animation
    pub const ALL: [WindowEvent; 7] = [
        WindowEvent::Minimize,
        WindowEvent::Unminimize,
        WindowEvent::Close,
        WindowEvent::Open,
        WindowEvent::Focus,
        WindowEvent::Shade,
        WindowEvent::Unshade,
    ];

    /// The event that undoes this one
    pub fn opposite(self) -> Option<WindowEvent> {
        match self {
            WindowEvent::Minimize => Some(WindowEvent::Unminimize),
            WindowEvent::Unminimize => Some(WindowEvent::Minimize),
            WindowEvent::Close => Some(WindowEvent::Open),
            WindowEvent::Open => Some(WindowEvent::Close),
            WindowEvent::Shade => Some(WindowEvent::Unshade),
            WindowEvent::Unshade => Some(WindowEvent::Shade),
            WindowEvent::None | WindowEvent::Focus => None,
        }
    }

    /// Whether progress runs backwards for this event
    ///
    /// Effects are written for the "disappearing" direction; appearing events
    /// play them in reverse.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            WindowEvent::Unminimize | WindowEvent::Open | WindowEvent::Unshade | WindowEvent::Focus
        )
    }

    /// Whether the host unmaps the window when this event completes
    pub fn hides_window(self) -> bool {
        matches!(self, WindowEvent::Minimize | WindowEvent::Close)
    }

    pub fn is_shade(self) -> bool {
        matches!(self, WindowEvent::Shade | WindowEvent::Unshade)
    }

    pub fn is_idle(self) -> bool {
        self == WindowEvent::None
    }

    pub fn name(self) -> &'static str {
        match self {
            WindowEvent::None => "none",
            WindowEvent::Minimize => "minimize",
            WindowEvent::Unminimize => "unminimize",
            WindowEvent::Close => "close",
            WindowEvent::Open => "open",
            WindowEvent::Focus => "focus",
            WindowEvent::Shade => "shade",
            WindowEvent::Unshade => "unshade",
        }
    }

    fn bit(self) -> u8 {
        match self {
            WindowEvent::None => 0,
            WindowEvent::Minimize => 1 << 0,
            WindowEvent::Unminimize => 1 << 1,
            WindowEvent::Close => 1 << 2,
            WindowEvent::Open => 1 << 3,
            WindowEvent::Focus => 1 << 4,
            WindowEvent::Shade => 1 << 5,
            WindowEvent::Unshade => 1 << 6,
        }
    }
}

/// Set of events an effect may be used for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventSet(u8);

impl EventSet {
    pub const EMPTY: EventSet = EventSet(0);
    pub const ALL: EventSet = EventSet(0x7F);

    pub fn of(events: &[WindowEvent]) -> Self {
        EventSet(events.iter().fold(0, |bits, e| bits | e.bit()))
    }

    pub fn contains(&self, event: WindowEvent) -> bool {
        event != WindowEvent::None && self.0 & event.bit() != 0
    }
}

/// Forces the progress direction regardless of the current event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DirectionOverride {
    /// Follow the event's natural direction
    #[default]
    None,
    Forward,
    Backward,
}

impl DirectionOverride {
    /// Override matching an event's natural direction
    pub fn for_event(event: WindowEvent) -> Self {
        if event.is_reverse() {
            DirectionOverride::Backward
        } else {
            DirectionOverride::Forward
        }
    }

    /// Whether progress should be inverted for `event`
    pub fn is_reverse(self, event: WindowEvent) -> bool {
        match self {
            DirectionOverride::None => event.is_reverse(),
            DirectionOverride::Forward => false,
            DirectionOverride::Backward => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposites_are_symmetric() {
        for event in WindowEvent::ALL {
            if let Some(opposite) = event.opposite() {
                assert_eq!(opposite.opposite(), Some(event));
                assert_ne!(event.is_reverse(), opposite.is_reverse());
            }
        }
        assert_eq!(WindowEvent::Focus.opposite(), None);
    }

    #[test]
    fn test_event_set() {
        let set = EventSet::of(&[WindowEvent::Shade, WindowEvent::Unshade]);
        assert!(set.contains(WindowEvent::Shade));
        assert!(!set.contains(WindowEvent::Close));
        assert!(!EventSet::ALL.contains(WindowEvent::None));
        for event in WindowEvent::ALL {
            assert!(EventSet::ALL.contains(event));
        }
    }

    #[test]
    fn test_direction_override() {
        assert!(DirectionOverride::None.is_reverse(WindowEvent::Open));
        assert!(!DirectionOverride::None.is_reverse(WindowEvent::Close));
        assert!(!DirectionOverride::Forward.is_reverse(WindowEvent::Focus));
        assert!(DirectionOverride::Backward.is_reverse(WindowEvent::Minimize));
        assert_eq!(
            DirectionOverride::for_event(WindowEvent::Unminimize),
            DirectionOverride::Backward
        );
    }

    #[test]
    fn test_serde_names() {
        let event: WindowEvent = serde_json::from_str("\"unminimize\"").unwrap();
        assert_eq!(event, WindowEvent::Unminimize);
        assert_eq!(event.name(), "unminimize");
    }
}
