use foundation::math::Vec3;
use foundation::{CountryCode, Rgb, color_for};

pub const IDLE_SCALE: f64 = 1.0;
pub const EMPHASIZED_SCALE: f64 = 1.5;
pub const IDLE_EMISSIVE: f32 = 0.3;
pub const EMPHASIZED_EMISSIVE: f32 = 0.8;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MarkerState {
    pub hovered: bool,
    pub selected: bool,
}

impl MarkerState {
    pub fn is_emphasized(&self) -> bool {
        self.hovered || self.selected
    }
}

/// What the renderer needs to draw one marker.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerVisual {
    pub scale: f64,
    pub color: Rgb,
    pub emissive: Rgb,
    pub emissive_intensity: f32,
}

/// Visual attributes are a pure function of interaction state and score.
pub fn marker_visual(state: MarkerState, score: f64) -> MarkerVisual {
    let color = color_for(score);
    let (scale, emissive_intensity) = if state.is_emphasized() {
        (EMPHASIZED_SCALE, EMPHASIZED_EMISSIVE)
    } else {
        (IDLE_SCALE, IDLE_EMISSIVE)
    };
    MarkerVisual {
        scale,
        color,
        emissive: color,
        emissive_intensity,
    }
}

/// Selection request raised by clicking a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectIntent(pub Option<CountryCode>);

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub code: CountryCode,
    pub score: f64,
    /// Position on the unrotated globe.
    pub anchor: Vec3,
    pub state: MarkerState,
}

impl Marker {
    pub fn new(code: CountryCode, score: f64, anchor: Vec3) -> Self {
        Self {
            code,
            score,
            anchor,
            state: MarkerState::default(),
        }
    }

    pub fn visual(&self) -> MarkerVisual {
        marker_visual(self.state, self.score)
    }

    /// Returns true if the hover state changed.
    pub fn pointer_enter(&mut self) -> bool {
        let changed = !self.state.hovered;
        self.state.hovered = true;
        changed
    }

    pub fn pointer_leave(&mut self) -> bool {
        let changed = self.state.hovered;
        self.state.hovered = false;
        changed
    }

    /// Clicking the selected marker deselects; any other marker selects itself.
    pub fn click(&self) -> SelectIntent {
        if self.state.selected {
            SelectIntent(None)
        } else {
            SelectIntent(Some(self.code.clone()))
        }
    }
}
