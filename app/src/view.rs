use crate::core::time::{DateTime, Duration};
use crate::floorplan::{Point, Size};

/// Zoom factor limits of the plan view.
pub const SCALE_EXTENT: (f64, f64) = (0.5, 10.0);

/// Zoom factor used when the camera centers on a room.
pub const FOCUS_SCALE: f64 = 1.6;

fn default_animation() -> Duration {
    Duration::seconds(1)
}

/// Translate and scale applied to the plan's top-level group.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    fn clamped(self) -> Self {
        Self {
            k: self.k.clamp(SCALE_EXTENT.0, SCALE_EXTENT.1),
            ..self
        }
    }

    fn lerp(self, to: Self, t: f64) -> Self {
        let at = |a: f64, b: f64| a + (b - a) * t;
        Self {
            x: at(self.x, to.x),
            y: at(self.y, to.y),
            k: at(self.k, to.k),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportState {
    Idle,
    Dragging {
        last: Point,
    },
    Animating {
        from: Transform,
        to: Transform,
        started: DateTime,
        duration: Duration,
    },
}

/// Camera over the floorplan. Every operation returns a new value; a
/// gesture arriving during an animation cancels it at the interpolated
/// position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub current: Transform,
    pub state: ViewportState,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            current: Transform::IDENTITY,
            state: ViewportState::Idle,
        }
    }
}

impl Viewport {
    /// Effective transform at the given instant. Pure in `now`.
    pub fn transform_at(&self, now: DateTime) -> Transform {
        match self.state {
            ViewportState::Animating {
                from,
                to,
                started,
                duration,
            } => {
                let t = progress(started, duration, now);
                if t >= 1.0 {
                    to
                } else {
                    from.lerp(to, ease_cubic_in_out(t))
                }
            }
            _ => self.current,
        }
    }

    /// Collapses a finished animation into the settled transform.
    pub fn settled(self, now: DateTime) -> Self {
        match self.state {
            ViewportState::Animating {
                to,
                started,
                duration,
                ..
            } if progress(started, duration, now) >= 1.0 => Self {
                current: to,
                state: ViewportState::Idle,
            },
            _ => self,
        }
    }

    fn frozen(self, now: DateTime) -> Self {
        Self {
            current: self.transform_at(now),
            state: ViewportState::Idle,
        }
    }

    pub fn pointer_down(self, now: DateTime, at: Point) -> Self {
        Self {
            state: ViewportState::Dragging { last: at },
            ..self.frozen(now)
        }
    }

    pub fn pointer_move(self, at: Point) -> Self {
        match self.state {
            ViewportState::Dragging { last } => {
                let delta = at - last;
                Self {
                    current: Transform {
                        x: self.current.x + delta.x,
                        y: self.current.y + delta.y,
                        k: self.current.k,
                    },
                    state: ViewportState::Dragging { last: at },
                }
            }
            _ => self,
        }
    }

    pub fn pointer_up(self) -> Self {
        match self.state {
            ViewportState::Dragging { .. } => Self {
                state: ViewportState::Idle,
                ..self
            },
            _ => self,
        }
    }

    /// Zooms about the focus point. The world point under the focus stays
    /// under it after the scale change.
    pub fn wheel(self, now: DateTime, delta: f64, focus: Point) -> Self {
        let from = self.frozen(now).current;
        let factor = 1.2_f64.powf(delta / 120.0);
        let k = (from.k * factor).clamp(SCALE_EXTENT.0, SCALE_EXTENT.1);
        let ratio = k / from.k;

        Self {
            current: Transform {
                x: focus.x - (focus.x - from.x) * ratio,
                y: focus.y - (focus.y - from.y) * ratio,
                k,
            },
            state: ViewportState::Idle,
        }
    }

    pub fn animate_to(self, now: DateTime, target: Transform, duration: Option<Duration>) -> Self {
        Self {
            current: self.current,
            state: ViewportState::Animating {
                from: self.transform_at(now),
                to: target.clamped(),
                started: now,
                duration: duration.unwrap_or_else(default_animation),
            },
        }
    }

    /// Animates back to the untransformed plan.
    pub fn reset(self, now: DateTime) -> Self {
        self.animate_to(now, Transform::IDENTITY, None)
    }

    /// Animates so that `target` lands at the viewport center, zoomed in.
    pub fn center_on(self, now: DateTime, target: Point, view: Size) -> Self {
        let to = Transform {
            x: view.width / 2.0 - target.x * FOCUS_SCALE,
            y: view.height / 2.0 - target.y * FOCUS_SCALE,
            k: FOCUS_SCALE,
        };
        self.animate_to(now, to, None)
    }
}

fn progress(started: DateTime, duration: Duration, now: DateTime) -> f64 {
    let total = duration.as_millis();
    if total <= 0 {
        return 1.0;
    }
    (now.elapsed_since(started).as_millis() as f64 / total as f64).clamp(0.0, 1.0)
}

fn ease_cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
