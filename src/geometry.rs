use std::collections::HashMap;

/// Viewport rectangle in terminal cells. Fractional so it can be interpolated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

/// Supplies the on-screen rectangle of things the animation needs to measure.
pub trait Geometry {
    fn card_rect(&self, id: &str) -> Option<Rect>;
    fn dialog_rect(&self) -> Option<Rect>;
}

/// Rectangles recorded by the last draw pass.
#[derive(Debug, Default, Clone)]
pub struct LayoutRegistry {
    cards: HashMap<String, Rect>,
    dialog: Option<Rect>,
}

impl Rect {
    pub const fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Rect {
            top,
            left,
            width,
            height,
        }
    }

    pub fn lerp(&self, to: &Rect, t: f32) -> Rect {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Rect {
            top: mix(self.top, to.top),
            left: mix(self.left, to.left),
            width: mix(self.width, to.width),
            height: mix(self.height, to.height),
        }
    }

    /// True when every edge is within `tolerance` cells of `other`.
    pub fn approx_eq(&self, other: &Rect, tolerance: f32) -> bool {
        (self.top - other.top).abs() <= tolerance
            && (self.left - other.left).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }

    /// Snaps to whole cells and clips to `bounds`.
    pub fn to_cells(&self, bounds: ratatui::layout::Rect) -> ratatui::layout::Rect {
        let round = |v: f32| v.round().max(0.0) as u16;
        let cells = ratatui::layout::Rect::new(
            round(self.left),
            round(self.top),
            round(self.width),
            round(self.height),
        );
        cells.intersection(bounds)
    }
}

impl From<ratatui::layout::Rect> for Rect {
    fn from(r: ratatui::layout::Rect) -> Self {
        Rect::new(r.y as f32, r.x as f32, r.width as f32, r.height as f32)
    }
}

/// Cubic ease-in-out over `t` in `[0, 1]`.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

impl LayoutRegistry {
    pub fn begin_frame(&mut self) {
        self.cards.clear();
        self.dialog = None;
    }

    pub fn register_card(&mut self, id: &str, rect: Rect) {
        self.cards.insert(id.to_string(), rect);
    }

    pub fn register_dialog(&mut self, rect: Rect) {
        self.dialog = Some(rect);
    }
}

impl Geometry for LayoutRegistry {
    fn card_rect(&self, id: &str) -> Option<Rect> {
        self.cards.get(id).copied()
    }

    fn dialog_rect(&self) -> Option<Rect> {
        self.dialog
    }
}
