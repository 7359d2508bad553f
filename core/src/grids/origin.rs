//! Pixel placement of grids and icons
//!
//! Everything here is a pure function of its inputs so the same frame state
//! always lays out the same way.

use glam::{IVec2, Vec2};

use super::Grid;

/// Mouse buttons that can freeze an attached grid while held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    fn bit(self) -> u8 {
        match self {
            MouseButton::Left => 0b01,
            MouseButton::Right => 0b10,
        }
    }
}

/// Cursor state as seen by the overlay
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseState {
    pub position: Vec2,
    /// Position at the moment the first button went down
    pub held_position: Vec2,
    held: u8,
}

impl MouseState {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn moved(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn button(&mut self, button: MouseButton, down: bool) {
        let was_holding = self.is_held();
        if down {
            self.held |= button.bit();
        } else {
            self.held &= !button.bit();
        }
        if !was_holding && self.is_held() {
            self.held_position = self.position;
        }
    }

    pub fn is_held(&self) -> bool {
        self.held != 0
    }

    /// Whether the cursor lies inside a screen of the given size
    pub fn is_on_screen(&self, screen: Vec2) -> bool {
        self.position.x >= 0.0
            && self.position.y >= 0.0
            && self.position.x <= screen.x
            && self.position.y <= screen.y
    }
}

/// Pixel origin of a grid for this frame.
///
/// `edit_anchor` is true when the grid is under edit focus and test-mouse
/// mode is off; such grids stay centred so they can be edited.
pub fn resolve_origin(grid: &Grid, screen: Vec2, mouse: &MouseState, edit_anchor: bool) -> Vec2 {
    let center = screen * 0.5;
    if !grid.attached || edit_anchor {
        return center + grid.offset.as_vec2();
    }

    let mut origin = if !grid.track_mouse_while_held && mouse.is_held() {
        mouse.held_position
    } else {
        mouse.position
    };

    if grid.has_mouse_clip() {
        origin = origin
            .max(grid.mouse_clip_min.as_vec2())
            .min(grid.mouse_clip_max.as_vec2());
    }

    if grid.central_weight > 0.0 {
        origin = origin.lerp(center, grid.central_weight);
    }

    origin
}

/// Top-left pixel of an item cell
#[inline]
pub fn item_position(origin: Vec2, cell: IVec2, spacing: IVec2) -> Vec2 {
    origin + (cell * spacing).as_vec2()
}

/// Fit an icon of intrinsic size `(w, h)` into a cell `avail_w` wide.
///
/// The shorter side is first expanded to keep the aspect ratio; if the width
/// then exceeds the available width both sides shrink proportionally.
pub fn fit_to_area(w: f32, h: f32, avail_w: f32) -> Vec2 {
    let mut dims = Vec2::new(w, h);
    if dims.x < dims.y {
        dims.x = dims.y * w / h;
    } else if dims.x > dims.y {
        dims.y = dims.x * h / w;
    }

    if avail_w < dims.x {
        dims.y *= avail_w / dims.x;
        dims.x = avail_w;
    }

    dims
}

/// Grid cell under the cursor, relative to the screen centre
pub fn cell_under(mouse: Vec2, screen: Vec2, spacing: IVec2) -> IVec2 {
    let rel = mouse - screen * 0.5;
    (rel / spacing.max(IVec2::ONE).as_vec2()).floor().as_ivec2()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Vec2 = Vec2::new(1920.0, 1080.0);

    fn attached() -> Grid {
        Grid {
            attached: true,
            ..Grid::default()
        }
    }

    #[test]
    fn test_fixed_grid_uses_center_and_offset() {
        let grid = Grid {
            offset: IVec2::new(10, -20),
            ..Grid::default()
        };
        let origin = resolve_origin(&grid, SCREEN, &MouseState::at(Vec2::new(5.0, 5.0)), false);
        assert_eq!(origin, Vec2::new(970.0, 520.0));
    }

    #[test]
    fn test_central_weight_pulls_toward_center() {
        let grid = Grid {
            central_weight: 0.5,
            ..attached()
        };
        let origin = resolve_origin(&grid, SCREEN, &MouseState::at(Vec2::new(100.0, 100.0)), false);
        assert_eq!(origin, Vec2::new(530.0, 320.0));
    }

    #[test]
    fn test_edit_anchor_overrides_attachment() {
        let grid = Grid {
            offset: IVec2::new(1, 2),
            ..attached()
        };
        let origin = resolve_origin(&grid, SCREEN, &MouseState::at(Vec2::new(100.0, 100.0)), true);
        assert_eq!(origin, Vec2::new(961.0, 542.0));
    }

    #[test]
    fn test_clip_clamps_before_weighting() {
        let mut grid = attached();
        grid.mouse_clip_min = IVec2::new(200, 200);
        grid.mouse_clip_max = IVec2::new(800, 600);

        let origin = resolve_origin(&grid, SCREEN, &MouseState::at(Vec2::new(100.0, 900.0)), false);
        assert_eq!(origin, Vec2::new(200.0, 600.0));

        grid.central_weight = 1.0;
        let origin = resolve_origin(&grid, SCREEN, &MouseState::at(Vec2::new(100.0, 900.0)), false);
        assert_eq!(origin, SCREEN * 0.5);
    }

    #[test]
    fn test_held_mouse_freezes_untracked_grid() {
        let mut mouse = MouseState::at(Vec2::new(300.0, 300.0));
        mouse.button(MouseButton::Right, true);
        mouse.moved(Vec2::new(700.0, 100.0));
        // second button does not move the held anchor
        mouse.button(MouseButton::Left, true);
        mouse.moved(Vec2::new(50.0, 50.0));

        let tracking = attached();
        let frozen = Grid {
            track_mouse_while_held: false,
            ..attached()
        };
        assert_eq!(resolve_origin(&tracking, SCREEN, &mouse, false), Vec2::new(50.0, 50.0));
        assert_eq!(resolve_origin(&frozen, SCREEN, &mouse, false), Vec2::new(300.0, 300.0));

        mouse.button(MouseButton::Right, false);
        mouse.button(MouseButton::Left, false);
        assert_eq!(resolve_origin(&frozen, SCREEN, &mouse, false), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_fit_to_area() {
        assert_eq!(fit_to_area(128.0, 128.0, 64.0), Vec2::new(64.0, 64.0));
        assert_eq!(fit_to_area(128.0, 128.0, 256.0), Vec2::new(128.0, 128.0));
        // wide icons: height follows aspect, then both shrink to the width
        assert_eq!(fit_to_area(200.0, 100.0, 100.0), Vec2::new(100.0, 50.0));
        // tall icons keep their size when they fit
        assert_eq!(fit_to_area(50.0, 100.0, 64.0), Vec2::new(50.0, 100.0));
    }

    #[test]
    fn test_item_position_and_cell_under() {
        let spacing = IVec2::new(64, 32);
        assert_eq!(
            item_position(Vec2::new(960.0, 540.0), IVec2::new(-1, 2), spacing),
            Vec2::new(896.0, 604.0)
        );
        assert_eq!(cell_under(Vec2::new(900.0, 600.0), SCREEN, spacing), IVec2::new(-1, 1));
        assert_eq!(cell_under(Vec2::new(960.0, 540.0), SCREEN, spacing), IVec2::ZERO);
    }

    #[test]
    fn test_on_screen() {
        assert!(MouseState::at(Vec2::new(0.0, 1080.0)).is_on_screen(SCREEN));
        assert!(!MouseState::at(Vec2::new(-1.0, 10.0)).is_on_screen(SCREEN));
    }
}
