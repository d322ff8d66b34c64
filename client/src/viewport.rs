use std::f64::consts::PI;

use geo::Rect;
use visitmap_shared::Position;

/// Side length of the Web-Mercator world square at scale 1.
pub const WORLD_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_78;

const MIN_SCALE: f64 = 0.5;
const MAX_SCALE: f64 = 65_536.0;
const ZOOM_SENSITIVITY: f64 = 0.0015;
const FIT_PADDING: f64 = 0.05;

/// Longitude/latitude to Web-Mercator world coordinates (y grows southward).
pub fn project(position: Position) -> (f64, f64) {
    let [lon, lat] = position;
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lon + 180.0) / 360.0 * WORLD_SIZE;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * WORLD_SIZE;
    (x, y)
}

pub fn unproject(wx: f64, wy: f64) -> Position {
    let lon = wx / WORLD_SIZE * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * wy / WORLD_SIZE);
    let lat = n.sinh().atan().to_degrees();
    [lon, lat]
}

/// Pan/zoom transform from world coordinates to canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            wx * self.scale + self.offset_x,
            wy * self.scale + self.offset_y,
        )
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.offset_x) / self.scale,
            (sy - self.offset_y) / self.scale,
        )
    }

    pub fn position_to_screen(&self, position: Position) -> (f64, f64) {
        let (wx, wy) = project(position);
        self.world_to_screen(wx, wy)
    }

    /// Longitude/latitude under a canvas pixel.
    pub fn screen_to_position(&self, sx: f64, sy: f64) -> Position {
        let (wx, wy) = self.screen_to_world(sx, sy);
        unproject(wx, wy)
    }

    /// Zoom toward a focus point (screen coordinates).
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = (-delta * ZOOM_SENSITIVITY).exp();
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;

        // Keep the point under the cursor fixed
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Fit a longitude/latitude rectangle into the canvas with a small margin.
    /// A zero-sized canvas leaves the viewport as is.
    pub fn fit_bounds(&mut self, bounds: &Rect<f64>, canvas_w: f64, canvas_h: f64) {
        if canvas_w <= 0.0 || canvas_h <= 0.0 {
            return;
        }
        let (lo, hi) = (bounds.min(), bounds.max());
        let (min_x, max_y) = project([lo.x, lo.y]);
        let (max_x, min_y) = project([hi.x, hi.y]);
        let world_w = (max_x - min_x).max(f64::EPSILON);
        let world_h = (max_y - min_y).max(f64::EPSILON);

        let scale_x = canvas_w / (world_w * (1.0 + FIT_PADDING * 2.0));
        let scale_y = canvas_h / (world_h * (1.0 + FIT_PADDING * 2.0));
        self.scale = scale_x.min(scale_y).clamp(MIN_SCALE, MAX_SCALE);

        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0;
        self.offset_x = canvas_w / 2.0 - center_x * self.scale;
        self.offset_y = canvas_h / 2.0 - center_y * self.scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn projection_round_trips_and_orients_north_up() {
        let taipei = [121.5, 25.05];
        let (wx, wy) = project(taipei);
        let [lon, lat] = unproject(wx, wy);
        assert!(close(lon, 121.5) && close(lat, 25.05));

        let (_, south_y) = project([121.5, 22.0]);
        assert!(south_y > wy);
        assert_eq!(project([0.0, 0.0]), (WORLD_SIZE / 2.0, WORLD_SIZE / 2.0));
    }

    #[test]
    fn fit_bounds_centres_region() {
        let bounds = Rect::new((120.0, 22.0), (122.0, 25.5));
        let mut viewport = Viewport::default();
        viewport.fit_bounds(&bounds, 800.0, 600.0);

        let (sx, sy) = viewport.position_to_screen([120.0, 25.5]);
        let (ex, ey) = viewport.position_to_screen([122.0, 22.0]);
        assert!(sx >= 0.0 && ex <= 800.0 && sy >= 0.0 && ey <= 600.0);
        assert!(close((sx + ex) / 2.0, 400.0) || close((sy + ey) / 2.0, 300.0));
    }

    #[test]
    fn fit_bounds_ignores_unsized_canvas() {
        let mut viewport = Viewport::default();
        viewport.fit_bounds(&Rect::new((120.0, 22.0), (122.0, 25.5)), 0.0, 600.0);
        assert_eq!(viewport, Viewport::default());
    }

    #[test]
    fn zoom_keeps_cursor_position_fixed() {
        let mut viewport = Viewport {
            offset_x: -100.0,
            offset_y: 40.0,
            scale: 50.0,
        };
        let before = viewport.screen_to_world(320.0, 200.0);
        viewport.zoom_at(-200.0, 320.0, 200.0);
        let after = viewport.screen_to_world(320.0, 200.0);
        assert!(viewport.scale > 50.0);
        assert!(close(before.0, after.0) && close(before.1, after.1));
    }
}
