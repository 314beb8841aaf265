use crate::urgency::UrgencyBand;
use serde::{Deserialize, Serialize};

/// Centre of the 0..100 coordinate space.
pub const ORIGIN: f64 = 50.0;
/// Ring radii are fractions of this extent.
pub const EXTENT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Radius fraction per band, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rings {
    pub now: f64,
    pub today: f64,
    pub later: f64,
}

impl Default for Rings {
    fn default() -> Self {
        Rings {
            now: 0.12,
            today: 0.27,
            later: 0.38,
        }
    }
}

impl Rings {
    pub fn fraction(&self, band: UrgencyBand) -> f64 {
        match band {
            UrgencyBand::Now => self.now,
            UrgencyBand::Today => self.today,
            UrgencyBand::Later => self.later,
        }
    }

    pub fn radius(&self, band: UrgencyBand) -> f64 {
        self.fraction(band) * EXTENT
    }

    /// `y` grows downward, so the sine term is subtracted.
    pub fn project(&self, band: UrgencyBand, angle_degrees: f64) -> Point {
        polar(self.radius(band), angle_degrees)
    }
}

pub fn polar(radius: f64, angle_degrees: f64) -> Point {
    let theta = angle_degrees.rem_euclid(360.0).to_radians();
    Point {
        x: ORIGIN + radius * theta.cos(),
        y: ORIGIN - radius * theta.sin(),
    }
}

pub fn project(band: UrgencyBand, angle_degrees: f64) -> Point {
    Rings::default().project(band, angle_degrees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cardinal_directions() {
        let r = Rings::default().radius(UrgencyBand::Later);
        let east = project(UrgencyBand::Later, 0.0);
        assert_abs_diff_eq!(east.x, ORIGIN + r, epsilon = 1e-9);
        assert_abs_diff_eq!(east.y, ORIGIN, epsilon = 1e-9);

        let north = project(UrgencyBand::Later, 90.0);
        assert_abs_diff_eq!(north.x, ORIGIN, epsilon = 1e-9);
        assert_abs_diff_eq!(north.y, ORIGIN - r, epsilon = 1e-9);
    }

    #[test]
    fn full_turn_wraps_to_start() {
        let a = project(UrgencyBand::Today, 0.0);
        let b = project(UrgencyBand::Today, 360.0);
        let c = project(UrgencyBand::Today, -360.0);
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
        assert_abs_diff_eq!(a.x, c.x, epsilon = 1e-9);
    }

    #[test]
    fn rings_grow_outward() {
        let rings = Rings::default();
        assert!(rings.radius(UrgencyBand::Now) < rings.radius(UrgencyBand::Today));
        assert!(rings.radius(UrgencyBand::Today) < rings.radius(UrgencyBand::Later));
    }

    #[test]
    fn projected_points_stay_in_bounds() {
        for band in [UrgencyBand::Now, UrgencyBand::Today, UrgencyBand::Later] {
            for deg in (0..360).step_by(5) {
                let p = project(band, deg as f64);
                assert!((0.0..=100.0).contains(&p.x));
                assert!((0.0..=100.0).contains(&p.y));
            }
        }
    }
}
