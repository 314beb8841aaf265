use crate::model::Sector;

pub const SECTOR_SPAN_DEGREES: f64 = 90.0;
pub const SECTOR_INSET_DEGREES: f64 = 10.0;

/// A wedge of the circle, in degrees counter-clockwise from the positive x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub start: f64,
    pub span: f64,
    pub inset: f64,
}

impl Arc {
    pub fn end(&self) -> f64 {
        self.start + self.span
    }

    pub fn midpoint(&self) -> f64 {
        self.start + self.span / 2.0
    }

    /// Angles a blip may occupy: the arc minus the inset on both edges.
    pub fn usable(&self) -> (f64, f64) {
        (self.start + self.inset, self.end() - self.inset)
    }

    /// Spreads `count` items over the usable span in input order. A single
    /// item sits on the midpoint; an empty group yields nothing.
    pub fn allocate(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.midpoint()],
            n => {
                let (lo, hi) = self.usable();
                let step = (hi - lo) / (n - 1) as f64;
                (0..n).map(|i| lo + step * i as f64).collect()
            }
        }
    }
}

impl Sector {
    pub fn arc(self) -> Arc {
        Arc {
            start: self.ordinal() * SECTOR_SPAN_DEGREES,
            span: SECTOR_SPAN_DEGREES,
            inset: SECTOR_INSET_DEGREES,
        }
    }
}
