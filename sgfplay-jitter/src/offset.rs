/// Offset of a stone from its grid point, in stone-radius units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset2D {
    pub dx: f64,
    pub dy: f64,
}

impl Offset2D {
    pub const ZERO: Offset2D = Offset2D { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Offset2D { dx, dy }
    }

    /// Clamp each axis to `[-limit, limit]`
    #[inline]
    pub fn clamped(&self, limit: f64) -> Offset2D {
        Offset2D {
            dx: self.dx.clamp(-limit, limit),
            dy: self.dy.clamp(-limit, limit),
        }
    }

    /// True if no axis exceeds `limit`
    pub fn within(&self, limit: f64) -> bool {
        self.dx.abs() <= limit && self.dy.abs() <= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped() {
        let o = Offset2D::new(0.5, -0.7).clamped(0.2);
        assert_eq!(o, Offset2D::new(0.2, -0.2));
        assert!(o.within(0.2));

        let inside = Offset2D::new(0.05, -0.1);
        assert_eq!(inside.clamped(0.2), inside);
    }
}
