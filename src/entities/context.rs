use crate::input::InputSnapshot;

/// Dimensions of the play field, in field units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True once a box of `w`x`h` centered at `(x, y)` lies entirely outside the field.
    pub fn is_outside(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        x + w < 0.0 || x - w > self.width || y + h < 0.0 || y - h > self.height
    }

    /// Clamps a point into `[0, width] x [0, height]`.
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        (x.clamp(0.0, self.width), y.clamp(0.0, self.height))
    }
}

/// Everything an entity may read during one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Milliseconds on the monotonic clock, sampled once for the whole tick.
    pub now: u64,
    pub field: Field,
    pub input: &'a InputSnapshot,
}

impl<'a> TickContext<'a> {
    pub fn new(now: u64, field: Field, input: &'a InputSnapshot) -> Self {
        Self { now, field, input }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_outside() {
        let field = Field::new(640.0, 480.0);
        assert!(!field.is_outside(320.0, 240.0, 32.0, 32.0));
        // Partially visible at the top edge
        assert!(!field.is_outside(320.0, -20.0, 32.0, 32.0));
        assert!(field.is_outside(320.0, -33.0, 32.0, 32.0));
        assert!(field.is_outside(320.0, 513.0, 32.0, 32.0));
        assert!(field.is_outside(-40.0, 240.0, 32.0, 32.0));
        assert!(field.is_outside(680.0, 240.0, 32.0, 32.0));
    }

    #[test]
    fn test_clamp() {
        let field = Field::new(640.0, 480.0);
        assert_eq!(field.clamp(-5.0, 500.0), (0.0, 480.0));
        assert_eq!(field.clamp(100.0, 100.0), (100.0, 100.0));
    }
}
