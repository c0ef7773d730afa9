use std::ops::{Add, Mul, Sub};

/// A point or direction in field space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    /// Partial update: `None` leaves that component as it is.
    pub fn set(&mut self, x: Option<f32>, y: Option<f32>) {
        if let Some(x) = x {
            self.x = x;
        }
        if let Some(y) = y {
            self.y = y;
        }
    }

    pub fn distance(&self, other: &Vector2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f32 {
        self.distance(&Vector2::default())
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f32) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_partial_set() {
        let mut v = Vector2::new(1.0, 2.0);
        v.set(None, Some(9.0));
        assert_eq!(v, Vector2::new(1.0, 9.0));
        v.set(Some(-4.0), None);
        assert_eq!(v, Vector2::new(-4.0, 9.0));
        v.set(None, None);
        assert_eq!(v, Vector2::new(-4.0, 9.0));
    }

    #[test]
    fn test_operators() {
        let v = Vector2::new(1.0, -2.0);
        assert_eq!(v + Vector2::new(1.0, 1.0), Vector2::new(2.0, -1.0));
        assert_eq!(v - Vector2::new(1.0, 1.0), Vector2::new(0.0, -3.0));
        assert_eq!(v * 3.0, Vector2::new(3.0, -6.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_from_angle_is_unit_length(angle in 0.0f32..std::f32::consts::TAU) {
                let v = Vector2::from_angle(angle);
                prop_assert!((v.length() - 1.0).abs() < 1e-5);
            }

            #[test]
            fn test_distance_is_symmetric(
                ax in -1000.0f32..1000.0, ay in -1000.0f32..1000.0,
                bx in -1000.0f32..1000.0, by in -1000.0f32..1000.0,
            ) {
                let a = Vector2::new(ax, ay);
                let b = Vector2::new(bx, by);
                prop_assert_eq!(a.distance(&b), b.distance(&a));
                prop_assert!(a.distance(&b) >= 0.0);
            }
        }
    }
}
