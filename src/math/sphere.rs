use glam::Vec3;

use super::AABB;

/// Sphere enclosing a point set, used for camera framing
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Centered on the box center, radius is the farthest point from it
    pub fn from_points(points: &[Vec3]) -> Option<BoundingSphere> {
        let bounds = AABB::from_points(points.iter().copied())?;
        let center = bounds.center();
        let radius = points
            .iter()
            .map(|p| p.distance_squared(center))
            .fold(0.0f32, f32::max)
            .sqrt();
        Some(BoundingSphere { center, radius })
    }

    pub fn union(&self, other: &BoundingSphere) -> BoundingSphere {
        let offset = other.center - self.center;
        let distance = offset.length();

        if distance + other.radius <= self.radius {
            return *self;
        }
        if distance + self.radius <= other.radius {
            return *other;
        }

        let radius = (distance + self.radius + other.radius) * 0.5;
        let center = self.center + offset * ((radius - self.radius) / distance);
        BoundingSphere { center, radius }
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.radius
    }
}
