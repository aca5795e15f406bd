//! 2D shapes for data-driven bounds description.
//!
//! Shapes form a closed set dispatched by variant. They are usually built
//! from JSON description data; a shape missing its required dimensions is a
//! configuration error.

use cgmath::MetricSpace;
use serde::Deserialize;

use crate::{error::EngineError, math::Vector2};

/// Raw description data shapes are configured from.
#[derive(Debug, Default, Deserialize)]
struct ShapeSpec {
    position: Option<[f32; 2]>,
    origin: Option<[f32; 2]>,
    radius: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
}

impl ShapeSpec {
    fn parse(value: &serde_json::Value) -> Result<Self, EngineError> {
        serde_json::from_value(value.clone())
            .map_err(|err| EngineError::Configuration(format!("malformed shape data: {}", err)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle2D {
    pub position: Vector2,
    pub origin: Vector2,
    pub radius: f32,
}

impl Circle2D {
    pub fn new(position: Vector2, radius: f32) -> Self {
        Self {
            position,
            origin: Vector2::new(0.0, 0.0),
            radius,
        }
    }

    /// Builds a circle from description data. The radius is required.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, EngineError> {
        let spec = ShapeSpec::parse(value)?;
        let radius = spec
            .radius
            .ok_or_else(|| EngineError::Configuration("circle requires a radius".to_string()))?;
        Ok(Self {
            position: spec.position.map(Vector2::from).unwrap_or(Vector2::new(0.0, 0.0)),
            origin: spec.origin.map(Vector2::from).unwrap_or(Vector2::new(0.0, 0.0)),
            radius,
        })
    }

    /// Render offset of this shape relative to its origin.
    pub fn offset(&self) -> Vector2 {
        Vector2::new(
            self.radius + self.radius * self.origin.x,
            self.radius + self.radius * self.origin.y,
        )
    }

    pub fn point_in_shape(&self, point: Vector2) -> bool {
        self.position.distance(point) <= self.radius
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rectangle2D {
    pub position: Vector2,
    pub origin: Vector2,
    pub width: f32,
    pub height: f32,
}

impl Rectangle2D {
    pub fn new(position: Vector2, width: f32, height: f32) -> Self {
        Self {
            position,
            origin: Vector2::new(0.0, 0.0),
            width,
            height,
        }
    }

    /// Builds a rectangle from description data. Width and height are required.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, EngineError> {
        let spec = ShapeSpec::parse(value)?;
        let width = spec
            .width
            .ok_or_else(|| EngineError::Configuration("rectangle requires a width".to_string()))?;
        let height = spec.height.ok_or_else(|| {
            EngineError::Configuration("rectangle requires a height".to_string())
        })?;
        Ok(Self {
            position: spec.position.map(Vector2::from).unwrap_or(Vector2::new(0.0, 0.0)),
            origin: spec.origin.map(Vector2::from).unwrap_or(Vector2::new(0.0, 0.0)),
            width,
            height,
        })
    }

    pub fn offset(&self) -> Vector2 {
        Vector2::new(self.width * self.origin.x, self.height * self.origin.y)
    }

    pub fn point_in_shape(&self, point: Vector2) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + self.width
            && point.y >= self.position.y
            && point.y <= self.position.y + self.height
    }
}

/// A 2D bounds shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape2D {
    Circle(Circle2D),
    Rectangle(Rectangle2D),
}

impl Shape2D {
    pub fn offset(&self) -> Vector2 {
        match self {
            Shape2D::Circle(c) => c.offset(),
            Shape2D::Rectangle(r) => r.offset(),
        }
    }

    pub fn point_in_shape(&self, point: Vector2) -> bool {
        match self {
            Shape2D::Circle(c) => c.point_in_shape(point),
            Shape2D::Rectangle(r) => r.point_in_shape(point),
        }
    }

    /// Whether this shape overlaps the other shape.
    pub fn intersects(&self, other: &Shape2D) -> bool {
        match (self, other) {
            (Shape2D::Circle(a), Shape2D::Circle(b)) => {
                a.position.distance(b.position) <= a.radius + b.radius
            }
            (Shape2D::Circle(circle), Shape2D::Rectangle(rect))
            | (Shape2D::Rectangle(rect), Shape2D::Circle(circle)) => {
                let delta_x = circle.position.x
                    - circle
                        .position
                        .x
                        .clamp(rect.position.x, rect.position.x + rect.width);
                let delta_y = circle.position.y
                    - circle
                        .position
                        .y
                        .clamp(rect.position.y, rect.position.y + rect.height);
                delta_x * delta_x + delta_y * delta_y < circle.radius * circle.radius
            }
            (Shape2D::Rectangle(a), Shape2D::Rectangle(b)) => {
                a.position.x < b.position.x + b.width
                    && a.position.x + a.width > b.position.x
                    && a.position.y < b.position.y + b.height
                    && a.position.y + a.height > b.position.y
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn circle_without_radius_is_a_configuration_error() {
        let result = Circle2D::from_json(&json!({ "position": [1.0, 2.0] }));
        assert!(matches!(result, Err(EngineError::Configuration(_))));
    }

    #[test]
    fn circle_from_json_defaults_position_and_origin() {
        let circle = Circle2D::from_json(&json!({ "radius": 4.0 })).unwrap();
        assert_eq!(circle.radius, 4.0);
        assert_eq!(circle.position, Vector2::new(0.0, 0.0));
    }

    #[test]
    fn rectangle_requires_both_dimensions() {
        assert!(Rectangle2D::from_json(&json!({ "width": 3.0 })).is_err());
        let rect = Rectangle2D::from_json(&json!({ "width": 3.0, "height": 2.0 })).unwrap();
        assert_eq!(rect.width, 3.0);
        assert_eq!(rect.height, 2.0);
    }

    #[test]
    fn overlapping_circles_intersect() {
        let a = Shape2D::Circle(Circle2D::new(Vector2::new(0.0, 0.0), 2.0));
        let b = Shape2D::Circle(Circle2D::new(Vector2::new(3.0, 0.0), 2.0));
        let c = Shape2D::Circle(Circle2D::new(Vector2::new(10.0, 0.0), 2.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn circle_rectangle_intersection_is_symmetric() {
        let circle = Shape2D::Circle(Circle2D::new(Vector2::new(5.0, 1.0), 2.0));
        let rect = Shape2D::Rectangle(Rectangle2D::new(Vector2::new(0.0, 0.0), 4.0, 4.0));
        assert!(circle.intersects(&rect));
        assert!(rect.intersects(&circle));
    }

    #[test]
    fn point_containment() {
        let rect = Shape2D::Rectangle(Rectangle2D::new(Vector2::new(1.0, 1.0), 2.0, 2.0));
        assert!(rect.point_in_shape(Vector2::new(2.0, 2.0)));
        assert!(!rect.point_in_shape(Vector2::new(4.0, 4.0)));

        let circle = Shape2D::Circle(Circle2D::new(Vector2::new(0.0, 0.0), 1.0));
        assert!(circle.point_in_shape(Vector2::new(0.5, 0.5)));
        assert!(!circle.point_in_shape(Vector2::new(1.5, 0.0)));
    }
}
