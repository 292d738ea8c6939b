use euclid::default::{Box2D, Point2D, Size2D, Transform2D, Translation2D, Vector2D};

pub type Point = Point2D<f64>;
pub type Rect = Box2D<f64>;
pub type Size = Size2D<f64>;
pub type IntSize = Size2D<u32>;
pub type Transform = Transform2D<f64>;
pub type Translation = Translation2D<f64>;
pub type Vector = Vector2D<f64>;
pub type Angle = euclid::Angle<f64>;
