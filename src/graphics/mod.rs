//! Materials, colors, drawable components and 2D shapes.

pub mod color;
pub mod material;
pub mod shapes;
pub mod sprite;
pub mod texture;

pub use color::Color;
pub use material::{Material, MaterialManager, MaterialRef};
pub use shapes::{Circle2D, Rectangle2D, Shape2D};
pub use sprite::SpriteComponent;
pub use texture::Texture;
