//! GPU resource layer: buffers and shaders.
//!
//! Everything here threads an explicit device/queue through its calls rather
//! than relying on ambient context, so the resources stay testable and the
//! backend swappable. CPU-side bookkeeping (byte stores, attribute tables,
//! name maps) is fully observable without a device.

pub mod buffer;
pub mod shader;

pub use buffer::{AttributeInfo, BufferTarget, DataType, GpuBuffer};
pub use shader::{ResourceSlot, Shader};
