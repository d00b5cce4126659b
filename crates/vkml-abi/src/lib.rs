//! Native ABI for the ARM tensor / data-graph extension emulation.
//!
//! Everything in this crate is a `#[repr(C)]` (or `#[repr(transparent)]`) mirror of a type that
//! crosses the extension boundary. Callers compiled against the extension headers pass these
//! structures by pointer, so field order, sizes and padding must match the C declarations
//! exactly; `tests/abi_layout.rs` pins them on 64-bit targets.
//!
//! The crate is split into:
//! 1. **Handles and result codes** (`handle`, `result`): opaque driver objects and `VkResult`.
//! 2. **Core Vulkan mirrors** (`vulkan`): the subset of buffer/memory/pipeline structures the
//!    emulation forwards to the native driver.
//! 3. **Extension structures** (`arm`): tensor and data-graph pipeline create-infos.
//! 4. **Driver entry point signatures** (`pfn`).

pub mod arm;
pub mod handle;
pub mod pfn;
pub mod result;
pub mod vulkan;

pub use crate::arm::*;
pub use crate::handle::*;
pub use crate::result::VkResult;
pub use crate::vulkan::*;
