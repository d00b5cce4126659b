//! Tensor and data-graph pipeline emulation on top of a plain buffer/compute driver.
//!
//! Two independent translators live here:
//! - [`tensor::TensorEmulator`] backs each tensor with one generic storage buffer plus the shape
//!   metadata the extension exposes.
//! - [`graph::GraphPipelineEmulator`] narrows each data-graph pipeline request to a single-stage
//!   compute pipeline. Only the first stage survives; see [`graph::narrow_to_compute`].
//!
//! Both talk to the host driver exclusively through [`driver::NativeDriver`]. The native-ABI
//! entry points live in `vkml-layer`; this crate is the safe core they forward to.

#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod graph;
pub mod recording;
pub mod tensor;

pub use config::{ElementSizePolicy, EmulationConfig};
pub use driver::NativeDriver;
pub use error::EmulationError;
pub use graph::{GraphPipelineEmulator, GraphPipelineRequest};
pub use tensor::{MemoryBinding, Tensor, TensorDesc, TensorEmulator, TensorProperties};
