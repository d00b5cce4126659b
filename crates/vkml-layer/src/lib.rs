//! Native-ABI shell for the tensor / data-graph emulation.
//!
//! Built as a `cdylib`, this exports the extension's entry points (`vkCreateTensorARM` and
//! friends) under their C names. Before any of them is called the host installs the driver the
//! emulation forwards to, either as a ready-made [`DriverTable`] or by handing over
//! `vkGetDeviceProcAddr`. Installation is write-once; after that the entry points are plain
//! synchronous calls with no locking of their own.
//!
//! Tensor handles are opaque to callers. Each one is checked for a live tag before it is used, so
//! null handles and handles this library never issued are turned away.

#![deny(unsafe_op_in_unsafe_fn)]

pub mod driver_table;
pub mod entry;
mod handle;
mod state;

pub use driver_table::{DriverTable, LoadError};
pub use state::{install_driver, install_driver_with_config, is_installed, InstallError};
