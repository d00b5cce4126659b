use std::sync::OnceLock;

use thiserror::Error;
use tracing::debug;
use vkml_emu::{EmulationConfig, GraphPipelineEmulator, TensorEmulator};

use crate::driver_table::DriverTable;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InstallError {
    #[error("a driver table is already installed")]
    AlreadyInstalled,
}

#[derive(Debug)]
pub(crate) struct LayerState {
    pub(crate) tensors: TensorEmulator<DriverTable>,
    pub(crate) graphs: GraphPipelineEmulator<DriverTable>,
}

static LAYER: OnceLock<LayerState> = OnceLock::new();

/// Install the driver the exported entry points forward to, configured from the environment.
///
/// The table can be installed once per process.
pub fn install_driver(table: DriverTable) -> Result<(), InstallError> {
    install_driver_with_config(table, EmulationConfig::from_env())
}

pub fn install_driver_with_config(
    table: DriverTable,
    config: EmulationConfig,
) -> Result<(), InstallError> {
    let mut installed = false;
    LAYER.get_or_init(|| {
        installed = true;
        LayerState {
            tensors: TensorEmulator::new(table, config),
            graphs: GraphPipelineEmulator::new(table),
        }
    });
    if !installed {
        return Err(InstallError::AlreadyInstalled);
    }
    debug!(?config, "tensor emulation driver installed");
    Ok(())
}

pub fn is_installed() -> bool {
    LAYER.get().is_some()
}

pub(crate) fn layer() -> Option<&'static LayerState> {
    LAYER.get()
}
