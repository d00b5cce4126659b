use thiserror::Error;
use vkml_abi::VkResult;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmulationError {
    /// The native driver rejected the underlying call.
    #[error("driver call failed: {0}")]
    Driver(VkResult),
    #[error("tensor size overflows u64 (dimensions {dimensions:?}, element size {element_size})")]
    SizeOverflow {
        dimensions: Vec<u32>,
        element_size: u32,
    },
    #[error("tensor memory is already bound")]
    MemoryAlreadyBound,
    #[error("{infos} graph pipeline create-infos but room for {pipelines} pipeline handles")]
    PipelineCountMismatch { infos: usize, pipelines: usize },
}

impl EmulationError {
    /// The result code a native-ABI caller sees for this error.
    ///
    /// Driver codes pass through unchanged.
    pub fn to_vk_result(&self) -> VkResult {
        match self {
            Self::Driver(result) => *result,
            Self::SizeOverflow { .. } => VkResult::ERROR_OUT_OF_DEVICE_MEMORY,
            Self::MemoryAlreadyBound | Self::PipelineCountMismatch { .. } => {
                VkResult::ERROR_VALIDATION_FAILED_EXT
            }
        }
    }
}

impl From<VkResult> for EmulationError {
    fn from(result: VkResult) -> Self {
        Self::Driver(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_codes_pass_through() {
        let odd = VkResult::from_raw(-77);
        assert_eq!(EmulationError::Driver(odd).to_vk_result(), odd);
        assert_eq!(
            EmulationError::from(VkResult::ERROR_DEVICE_LOST).to_vk_result(),
            VkResult::ERROR_DEVICE_LOST
        );
    }

    #[test]
    fn emulator_errors_never_map_to_success() {
        let errors = [
            EmulationError::SizeOverflow {
                dimensions: vec![u32::MAX; 3],
                element_size: 4,
            },
            EmulationError::MemoryAlreadyBound,
            EmulationError::PipelineCountMismatch {
                infos: 2,
                pipelines: 1,
            },
        ];
        for err in errors {
            assert!(err.to_vk_result().is_error(), "{err} mapped to success");
        }
    }
}
