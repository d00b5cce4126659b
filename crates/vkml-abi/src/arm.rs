//! Tensor and data-graph pipeline structures.
//!
//! These follow the declarations client code is compiled against when the platform headers
//! lack the extensions: dimensions are `uint32_t`, tensor usage is a 32-bit `VkFlags`, and a
//! data-graph pipeline is described by an ordered array of shader stages.

use std::ffi::c_void;
use std::ptr;

use bitflags::bitflags;

use crate::handle::{DeviceMemory, PipelineLayout, TensorArm};
use crate::vulkan::{Format, PipelineCreateFlags, PipelineShaderStageCreateInfo, StructureType};

bitflags! {
    /// `VkTensorUsageFlagsARM`.
    ///
    /// Recorded for completeness only: every backing buffer gets the same generic usage.
    #[repr(transparent)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TensorUsageFlagsArm: u32 {
        const SHADER = 1 << 1;
        const TRANSFER_SRC = 1 << 2;
        const TRANSFER_DST = 1 << 3;
        const IMAGE_ALIASING = 1 << 4;
        const DATA_GRAPH = 1 << 5;

        const _ = !0;
    }
}

/// `VkTensorCreateInfoARM`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct TensorCreateInfoArm {
    pub s_type: StructureType,
    pub p_next: *const c_void,
    pub usage: TensorUsageFlagsArm,
    pub format: Format,
    pub dimension_count: u32,
    pub p_dimensions: *const u32,
}

impl TensorCreateInfoArm {
    /// Borrow `dimensions` for the lifetime of the returned create-info.
    pub fn new(format: Format, dimensions: &[u32]) -> Self {
        Self {
            s_type: StructureType::TENSOR_CREATE_INFO_ARM,
            p_next: ptr::null(),
            usage: TensorUsageFlagsArm::SHADER
                | TensorUsageFlagsArm::TRANSFER_SRC
                | TensorUsageFlagsArm::TRANSFER_DST,
            format,
            dimension_count: dimensions.len() as u32,
            p_dimensions: if dimensions.is_empty() {
                ptr::null()
            } else {
                dimensions.as_ptr()
            },
        }
    }
}

/// `VkTensorPropertiesARM`: the answer to a tensor properties query.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct TensorPropertiesArm {
    pub s_type: StructureType,
    pub p_next: *mut c_void,
    pub format: Format,
    pub dimension_count: u32,
}

impl Default for TensorPropertiesArm {
    fn default() -> Self {
        Self {
            s_type: StructureType::TENSOR_PROPERTIES_ARM,
            p_next: ptr::null_mut(),
            format: Format::UNDEFINED,
            dimension_count: 0,
        }
    }
}

/// `VkTensorMemoryRequirementsInfoARM`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct TensorMemoryRequirementsInfoArm {
    pub s_type: StructureType,
    pub p_next: *const c_void,
    pub tensor: TensorArm,
}

impl TensorMemoryRequirementsInfoArm {
    pub fn new(tensor: TensorArm) -> Self {
        Self {
            s_type: StructureType::TENSOR_MEMORY_REQUIREMENTS_INFO_ARM,
            p_next: ptr::null(),
            tensor,
        }
    }
}

/// `VkBindTensorMemoryInfoARM`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct BindTensorMemoryInfoArm {
    pub s_type: StructureType,
    pub p_next: *const c_void,
    pub tensor: TensorArm,
    pub memory: DeviceMemory,
    pub memory_offset: u64,
}

impl BindTensorMemoryInfoArm {
    pub fn new(tensor: TensorArm, memory: DeviceMemory, memory_offset: u64) -> Self {
        Self {
            s_type: StructureType::BIND_TENSOR_MEMORY_INFO_ARM,
            p_next: ptr::null(),
            tensor,
            memory,
            memory_offset,
        }
    }
}

/// `VkDataGraphPipelineCreateInfoARM`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DataGraphPipelineCreateInfoArm {
    pub s_type: StructureType,
    pub p_next: *const c_void,
    pub flags: PipelineCreateFlags,
    pub layout: PipelineLayout,
    pub stage_count: u32,
    pub p_stages: *const PipelineShaderStageCreateInfo,
}

impl DataGraphPipelineCreateInfoArm {
    /// Borrow `stages` for the lifetime of the returned create-info.
    pub fn new(
        flags: PipelineCreateFlags,
        layout: PipelineLayout,
        stages: &[PipelineShaderStageCreateInfo],
    ) -> Self {
        Self {
            s_type: StructureType::DATA_GRAPH_PIPELINE_CREATE_INFO_ARM,
            p_next: ptr::null(),
            flags,
            layout,
            stage_count: stages.len() as u32,
            p_stages: if stages.is_empty() {
                ptr::null()
            } else {
                stages.as_ptr()
            },
        }
    }
}
