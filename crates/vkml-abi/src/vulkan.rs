//! Core Vulkan structures the emulation forwards to the native driver.
//!
//! Only the members the emulation reads or writes are given meaningful types; extension chains
//! (`p_next`) and allocator callbacks stay opaque pointers.

use std::ffi::{c_char, c_void};
use std::marker::{PhantomData, PhantomPinned};
use std::ptr;

use bitflags::bitflags;

use crate::handle::{Pipeline, PipelineLayout, ShaderModule};

/// `VkStructureType`.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StructureType(i32);

impl StructureType {
    pub const APPLICATION_INFO: Self = Self(0);
    pub const MEMORY_ALLOCATE_INFO: Self = Self(5);
    pub const BUFFER_CREATE_INFO: Self = Self(12);
    pub const PIPELINE_SHADER_STAGE_CREATE_INFO: Self = Self(18);
    pub const COMPUTE_PIPELINE_CREATE_INFO: Self = Self(29);
    pub const MEMORY_REQUIREMENTS_2: Self = Self(1_000_146_003);

    // VK_ARM_tensors (extension 461).
    pub const TENSOR_CREATE_INFO_ARM: Self = Self(1_000_460_000);
    pub const BIND_TENSOR_MEMORY_INFO_ARM: Self = Self(1_000_460_002);
    pub const TENSOR_MEMORY_REQUIREMENTS_INFO_ARM: Self = Self(1_000_460_007);
    /// Written into the properties query this layer exposes; outside the registered range.
    pub const TENSOR_PROPERTIES_ARM: Self = Self(1_000_460_900);

    // VK_ARM_data_graph (extension 508).
    pub const DATA_GRAPH_PIPELINE_CREATE_INFO_ARM: Self = Self(1_000_507_000);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> i32 {
        self.0
    }
}

/// `VkFormat`.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Format(i32);

impl Format {
    pub const UNDEFINED: Self = Self(0);
    pub const R8_UNORM: Self = Self(9);
    pub const R8_SNORM: Self = Self(10);
    pub const R8_UINT: Self = Self(13);
    pub const R8_SINT: Self = Self(14);
    pub const R8G8B8A8_UNORM: Self = Self(37);
    pub const R16_UNORM: Self = Self(70);
    pub const R16_SNORM: Self = Self(71);
    pub const R16_UINT: Self = Self(74);
    pub const R16_SINT: Self = Self(75);
    pub const R16_SFLOAT: Self = Self(76);
    pub const R32_UINT: Self = Self(98);
    pub const R32_SINT: Self = Self(99);
    pub const R32_SFLOAT: Self = Self(100);
    pub const R64_UINT: Self = Self(110);
    pub const R64_SINT: Self = Self(111);
    pub const R64_SFLOAT: Self = Self(112);
    pub const R8_BOOL_ARM: Self = Self(1_000_460_000);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> i32 {
        self.0
    }
}

/// `VkSharingMode`.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SharingMode(i32);

impl SharingMode {
    pub const EXCLUSIVE: Self = Self(0);
    pub const CONCURRENT: Self = Self(1);

    pub const fn as_raw(self) -> i32 {
        self.0
    }
}

bitflags! {
    /// `VkBufferUsageFlags`.
    #[repr(transparent)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BufferUsageFlags: u32 {
        const TRANSFER_SRC = 1 << 0;
        const TRANSFER_DST = 1 << 1;
        const UNIFORM_TEXEL_BUFFER = 1 << 2;
        const STORAGE_TEXEL_BUFFER = 1 << 3;
        const UNIFORM_BUFFER = 1 << 4;
        const STORAGE_BUFFER = 1 << 5;
        const INDEX_BUFFER = 1 << 6;
        const VERTEX_BUFFER = 1 << 7;
        const INDIRECT_BUFFER = 1 << 8;
    }
}

bitflags! {
    /// `VkShaderStageFlagBits` (only the compute bit matters here).
    #[repr(transparent)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 4;
        const COMPUTE = 1 << 5;
    }
}

bitflags! {
    /// `VkPipelineCreateFlags`.
    #[repr(transparent)]
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PipelineCreateFlags: u32 {
        const DISABLE_OPTIMIZATION = 1 << 0;
        const ALLOW_DERIVATIVES = 1 << 1;
        const DERIVATIVE = 1 << 2;
        const DISPATCH_BASE = 1 << 4;
        const FAIL_ON_PIPELINE_COMPILE_REQUIRED = 1 << 8;
        const EARLY_RETURN_ON_FAILURE = 1 << 9;

        // Vendor and future bits pass through untouched.
        const _ = !0;
    }
}

/// `VkAllocationCallbacks`, passed through to the driver by pointer and never inspected.
#[repr(C)]
pub struct AllocationCallbacks {
    _opaque: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// `VkSpecializationInfo`, carried inside shader stages and never inspected.
#[repr(C)]
pub struct SpecializationInfo {
    _opaque: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

/// `VkBufferCreateInfo`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct BufferCreateInfo {
    pub s_type: StructureType,
    pub p_next: *const c_void,
    pub flags: u32,
    pub size: u64,
    pub usage: BufferUsageFlags,
    pub sharing_mode: SharingMode,
    pub queue_family_index_count: u32,
    pub p_queue_family_indices: *const u32,
}

impl Default for BufferCreateInfo {
    fn default() -> Self {
        Self {
            s_type: StructureType::BUFFER_CREATE_INFO,
            p_next: ptr::null(),
            flags: 0,
            size: 0,
            usage: BufferUsageFlags::empty(),
            sharing_mode: SharingMode::EXCLUSIVE,
            queue_family_index_count: 0,
            p_queue_family_indices: ptr::null(),
        }
    }
}

/// `VkMemoryAllocateInfo`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct MemoryAllocateInfo {
    pub s_type: StructureType,
    pub p_next: *const c_void,
    pub allocation_size: u64,
    pub memory_type_index: u32,
}

impl Default for MemoryAllocateInfo {
    fn default() -> Self {
        Self {
            s_type: StructureType::MEMORY_ALLOCATE_INFO,
            p_next: ptr::null(),
            allocation_size: 0,
            memory_type_index: 0,
        }
    }
}

/// `VkMemoryRequirements`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryRequirements {
    pub size: u64,
    pub alignment: u64,
    pub memory_type_bits: u32,
}

/// `VkMemoryRequirements2`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct MemoryRequirements2 {
    pub s_type: StructureType,
    pub p_next: *mut c_void,
    pub memory_requirements: MemoryRequirements,
}

impl Default for MemoryRequirements2 {
    fn default() -> Self {
        Self {
            s_type: StructureType::MEMORY_REQUIREMENTS_2,
            p_next: ptr::null_mut(),
            memory_requirements: MemoryRequirements::default(),
        }
    }
}

/// `VkPipelineShaderStageCreateInfo`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineShaderStageCreateInfo {
    pub s_type: StructureType,
    pub p_next: *const c_void,
    pub flags: u32,
    pub stage: ShaderStageFlags,
    pub module: ShaderModule,
    pub p_name: *const c_char,
    pub p_specialization_info: *const SpecializationInfo,
}

impl PipelineShaderStageCreateInfo {
    /// The all-zero stage a compute create-info carries when no stage was supplied.
    ///
    /// Drivers reject it (no module, no entry point); that rejection is the intended signal.
    pub const UNSET: Self = Self {
        s_type: StructureType::APPLICATION_INFO,
        p_next: ptr::null(),
        flags: 0,
        stage: ShaderStageFlags::empty(),
        module: ShaderModule::NULL,
        p_name: ptr::null(),
        p_specialization_info: ptr::null(),
    };

    pub fn compute(module: ShaderModule, entry_point: &'static std::ffi::CStr) -> Self {
        Self {
            s_type: StructureType::PIPELINE_SHADER_STAGE_CREATE_INFO,
            stage: ShaderStageFlags::COMPUTE,
            module,
            p_name: entry_point.as_ptr(),
            ..Self::UNSET
        }
    }

    pub fn is_unset(&self) -> bool {
        *self == Self::UNSET
    }
}

impl Default for PipelineShaderStageCreateInfo {
    fn default() -> Self {
        Self::UNSET
    }
}

/// `VkComputePipelineCreateInfo`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComputePipelineCreateInfo {
    pub s_type: StructureType,
    pub p_next: *const c_void,
    pub flags: PipelineCreateFlags,
    pub stage: PipelineShaderStageCreateInfo,
    pub layout: PipelineLayout,
    pub base_pipeline_handle: Pipeline,
    pub base_pipeline_index: i32,
}

impl Default for ComputePipelineCreateInfo {
    fn default() -> Self {
        Self {
            s_type: StructureType::COMPUTE_PIPELINE_CREATE_INFO,
            p_next: ptr::null(),
            flags: PipelineCreateFlags::empty(),
            stage: PipelineShaderStageCreateInfo::UNSET,
            layout: PipelineLayout::NULL,
            base_pipeline_handle: Pipeline::NULL,
            base_pipeline_index: 0,
        }
    }
}
