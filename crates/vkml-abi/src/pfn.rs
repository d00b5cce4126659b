//! Native driver entry point signatures (`PFN_vk*`).

use std::ffi::c_char;

use crate::handle::{Buffer, Device, DeviceMemory, Pipeline, PipelineCache};
use crate::result::VkResult;
use crate::vulkan::{
    AllocationCallbacks, BufferCreateInfo, ComputePipelineCreateInfo, MemoryAllocateInfo,
    MemoryRequirements,
};

pub type PfnVoidFunction = unsafe extern "system" fn();

pub type PfnGetDeviceProcAddr =
    unsafe extern "system" fn(device: Device, p_name: *const c_char) -> Option<PfnVoidFunction>;

pub type PfnCreateBuffer = unsafe extern "system" fn(
    device: Device,
    p_create_info: *const BufferCreateInfo,
    p_allocator: *const AllocationCallbacks,
    p_buffer: *mut Buffer,
) -> VkResult;

pub type PfnDestroyBuffer = unsafe extern "system" fn(
    device: Device,
    buffer: Buffer,
    p_allocator: *const AllocationCallbacks,
);

pub type PfnGetBufferMemoryRequirements = unsafe extern "system" fn(
    device: Device,
    buffer: Buffer,
    p_memory_requirements: *mut MemoryRequirements,
);

pub type PfnAllocateMemory = unsafe extern "system" fn(
    device: Device,
    p_allocate_info: *const MemoryAllocateInfo,
    p_allocator: *const AllocationCallbacks,
    p_memory: *mut DeviceMemory,
) -> VkResult;

pub type PfnFreeMemory = unsafe extern "system" fn(
    device: Device,
    memory: DeviceMemory,
    p_allocator: *const AllocationCallbacks,
);

pub type PfnBindBufferMemory = unsafe extern "system" fn(
    device: Device,
    buffer: Buffer,
    memory: DeviceMemory,
    memory_offset: u64,
) -> VkResult;

pub type PfnCreateComputePipelines = unsafe extern "system" fn(
    device: Device,
    pipeline_cache: PipelineCache,
    create_info_count: u32,
    p_create_infos: *const ComputePipelineCreateInfo,
    p_allocator: *const AllocationCallbacks,
    p_pipelines: *mut Pipeline,
) -> VkResult;
