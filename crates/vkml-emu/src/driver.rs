//! The host driver capability surface.

use vkml_abi::{
    AllocationCallbacks, Buffer, BufferCreateInfo, ComputePipelineCreateInfo, Device,
    DeviceMemory, MemoryAllocateInfo, MemoryRequirements, Pipeline, PipelineCache, VkResult,
};

/// The subset of the native driver the emulation needs: generic buffers, device memory and
/// batched compute pipeline creation.
///
/// Implementations forward to the real driver (`vkml-layer`'s function-table driver) or record
/// calls for tests ([`crate::recording::RecordingDriver`]). Every method maps to exactly one
/// driver call; the emulation relies on that for its call accounting.
pub trait NativeDriver {
    fn create_buffer(
        &self,
        device: Device,
        info: &BufferCreateInfo,
        allocator: Option<&AllocationCallbacks>,
    ) -> Result<Buffer, VkResult>;

    fn destroy_buffer(&self, device: Device, buffer: Buffer, allocator: Option<&AllocationCallbacks>);

    fn buffer_memory_requirements(&self, device: Device, buffer: Buffer) -> MemoryRequirements;

    fn allocate_memory(
        &self,
        device: Device,
        info: &MemoryAllocateInfo,
        allocator: Option<&AllocationCallbacks>,
    ) -> Result<DeviceMemory, VkResult>;

    fn free_memory(
        &self,
        device: Device,
        memory: DeviceMemory,
        allocator: Option<&AllocationCallbacks>,
    );

    fn bind_buffer_memory(
        &self,
        device: Device,
        buffer: Buffer,
        memory: DeviceMemory,
        offset: u64,
    ) -> Result<(), VkResult>;

    /// Create `infos.len()` pipelines in one call, writing handles into `pipelines`.
    ///
    /// Callers pass `pipelines.len() == infos.len()`; implementations return
    /// `VK_ERROR_VALIDATION_FAILED_EXT` without calling the driver otherwise. The raw result is
    /// returned as-is: partial success codes and whatever the driver wrote into `pipelines` are
    /// the caller's to interpret.
    fn create_compute_pipelines(
        &self,
        device: Device,
        cache: PipelineCache,
        infos: &[ComputePipelineCreateInfo],
        allocator: Option<&AllocationCallbacks>,
        pipelines: &mut [Pipeline],
    ) -> VkResult;
}

impl<T: NativeDriver + ?Sized> NativeDriver for &T {
    fn create_buffer(
        &self,
        device: Device,
        info: &BufferCreateInfo,
        allocator: Option<&AllocationCallbacks>,
    ) -> Result<Buffer, VkResult> {
        (**self).create_buffer(device, info, allocator)
    }

    fn destroy_buffer(&self, device: Device, buffer: Buffer, allocator: Option<&AllocationCallbacks>) {
        (**self).destroy_buffer(device, buffer, allocator)
    }

    fn buffer_memory_requirements(&self, device: Device, buffer: Buffer) -> MemoryRequirements {
        (**self).buffer_memory_requirements(device, buffer)
    }

    fn allocate_memory(
        &self,
        device: Device,
        info: &MemoryAllocateInfo,
        allocator: Option<&AllocationCallbacks>,
    ) -> Result<DeviceMemory, VkResult> {
        (**self).allocate_memory(device, info, allocator)
    }

    fn free_memory(
        &self,
        device: Device,
        memory: DeviceMemory,
        allocator: Option<&AllocationCallbacks>,
    ) {
        (**self).free_memory(device, memory, allocator)
    }

    fn bind_buffer_memory(
        &self,
        device: Device,
        buffer: Buffer,
        memory: DeviceMemory,
        offset: u64,
    ) -> Result<(), VkResult> {
        (**self).bind_buffer_memory(device, buffer, memory, offset)
    }

    fn create_compute_pipelines(
        &self,
        device: Device,
        cache: PipelineCache,
        infos: &[ComputePipelineCreateInfo],
        allocator: Option<&AllocationCallbacks>,
        pipelines: &mut [Pipeline],
    ) -> VkResult {
        (**self).create_compute_pipelines(device, cache, infos, allocator, pipelines)
    }
}
