//! The host driver, reached through a table of native entry points.

use std::ffi::CStr;
use std::ptr;

use thiserror::Error;
use vkml_abi::pfn::{
    PfnAllocateMemory, PfnBindBufferMemory, PfnCreateBuffer, PfnCreateComputePipelines,
    PfnDestroyBuffer, PfnFreeMemory, PfnGetBufferMemoryRequirements, PfnGetDeviceProcAddr,
    PfnVoidFunction,
};
use vkml_abi::{
    AllocationCallbacks, Buffer, BufferCreateInfo, ComputePipelineCreateInfo, Device,
    DeviceMemory, MemoryAllocateInfo, MemoryRequirements, Pipeline, PipelineCache, VkResult,
};
use vkml_emu::NativeDriver;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("driver does not expose {0:?}")]
    MissingEntryPoint(&'static CStr),
}

/// Native driver entry points used by the emulation.
///
/// Every pointer must be a valid entry point of the same driver for as long as the table is in
/// use; [`crate::install_driver`] takes the table on that promise.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DriverTable {
    pub create_buffer: PfnCreateBuffer,
    pub destroy_buffer: PfnDestroyBuffer,
    pub get_buffer_memory_requirements: PfnGetBufferMemoryRequirements,
    pub allocate_memory: PfnAllocateMemory,
    pub free_memory: PfnFreeMemory,
    pub bind_buffer_memory: PfnBindBufferMemory,
    pub create_compute_pipelines: PfnCreateComputePipelines,
}

impl DriverTable {
    /// Resolve every entry point through `vkGetDeviceProcAddr`.
    ///
    /// # Safety
    ///
    /// `get_device_proc_addr` must be the driver's lookup function and `device` a device it
    /// accepts. Each name it resolves must return a function of the matching signature.
    pub unsafe fn load(
        device: Device,
        get_device_proc_addr: PfnGetDeviceProcAddr,
    ) -> Result<Self, LoadError> {
        let lookup = |name: &'static CStr| -> Result<PfnVoidFunction, LoadError> {
            // SAFETY: guaranteed by the caller.
            unsafe { get_device_proc_addr(device, name.as_ptr()) }
                .ok_or(LoadError::MissingEntryPoint(name))
        };

        macro_rules! entry {
            ($name:literal, $pfn:ty) => {{
                let f = lookup($name)?;
                // SAFETY: the driver returns `$name` with its declared signature.
                unsafe { std::mem::transmute::<PfnVoidFunction, $pfn>(f) }
            }};
        }

        Ok(Self {
            create_buffer: entry!(c"vkCreateBuffer", PfnCreateBuffer),
            destroy_buffer: entry!(c"vkDestroyBuffer", PfnDestroyBuffer),
            get_buffer_memory_requirements: entry!(
                c"vkGetBufferMemoryRequirements",
                PfnGetBufferMemoryRequirements
            ),
            allocate_memory: entry!(c"vkAllocateMemory", PfnAllocateMemory),
            free_memory: entry!(c"vkFreeMemory", PfnFreeMemory),
            bind_buffer_memory: entry!(c"vkBindBufferMemory", PfnBindBufferMemory),
            create_compute_pipelines: entry!(c"vkCreateComputePipelines", PfnCreateComputePipelines),
        })
    }
}

fn allocator_ptr(allocator: Option<&AllocationCallbacks>) -> *const AllocationCallbacks {
    allocator.map_or(ptr::null(), |callbacks| callbacks as *const AllocationCallbacks)
}

// SAFETY (all calls below): the table's entry points are valid per its contract, and every
// pointer argument is derived from a live reference or slice for the duration of the call.
impl NativeDriver for DriverTable {
    fn create_buffer(
        &self,
        device: Device,
        info: &BufferCreateInfo,
        allocator: Option<&AllocationCallbacks>,
    ) -> Result<Buffer, VkResult> {
        let mut buffer = Buffer::NULL;
        unsafe { (self.create_buffer)(device, info, allocator_ptr(allocator), &mut buffer) }
            .result()?;
        Ok(buffer)
    }

    fn destroy_buffer(&self, device: Device, buffer: Buffer, allocator: Option<&AllocationCallbacks>) {
        unsafe { (self.destroy_buffer)(device, buffer, allocator_ptr(allocator)) }
    }

    fn buffer_memory_requirements(&self, device: Device, buffer: Buffer) -> MemoryRequirements {
        let mut requirements = MemoryRequirements::default();
        unsafe { (self.get_buffer_memory_requirements)(device, buffer, &mut requirements) };
        requirements
    }

    fn allocate_memory(
        &self,
        device: Device,
        info: &MemoryAllocateInfo,
        allocator: Option<&AllocationCallbacks>,
    ) -> Result<DeviceMemory, VkResult> {
        let mut memory = DeviceMemory::NULL;
        unsafe { (self.allocate_memory)(device, info, allocator_ptr(allocator), &mut memory) }
            .result()?;
        Ok(memory)
    }

    fn free_memory(
        &self,
        device: Device,
        memory: DeviceMemory,
        allocator: Option<&AllocationCallbacks>,
    ) {
        unsafe { (self.free_memory)(device, memory, allocator_ptr(allocator)) }
    }

    fn bind_buffer_memory(
        &self,
        device: Device,
        buffer: Buffer,
        memory: DeviceMemory,
        offset: u64,
    ) -> Result<(), VkResult> {
        unsafe { (self.bind_buffer_memory)(device, buffer, memory, offset) }.result()
    }

    fn create_compute_pipelines(
        &self,
        device: Device,
        cache: PipelineCache,
        infos: &[ComputePipelineCreateInfo],
        allocator: Option<&AllocationCallbacks>,
        pipelines: &mut [Pipeline],
    ) -> VkResult {
        if pipelines.len() != infos.len() {
            return VkResult::ERROR_VALIDATION_FAILED_EXT;
        }
        let Ok(count) = u32::try_from(infos.len()) else {
            return VkResult::ERROR_VALIDATION_FAILED_EXT;
        };
        unsafe {
            (self.create_compute_pipelines)(
                device,
                cache,
                count,
                infos.as_ptr(),
                allocator_ptr(allocator),
                pipelines.as_mut_ptr(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::c_char;

    use super::*;

    unsafe extern "system" fn create_buffer(
        _device: Device,
        info: *const BufferCreateInfo,
        _allocator: *const AllocationCallbacks,
        out: *mut Buffer,
    ) -> VkResult {
        let size = unsafe { (*info).size };
        if size == 0 {
            return VkResult::ERROR_VALIDATION_FAILED_EXT;
        }
        unsafe { *out = Buffer::from_raw(size) };
        VkResult::SUCCESS
    }

    unsafe extern "system" fn destroy_buffer(_: Device, _: Buffer, _: *const AllocationCallbacks) {}

    unsafe extern "system" fn get_buffer_memory_requirements(
        _device: Device,
        buffer: Buffer,
        out: *mut MemoryRequirements,
    ) {
        unsafe {
            *out = MemoryRequirements {
                size: buffer.as_raw() * 2,
                alignment: 64,
                memory_type_bits: 1,
            }
        };
    }

    unsafe extern "system" fn allocate_memory(
        _: Device,
        _: *const MemoryAllocateInfo,
        _: *const AllocationCallbacks,
        _: *mut DeviceMemory,
    ) -> VkResult {
        VkResult::ERROR_OUT_OF_DEVICE_MEMORY
    }

    unsafe extern "system" fn free_memory(_: Device, _: DeviceMemory, _: *const AllocationCallbacks) {}

    unsafe extern "system" fn bind_buffer_memory(
        _: Device,
        _: Buffer,
        _: DeviceMemory,
        offset: u64,
    ) -> VkResult {
        if offset % 64 == 0 {
            VkResult::SUCCESS
        } else {
            VkResult::ERROR_VALIDATION_FAILED_EXT
        }
    }

    unsafe extern "system" fn create_compute_pipelines(
        _: Device,
        _: PipelineCache,
        count: u32,
        _: *const ComputePipelineCreateInfo,
        _: *const AllocationCallbacks,
        out: *mut Pipeline,
    ) -> VkResult {
        for i in 0..count as usize {
            unsafe { *out.add(i) = Pipeline::from_raw(100 + i as u64) };
        }
        VkResult::SUCCESS
    }

    unsafe extern "system" fn get_device_proc_addr(
        _device: Device,
        name: *const c_char,
    ) -> Option<PfnVoidFunction> {
        let name = unsafe { CStr::from_ptr(name) };
        let f: PfnVoidFunction = unsafe {
            match name.to_bytes() {
                b"vkCreateBuffer" => std::mem::transmute::<PfnCreateBuffer, _>(create_buffer),
                b"vkDestroyBuffer" => std::mem::transmute::<PfnDestroyBuffer, _>(destroy_buffer),
                b"vkGetBufferMemoryRequirements" => std::mem::transmute::<
                    PfnGetBufferMemoryRequirements,
                    _,
                >(get_buffer_memory_requirements),
                b"vkAllocateMemory" => std::mem::transmute::<PfnAllocateMemory, _>(allocate_memory),
                b"vkFreeMemory" => std::mem::transmute::<PfnFreeMemory, _>(free_memory),
                b"vkBindBufferMemory" => {
                    std::mem::transmute::<PfnBindBufferMemory, _>(bind_buffer_memory)
                }
                b"vkCreateComputePipelines" => {
                    std::mem::transmute::<PfnCreateComputePipelines, _>(create_compute_pipelines)
                }
                _ => return None,
            }
        };
        Some(f)
    }

    unsafe extern "system" fn get_device_proc_addr_without_compute(
        device: Device,
        name: *const c_char,
    ) -> Option<PfnVoidFunction> {
        let requested = unsafe { CStr::from_ptr(name) };
        if requested == c"vkCreateComputePipelines" {
            return None;
        }
        unsafe { get_device_proc_addr(device, name) }
    }

    fn table() -> DriverTable {
        unsafe { DriverTable::load(Device::from_raw(1), get_device_proc_addr) }.unwrap()
    }

    #[test]
    fn load_resolves_every_entry_point() {
        let driver = table();
        let device = Device::from_raw(1);

        let info = BufferCreateInfo {
            size: 48,
            ..BufferCreateInfo::default()
        };
        let buffer = driver.create_buffer(device, &info, None).unwrap();
        assert_eq!(buffer, Buffer::from_raw(48));
        assert_eq!(driver.buffer_memory_requirements(device, buffer).size, 96);
        assert_eq!(
            driver.allocate_memory(device, &MemoryAllocateInfo::default(), None),
            Err(VkResult::ERROR_OUT_OF_DEVICE_MEMORY)
        );
        assert_eq!(
            driver.bind_buffer_memory(device, buffer, DeviceMemory::from_raw(5), 3),
            Err(VkResult::ERROR_VALIDATION_FAILED_EXT)
        );

        let infos = [ComputePipelineCreateInfo::default(); 2];
        let mut pipelines = [Pipeline::NULL; 2];
        let result =
            driver.create_compute_pipelines(device, PipelineCache::NULL, &infos, None, &mut pipelines);
        assert_eq!(result, VkResult::SUCCESS);
        assert_eq!(pipelines, [Pipeline::from_raw(100), Pipeline::from_raw(101)]);
    }

    #[test]
    fn pipeline_batch_with_short_output_is_rejected_before_the_driver() {
        let infos = [ComputePipelineCreateInfo::default(); 2];
        let mut backing = [Pipeline::NULL; 2];
        let result = table().create_compute_pipelines(
            Device::from_raw(1),
            PipelineCache::NULL,
            &infos,
            None,
            &mut backing[..1],
        );
        assert_eq!(result, VkResult::ERROR_VALIDATION_FAILED_EXT);
        assert_eq!(backing, [Pipeline::NULL; 2]);

        let mut spare = [Pipeline::NULL; 3];
        let result =
            table().create_compute_pipelines(Device::from_raw(1), PipelineCache::NULL, &infos, None, &mut spare);
        assert_eq!(result, VkResult::ERROR_VALIDATION_FAILED_EXT);
        assert_eq!(spare, [Pipeline::NULL; 3]);
    }

    #[test]
    fn driver_failures_surface_as_err() {
        let info = BufferCreateInfo::default();
        assert_eq!(
            table().create_buffer(Device::from_raw(1), &info, None),
            Err(VkResult::ERROR_VALIDATION_FAILED_EXT)
        );
    }

    #[test]
    fn load_reports_the_missing_entry_point() {
        let err = unsafe {
            DriverTable::load(Device::from_raw(1), get_device_proc_addr_without_compute)
        }
        .unwrap_err();
        assert_eq!(err, LoadError::MissingEntryPoint(c"vkCreateComputePipelines"));
        assert!(err.to_string().contains("vkCreateComputePipelines"));
    }
}
