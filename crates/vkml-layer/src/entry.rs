//! Exported extension entry points.
//!
//! Each function checks the pointer contract it can check cheaply, resolves tensor handles, and
//! forwards to the installed emulators. Anything the emulators report comes back as the
//! `VkResult` the caller would have seen from a native implementation.

#![allow(non_snake_case)]

use std::slice;

use tracing::warn;
use vkml_abi::pfn::PfnGetDeviceProcAddr;
use vkml_abi::{
    AllocationCallbacks, BindTensorMemoryInfoArm, DataGraphPipelineCreateInfoArm, Device,
    MemoryRequirements2, Pipeline, PipelineCache, StructureType, TensorArm, TensorCreateInfoArm,
    TensorMemoryRequirementsInfoArm, TensorPropertiesArm, VkResult,
};
use vkml_emu::{GraphPipelineRequest, TensorDesc};

use crate::driver_table::DriverTable;
use crate::handle;
use crate::state::{self, InstallError, LayerState};

fn installed_layer() -> Result<&'static LayerState, VkResult> {
    state::layer().ok_or_else(|| {
        warn!("extension entry point called before a driver table was installed");
        VkResult::ERROR_INITIALIZATION_FAILED
    })
}

/// # Safety
///
/// `ptr` must be null or point to `count` readable elements that outlive `'a`.
unsafe fn array<'a, T>(ptr: *const T, count: u32) -> Option<&'a [T]> {
    match (ptr.is_null(), count) {
        (_, 0) => Some(&[]),
        (true, _) => None,
        // SAFETY: guaranteed by the caller.
        (false, count) => Some(unsafe { slice::from_raw_parts(ptr, count as usize) }),
    }
}

fn install_result(result: Result<(), InstallError>) -> VkResult {
    match result {
        Ok(()) => VkResult::SUCCESS,
        Err(err) => {
            warn!(%err, "driver table installation refused");
            VkResult::ERROR_INITIALIZATION_FAILED
        }
    }
}

/// Install a caller-assembled driver table.
///
/// # Safety
///
/// `p_table` must be null or point to a [`DriverTable`] whose entry points stay valid for the
/// rest of the process.
#[no_mangle]
pub unsafe extern "system" fn vkml_install_driver_table(p_table: *const DriverTable) -> VkResult {
    // SAFETY: guaranteed by the caller.
    let Some(table) = (unsafe { p_table.as_ref() }) else {
        return VkResult::ERROR_VALIDATION_FAILED_EXT;
    };
    install_result(state::install_driver(*table))
}

/// Resolve and install the driver table through `vkGetDeviceProcAddr`.
///
/// # Safety
///
/// Same as [`DriverTable::load`]; the resolved entry points must stay valid for the rest of the
/// process.
#[no_mangle]
pub unsafe extern "system" fn vkml_install_driver_from_proc_addr(
    device: Device,
    get_device_proc_addr: Option<PfnGetDeviceProcAddr>,
) -> VkResult {
    let Some(get_device_proc_addr) = get_device_proc_addr else {
        return VkResult::ERROR_VALIDATION_FAILED_EXT;
    };
    // SAFETY: guaranteed by the caller.
    match unsafe { DriverTable::load(device, get_device_proc_addr) } {
        Ok(table) => install_result(state::install_driver(table)),
        Err(err) => {
            warn!(%err, "cannot load driver table");
            VkResult::ERROR_INITIALIZATION_FAILED
        }
    }
}

/// # Safety
///
/// Pointer arguments must be null or valid for the access the extension defines for them.
#[no_mangle]
pub unsafe extern "system" fn vkCreateTensorARM(
    device: Device,
    p_create_info: *const TensorCreateInfoArm,
    p_allocator: *const AllocationCallbacks,
    p_tensor: *mut TensorArm,
) -> VkResult {
    if p_tensor.is_null() {
        return VkResult::ERROR_VALIDATION_FAILED_EXT;
    }
    // SAFETY: checked non-null; validity is the caller's contract.
    unsafe { p_tensor.write(TensorArm::NULL) };

    // SAFETY: guaranteed by the caller.
    let Some(info) = (unsafe { p_create_info.as_ref() }) else {
        return VkResult::ERROR_VALIDATION_FAILED_EXT;
    };
    // SAFETY: guaranteed by the caller.
    let Some(dimensions) = (unsafe { array(info.p_dimensions, info.dimension_count) }) else {
        warn!(count = info.dimension_count, "tensor dimensions pointer is null");
        return VkResult::ERROR_VALIDATION_FAILED_EXT;
    };
    let layer = match installed_layer() {
        Ok(layer) => layer,
        Err(result) => return result,
    };

    let desc = TensorDesc::new(info.format, dimensions);
    // SAFETY: guaranteed by the caller.
    let allocator = unsafe { p_allocator.as_ref() };
    match layer.tensors.create(device, &desc, allocator) {
        Ok(tensor) => {
            // SAFETY: checked non-null above.
            unsafe { p_tensor.write(handle::register(tensor)) };
            VkResult::SUCCESS
        }
        Err(err) => err.to_vk_result(),
    }
}

/// # Safety
///
/// `tensor` must be null or a handle from [`vkCreateTensorARM`] that no other call is using.
#[no_mangle]
pub unsafe extern "system" fn vkDestroyTensorARM(
    device: Device,
    tensor: TensorArm,
    p_allocator: *const AllocationCallbacks,
) {
    let Ok(layer) = installed_layer() else {
        return;
    };
    // SAFETY: guaranteed by the caller.
    let Some(tensor) = (unsafe { handle::release(tensor) }) else {
        return;
    };
    // SAFETY: guaranteed by the caller.
    let allocator = unsafe { p_allocator.as_ref() };
    layer.tensors.destroy(device, tensor, allocator);
}

/// Fills `sType`, `format` and `dimensionCount`; `pNext` is left as the caller set it.
///
/// # Safety
///
/// `tensor` as for [`vkDestroyTensorARM`]; `p_properties` null or writable.
#[no_mangle]
pub unsafe extern "system" fn vkGetTensorPropertiesARM(
    _device: Device,
    tensor: TensorArm,
    p_properties: *mut TensorPropertiesArm,
) {
    // SAFETY: guaranteed by the caller.
    let Some(out) = (unsafe { p_properties.as_mut() }) else {
        return;
    };
    // SAFETY: guaranteed by the caller.
    let Some(tensor) = (unsafe { handle::resolve(tensor) }) else {
        return;
    };
    let properties = tensor.properties();
    out.s_type = StructureType::TENSOR_PROPERTIES_ARM;
    out.format = properties.format;
    out.dimension_count = properties.dimension_count;
}

/// Fills `sType` and `memoryRequirements`; `pNext` is left as the caller set it.
///
/// # Safety
///
/// `p_info` null or readable, naming a tensor as for [`vkDestroyTensorARM`];
/// `p_memory_requirements` null or writable.
#[no_mangle]
pub unsafe extern "system" fn vkGetTensorMemoryRequirementsARM(
    device: Device,
    p_info: *const TensorMemoryRequirementsInfoArm,
    p_memory_requirements: *mut MemoryRequirements2,
) {
    // SAFETY: guaranteed by the caller.
    let (Some(info), Some(out)) = (unsafe { (p_info.as_ref(), p_memory_requirements.as_mut()) })
    else {
        return;
    };
    let Ok(layer) = installed_layer() else {
        return;
    };
    // SAFETY: guaranteed by the caller.
    let Some(tensor) = (unsafe { handle::resolve(info.tensor) }) else {
        return;
    };
    out.s_type = StructureType::MEMORY_REQUIREMENTS_2;
    out.memory_requirements = layer.tensors.memory_requirements(device, tensor);
}

/// Bind caller-owned memory to each tensor in order, stopping at the first failure.
///
/// # Safety
///
/// `p_bind_infos` null or pointing to `bind_info_count` readable infos, each naming a tensor as
/// for [`vkDestroyTensorARM`].
#[no_mangle]
pub unsafe extern "system" fn vkBindTensorMemoryARM(
    device: Device,
    bind_info_count: u32,
    p_bind_infos: *const BindTensorMemoryInfoArm,
) -> VkResult {
    // SAFETY: guaranteed by the caller.
    let Some(infos) = (unsafe { array(p_bind_infos, bind_info_count) }) else {
        return VkResult::ERROR_VALIDATION_FAILED_EXT;
    };
    let layer = match installed_layer() {
        Ok(layer) => layer,
        Err(result) => return result,
    };

    for (index, info) in infos.iter().enumerate() {
        // SAFETY: guaranteed by the caller.
        let Some(tensor) = (unsafe { handle::resolve(info.tensor) }) else {
            warn!(index, tensor = info.tensor.as_raw(), "bind names an invalid tensor handle");
            return VkResult::ERROR_VALIDATION_FAILED_EXT;
        };
        if let Err(err) =
            layer
                .tensors
                .bind_external_memory(device, tensor, info.memory, info.memory_offset)
        {
            warn!(index, %err, "binding tensor memory failed");
            return err.to_vk_result();
        }
    }
    VkResult::SUCCESS
}

/// # Safety
///
/// `p_create_infos` and `p_pipelines` null or valid for `create_info_count` elements (read and
/// write respectively), with every `pStages` array readable.
#[no_mangle]
pub unsafe extern "system" fn vkCreateDataGraphPipelinesARM(
    device: Device,
    pipeline_cache: PipelineCache,
    create_info_count: u32,
    p_create_infos: *const DataGraphPipelineCreateInfoArm,
    p_allocator: *const AllocationCallbacks,
    p_pipelines: *mut Pipeline,
) -> VkResult {
    // SAFETY: guaranteed by the caller.
    let Some(infos) = (unsafe { array(p_create_infos, create_info_count) }) else {
        return VkResult::ERROR_VALIDATION_FAILED_EXT;
    };
    if create_info_count > 0 && p_pipelines.is_null() {
        return VkResult::ERROR_VALIDATION_FAILED_EXT;
    }
    if let Some(index) = infos
        .iter()
        .position(|info| info.stage_count > 0 && info.p_stages.is_null())
    {
        warn!(index, "graph pipeline stages pointer is null");
        return VkResult::ERROR_VALIDATION_FAILED_EXT;
    }
    let layer = match installed_layer() {
        Ok(layer) => layer,
        Err(result) => return result,
    };

    let requests: Vec<GraphPipelineRequest<'_>> = infos
        .iter()
        // SAFETY: stage arrays checked non-null above; readability is the caller's contract.
        .map(|info| unsafe { GraphPipelineRequest::from_raw(info) })
        .collect();
    let pipelines: &mut [Pipeline] = if create_info_count == 0 {
        &mut []
    } else {
        // SAFETY: checked non-null above; writability is the caller's contract.
        unsafe { slice::from_raw_parts_mut(p_pipelines, create_info_count as usize) }
    };
    // SAFETY: guaranteed by the caller.
    let allocator = unsafe { p_allocator.as_ref() };
    layer
        .graphs
        .create_graph_pipelines(device, pipeline_cache, &requests, allocator, pipelines)
}
