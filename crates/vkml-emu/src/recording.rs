//! Deterministic in-process driver for tests.
//!
//! [`RecordingDriver`] hands out sequential handles, records every call in order, tracks which
//! buffers and allocations are still alive, and can be told to fail a given call once. It
//! behaves like a validating driver in one respect: compute pipelines whose stage is unset are
//! rejected.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use vkml_abi::{
    AllocationCallbacks, Buffer, BufferCreateInfo, BufferUsageFlags, ComputePipelineCreateInfo,
    Device, DeviceMemory, MemoryAllocateInfo, MemoryRequirements, Pipeline, PipelineCache,
    SharingMode, VkResult,
};

use crate::driver::NativeDriver;

/// Alignment reported by [`RecordingDriver::buffer_memory_requirements`].
pub const BUFFER_ALIGNMENT: u64 = 256;
/// Memory type bits reported by [`RecordingDriver::buffer_memory_requirements`].
pub const MEMORY_TYPE_BITS: u32 = 0b1011;

const FIRST_HANDLE: u64 = 0x1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriverOp {
    CreateBuffer,
    DestroyBuffer,
    BufferMemoryRequirements,
    AllocateMemory,
    FreeMemory,
    BindBufferMemory,
    CreateComputePipelines,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverCall {
    CreateBuffer {
        device: Device,
        size: u64,
        usage: BufferUsageFlags,
        sharing_mode: SharingMode,
    },
    DestroyBuffer {
        device: Device,
        buffer: Buffer,
    },
    BufferMemoryRequirements {
        buffer: Buffer,
    },
    AllocateMemory {
        size: u64,
        memory_type_index: u32,
    },
    FreeMemory {
        memory: DeviceMemory,
    },
    BindBufferMemory {
        buffer: Buffer,
        memory: DeviceMemory,
        offset: u64,
    },
    CreateComputePipelines {
        device: Device,
        cache: PipelineCache,
        infos: Vec<ComputePipelineCreateInfo>,
    },
}

impl DriverCall {
    pub fn op(&self) -> DriverOp {
        match self {
            Self::CreateBuffer { .. } => DriverOp::CreateBuffer,
            Self::DestroyBuffer { .. } => DriverOp::DestroyBuffer,
            Self::BufferMemoryRequirements { .. } => DriverOp::BufferMemoryRequirements,
            Self::AllocateMemory { .. } => DriverOp::AllocateMemory,
            Self::FreeMemory { .. } => DriverOp::FreeMemory,
            Self::BindBufferMemory { .. } => DriverOp::BindBufferMemory,
            Self::CreateComputePipelines { .. } => DriverOp::CreateComputePipelines,
        }
    }
}

#[derive(Debug)]
struct State {
    calls: Vec<DriverCall>,
    next_handle: u64,
    buffers: BTreeMap<Buffer, u64>,
    memory: BTreeSet<DeviceMemory>,
    failures: HashMap<DriverOp, VkResult>,
    unset_stage_result: VkResult,
}

#[derive(Debug)]
pub struct RecordingDriver {
    state: RefCell<State>,
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State {
                calls: Vec::new(),
                next_handle: FIRST_HANDLE,
                buffers: BTreeMap::new(),
                memory: BTreeSet::new(),
                failures: HashMap::new(),
                unset_stage_result: VkResult::ERROR_INVALID_SHADER_NV,
            }),
        }
    }

    /// Make the next call of kind `op` fail with `result`.
    pub fn fail_next(&self, op: DriverOp, result: VkResult) {
        self.state.borrow_mut().failures.insert(op, result);
    }

    /// Result returned for a pipeline batch containing an unset stage.
    pub fn set_unset_stage_result(&self, result: VkResult) {
        self.state.borrow_mut().unset_stage_result = result;
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, op: DriverOp) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| call.op() == op)
            .count()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_allocations(&self) -> usize {
        self.state.borrow().memory.len()
    }

    /// Size a live buffer was created with.
    pub fn buffer_size(&self, buffer: Buffer) -> Option<u64> {
        self.state.borrow().buffers.get(&buffer).copied()
    }

    /// Every pipeline batch submitted so far, in order.
    pub fn pipeline_batches(&self) -> Vec<Vec<ComputePipelineCreateInfo>> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                DriverCall::CreateComputePipelines { infos, .. } => Some(infos.clone()),
                _ => None,
            })
            .collect()
    }
}

impl State {
    fn record(&mut self, call: DriverCall) -> Option<VkResult> {
        let op = call.op();
        self.calls.push(call);
        self.failures.remove(&op)
    }

    fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }
}

impl NativeDriver for RecordingDriver {
    fn create_buffer(
        &self,
        device: Device,
        info: &BufferCreateInfo,
        _allocator: Option<&AllocationCallbacks>,
    ) -> Result<Buffer, VkResult> {
        let mut state = self.state.borrow_mut();
        if let Some(result) = state.record(DriverCall::CreateBuffer {
            device,
            size: info.size,
            usage: info.usage,
            sharing_mode: info.sharing_mode,
        }) {
            return Err(result);
        }
        let buffer = Buffer::from_raw(state.next_handle());
        state.buffers.insert(buffer, info.size);
        Ok(buffer)
    }

    fn destroy_buffer(&self, device: Device, buffer: Buffer, _allocator: Option<&AllocationCallbacks>) {
        let mut state = self.state.borrow_mut();
        state.record(DriverCall::DestroyBuffer { device, buffer });
        state.buffers.remove(&buffer);
    }

    fn buffer_memory_requirements(&self, _device: Device, buffer: Buffer) -> MemoryRequirements {
        let mut state = self.state.borrow_mut();
        state.record(DriverCall::BufferMemoryRequirements { buffer });
        let size = state.buffers.get(&buffer).copied().unwrap_or(0);
        MemoryRequirements {
            size: size.div_ceil(BUFFER_ALIGNMENT) * BUFFER_ALIGNMENT,
            alignment: BUFFER_ALIGNMENT,
            memory_type_bits: MEMORY_TYPE_BITS,
        }
    }

    fn allocate_memory(
        &self,
        _device: Device,
        info: &MemoryAllocateInfo,
        _allocator: Option<&AllocationCallbacks>,
    ) -> Result<DeviceMemory, VkResult> {
        let mut state = self.state.borrow_mut();
        if let Some(result) = state.record(DriverCall::AllocateMemory {
            size: info.allocation_size,
            memory_type_index: info.memory_type_index,
        }) {
            return Err(result);
        }
        let memory = DeviceMemory::from_raw(state.next_handle());
        state.memory.insert(memory);
        Ok(memory)
    }

    fn free_memory(
        &self,
        _device: Device,
        memory: DeviceMemory,
        _allocator: Option<&AllocationCallbacks>,
    ) {
        let mut state = self.state.borrow_mut();
        state.record(DriverCall::FreeMemory { memory });
        state.memory.remove(&memory);
    }

    fn bind_buffer_memory(
        &self,
        _device: Device,
        buffer: Buffer,
        memory: DeviceMemory,
        offset: u64,
    ) -> Result<(), VkResult> {
        let mut state = self.state.borrow_mut();
        match state.record(DriverCall::BindBufferMemory {
            buffer,
            memory,
            offset,
        }) {
            Some(result) => Err(result),
            None => Ok(()),
        }
    }

    fn create_compute_pipelines(
        &self,
        device: Device,
        cache: PipelineCache,
        infos: &[ComputePipelineCreateInfo],
        _allocator: Option<&AllocationCallbacks>,
        pipelines: &mut [Pipeline],
    ) -> VkResult {
        if pipelines.len() != infos.len() {
            return VkResult::ERROR_VALIDATION_FAILED_EXT;
        }
        let mut state = self.state.borrow_mut();
        if let Some(result) = state.record(DriverCall::CreateComputePipelines {
            device,
            cache,
            infos: infos.to_vec(),
        }) {
            pipelines.fill(Pipeline::NULL);
            return result;
        }

        let mut result = VkResult::SUCCESS;
        for (info, slot) in infos.iter().zip(pipelines.iter_mut()) {
            if info.stage.is_unset() {
                *slot = Pipeline::NULL;
                result = state.unset_stage_result;
            } else {
                *slot = Pipeline::from_raw(state.next_handle());
            }
        }
        result
    }
}
