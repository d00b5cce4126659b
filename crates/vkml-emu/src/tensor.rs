//! Tensors emulated as one generic storage buffer plus shape metadata.
//!
//! The host driver has no multi-dimensional resource type, so a tensor is a [`Tensor`] record:
//! the declared format and extents, the derived element count and byte size, the backing buffer
//! it exclusively owns, and whatever memory has been bound to that buffer. Format and extents
//! are fixed at creation; memory binding is the only state change a tensor goes through.

use tracing::{debug, warn};
use vkml_abi::{
    AllocationCallbacks, Buffer, BufferCreateInfo, BufferUsageFlags, Device, DeviceMemory, Format,
    MemoryAllocateInfo, MemoryRequirements, SharingMode, StructureType,
};

use crate::config::EmulationConfig;
use crate::driver::NativeDriver;
use crate::error::EmulationError;

/// Usage of every backing buffer: readable and writable from shaders and usable as either end
/// of a transfer.
pub const BACKING_BUFFER_USAGE: BufferUsageFlags = BufferUsageFlags::STORAGE_BUFFER
    .union(BufferUsageFlags::TRANSFER_SRC)
    .union(BufferUsageFlags::TRANSFER_DST);

/// What a caller asks for when creating a tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TensorDesc<'a> {
    pub format: Format,
    pub dimensions: &'a [u32],
}

impl<'a> TensorDesc<'a> {
    pub fn new(format: Format, dimensions: &'a [u32]) -> Self {
        Self { format, dimensions }
    }
}

/// Element count and byte size for `dimensions`, or `None` if either overflows `u64`.
///
/// An empty dimension list describes a scalar (one element).
pub fn shape_size(dimensions: &[u32], element_size: u32) -> Option<(u64, u64)> {
    let elements = dimensions
        .iter()
        .try_fold(1u64, |acc, &extent| acc.checked_mul(u64::from(extent)))?;
    let bytes = elements.checked_mul(u64::from(element_size))?;
    Some((elements, bytes))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemoryBinding {
    #[default]
    Unbound,
    /// Allocated by the emulator; freed when the tensor is destroyed.
    Owned { memory: DeviceMemory },
    /// Supplied by the caller, who keeps ownership.
    External { memory: DeviceMemory, offset: u64 },
}

impl MemoryBinding {
    pub fn is_bound(&self) -> bool {
        !matches!(self, Self::Unbound)
    }

    pub fn memory(&self) -> Option<DeviceMemory> {
        match *self {
            Self::Unbound => None,
            Self::Owned { memory } | Self::External { memory, .. } => Some(memory),
        }
    }
}

/// The answer to a properties query: stored values only, nothing is recomputed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TensorProperties {
    pub format: Format,
    pub dimension_count: u32,
}

/// One emulated tensor.
///
/// Owns its backing buffer (and any emulator-allocated memory) until handed back to
/// [`TensorEmulator::destroy`]; dropping it without doing so leaks the driver objects.
#[must_use = "a tensor owns driver objects and must be released with TensorEmulator::destroy"]
#[derive(Debug, PartialEq, Eq)]
pub struct Tensor {
    device: Device,
    format: Format,
    dimensions: Vec<u32>,
    element_count: u64,
    byte_size: u64,
    buffer: Buffer,
    memory: MemoryBinding,
}

impl Tensor {
    /// The device the tensor was created on.
    pub fn device(&self) -> Device {
        self.device
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn dimensions(&self) -> &[u32] {
        &self.dimensions
    }

    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    pub fn element_count(&self) -> u64 {
        self.element_count
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn buffer(&self) -> Buffer {
        self.buffer
    }

    pub fn memory_binding(&self) -> MemoryBinding {
        self.memory
    }

    pub fn properties(&self) -> TensorProperties {
        TensorProperties {
            format: self.format,
            dimension_count: self.dimensions.len() as u32,
        }
    }
}

/// Creates, binds and destroys [`Tensor`]s against a [`NativeDriver`].
///
/// Holds no per-tensor state: every tensor is an independent value owned by the caller.
#[derive(Debug, Clone)]
pub struct TensorEmulator<D> {
    driver: D,
    config: EmulationConfig,
}

impl<D: NativeDriver> TensorEmulator<D> {
    pub fn new(driver: D, config: EmulationConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &EmulationConfig {
        &self.config
    }

    /// Create a tensor backed by a freshly created buffer of `Π(dimensions) × element_size`
    /// bytes.
    ///
    /// Issues exactly one buffer creation call. Zero extents are not trapped; the resulting
    /// zero-sized request goes to the driver and its verdict is returned. A size that does not
    /// fit in `u64` fails before the driver is called.
    pub fn create(
        &self,
        device: Device,
        desc: &TensorDesc<'_>,
        allocator: Option<&AllocationCallbacks>,
    ) -> Result<Tensor, EmulationError> {
        debug!(
            rank = desc.dimensions.len(),
            format = desc.format.as_raw(),
            "creating emulated tensor"
        );

        let element_size = self.config.element_size(desc.format);
        let (element_count, byte_size) = shape_size(desc.dimensions, element_size).ok_or_else(
            || EmulationError::SizeOverflow {
                dimensions: desc.dimensions.to_vec(),
                element_size,
            },
        )?;

        let info = BufferCreateInfo {
            s_type: StructureType::BUFFER_CREATE_INFO,
            size: byte_size,
            usage: BACKING_BUFFER_USAGE,
            sharing_mode: SharingMode::EXCLUSIVE,
            ..BufferCreateInfo::default()
        };
        let buffer = self
            .driver
            .create_buffer(device, &info, allocator)
            .map_err(|result| {
                warn!(%result, byte_size, "backing buffer creation failed");
                EmulationError::Driver(result)
            })?;

        debug!(
            byte_size,
            buffer = buffer.as_raw(),
            "emulated tensor created (backed by buffer)"
        );
        Ok(Tensor {
            device,
            format: desc.format,
            dimensions: desc.dimensions.to_vec(),
            element_count,
            byte_size,
            buffer,
            memory: MemoryBinding::Unbound,
        })
    }

    /// Release the backing buffer, then any emulator-owned memory.
    ///
    /// Caller-supplied memory is left alone.
    pub fn destroy(&self, device: Device, tensor: Tensor, allocator: Option<&AllocationCallbacks>) {
        if !tensor.buffer.is_null() {
            self.driver.destroy_buffer(device, tensor.buffer, allocator);
        }
        if let MemoryBinding::Owned { memory } = tensor.memory {
            self.driver.free_memory(device, memory, allocator);
        }
        debug!(buffer = tensor.buffer.as_raw(), "emulated tensor destroyed");
    }

    /// Memory requirements of the backing buffer, straight from the driver.
    pub fn memory_requirements(&self, device: Device, tensor: &Tensor) -> MemoryRequirements {
        self.driver.buffer_memory_requirements(device, tensor.buffer)
    }

    /// Bind caller-owned memory to the backing buffer.
    pub fn bind_external_memory(
        &self,
        device: Device,
        tensor: &mut Tensor,
        memory: DeviceMemory,
        offset: u64,
    ) -> Result<(), EmulationError> {
        if tensor.memory.is_bound() {
            return Err(EmulationError::MemoryAlreadyBound);
        }
        self.driver
            .bind_buffer_memory(device, tensor.buffer, memory, offset)?;
        tensor.memory = MemoryBinding::External { memory, offset };
        Ok(())
    }

    /// Allocate memory sized for the backing buffer from `memory_type_index` and bind it.
    ///
    /// The tensor owns the allocation afterwards. If binding fails the allocation is freed
    /// before the bind error is returned.
    pub fn allocate_and_bind(
        &self,
        device: Device,
        tensor: &mut Tensor,
        memory_type_index: u32,
        allocator: Option<&AllocationCallbacks>,
    ) -> Result<DeviceMemory, EmulationError> {
        if tensor.memory.is_bound() {
            return Err(EmulationError::MemoryAlreadyBound);
        }

        let requirements = self
            .driver
            .buffer_memory_requirements(device, tensor.buffer);
        let info = MemoryAllocateInfo {
            allocation_size: requirements.size,
            memory_type_index,
            ..MemoryAllocateInfo::default()
        };
        let memory = self.driver.allocate_memory(device, &info, allocator)?;

        if let Err(result) = self
            .driver
            .bind_buffer_memory(device, tensor.buffer, memory, 0)
        {
            warn!(%result, memory = memory.as_raw(), "binding tensor memory failed");
            self.driver.free_memory(device, memory, allocator);
            return Err(EmulationError::Driver(result));
        }

        tensor.memory = MemoryBinding::Owned { memory };
        Ok(memory)
    }
}
