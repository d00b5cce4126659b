use pretty_assertions::assert_eq;
use vkml_abi::{
    Device, Format, PipelineCache, PipelineCreateFlags, PipelineLayout,
    PipelineShaderStageCreateInfo, ShaderModule, VkResult,
};
use vkml_emu::recording::{DriverOp, RecordingDriver};
use vkml_emu::{
    EmulationConfig, GraphPipelineEmulator, GraphPipelineRequest, MemoryBinding, TensorDesc,
    TensorEmulator,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

const DEVICE: usize = 0x5000;

#[test]
fn fixed_element_size_ignores_the_declared_format() {
    init_tracing();
    let driver = RecordingDriver::new();
    let tensors = TensorEmulator::new(&driver, EmulationConfig::fixed_element_size());
    let device = Device::from_raw(DEVICE);

    let narrow = tensors
        .create(device, &TensorDesc::new(Format::R8_UINT, &[2, 3, 4]), None)
        .unwrap();
    let wide = tensors
        .create(device, &TensorDesc::new(Format::R64_SFLOAT, &[2, 3, 4]), None)
        .unwrap();
    assert_eq!(narrow.byte_size(), 96);
    assert_eq!(wide.byte_size(), 96);

    tensors.destroy(device, narrow, None);
    tensors.destroy(device, wide, None);
    assert_eq!(driver.live_buffers(), 0);
}

#[test]
fn unknown_format_uses_the_configured_fallback() {
    init_tracing();
    let driver = RecordingDriver::new();
    let config = EmulationConfig::from_lookup(|name| {
        (name == vkml_emu::config::DEFAULT_ELEMENT_SIZE_ENV).then(|| "16".to_string())
    });
    let tensors = TensorEmulator::new(&driver, config);
    let device = Device::from_raw(DEVICE);

    let tensor = tensors
        .create(device, &TensorDesc::new(Format::R8G8B8A8_UNORM, &[3]), None)
        .unwrap();
    assert_eq!(tensor.byte_size(), 48);
    tensors.destroy(device, tensor, None);
}

#[test]
fn tensors_and_graph_pipelines_share_a_driver_without_interfering() {
    init_tracing();
    let driver = RecordingDriver::new();
    let tensors = TensorEmulator::new(&driver, EmulationConfig::default());
    let graphs = GraphPipelineEmulator::new(&driver);
    let device = Device::from_raw(DEVICE);

    let mut tensor = tensors
        .create(device, &TensorDesc::new(Format::R32_SFLOAT, &[64, 64]), None)
        .unwrap();
    let memory = tensors.allocate_and_bind(device, &mut tensor, 0, None).unwrap();
    assert_eq!(tensor.memory_binding(), MemoryBinding::Owned { memory });

    let stages = [
        PipelineShaderStageCreateInfo::compute(ShaderModule::from_raw(7), c"conv"),
        PipelineShaderStageCreateInfo::compute(ShaderModule::from_raw(8), c"relu"),
    ];
    let request = GraphPipelineRequest::new(
        PipelineCreateFlags::empty(),
        PipelineLayout::from_raw(3),
        &stages,
    );
    let (result, pipelines) =
        graphs.create_graph_pipelines_vec(device, PipelineCache::NULL, &[request], None);
    assert_eq!(result, VkResult::SUCCESS);
    assert_eq!(pipelines.len(), 1);

    tensors.destroy(device, tensor, None);
    assert_eq!(driver.count(DriverOp::CreateBuffer), 1);
    assert_eq!(driver.count(DriverOp::DestroyBuffer), 1);
    assert_eq!(driver.count(DriverOp::CreateComputePipelines), 1);
    assert_eq!(driver.live_allocations(), 0);
}
