use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vkml_abi::{Device, Format};
use vkml_emu::format::element_size;
use vkml_emu::recording::{DriverOp, RecordingDriver};
use vkml_emu::{EmulationConfig, TensorDesc, TensorEmulator, TensorProperties};

const SCALAR_FORMATS: [Format; 8] = [
    Format::R8_UINT,
    Format::R8_BOOL_ARM,
    Format::R16_SFLOAT,
    Format::R16_SINT,
    Format::R32_SFLOAT,
    Format::R32_UINT,
    Format::R64_SFLOAT,
    Format::R64_SINT,
];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn device() -> Device {
    Device::from_raw(0xA0)
}

#[test]
fn float_tensor_2x3x4_is_96_bytes() {
    init_tracing();
    let driver = RecordingDriver::new();
    let tensors = TensorEmulator::new(&driver, EmulationConfig::default());

    let tensor = tensors
        .create(device(), &TensorDesc::new(Format::R32_SFLOAT, &[2, 3, 4]), None)
        .unwrap();
    assert_eq!(tensor.element_count(), 24);
    assert_eq!(tensor.byte_size(), 96);
    assert_eq!(driver.buffer_size(tensor.buffer()), Some(96));

    tensors.destroy(device(), tensor, None);
    assert_eq!(driver.count(DriverOp::CreateBuffer), 1);
    assert_eq!(driver.count(DriverOp::DestroyBuffer), 1);
    assert_eq!(driver.live_buffers(), 0);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn byte_size_and_properties_follow_the_declared_shape(
        format in prop::sample::select(SCALAR_FORMATS.to_vec()),
        dims in prop::collection::vec(1u32..64, 0..6),
    ) {
        init_tracing();
        let driver = RecordingDriver::new();
        let tensors = TensorEmulator::new(&driver, EmulationConfig::default());

        let tensor = tensors.create(device(), &TensorDesc::new(format, &dims), None).unwrap();
        let expected = dims.iter().map(|&d| u64::from(d)).product::<u64>()
            * u64::from(element_size(format).unwrap());
        prop_assert_eq!(tensor.byte_size(), expected);
        prop_assert_eq!(
            tensor.properties(),
            TensorProperties { format, dimension_count: dims.len() as u32 }
        );

        tensors.destroy(device(), tensor, None);
        prop_assert_eq!(driver.live_buffers(), 0);
    }

    #[test]
    fn every_allocation_is_released_at_most_once(
        dims in prop::collection::vec(1u32..32, 1..4),
        allocate in any::<bool>(),
        fail_bind in any::<bool>(),
    ) {
        init_tracing();
        let driver = RecordingDriver::new();
        let tensors = TensorEmulator::new(&driver, EmulationConfig::default());
        let mut tensor = tensors
            .create(device(), &TensorDesc::new(Format::R32_SFLOAT, &dims), None)
            .unwrap();

        if allocate {
            if fail_bind {
                driver.fail_next(DriverOp::BindBufferMemory, vkml_abi::VkResult::ERROR_UNKNOWN);
            }
            let bound = tensors.allocate_and_bind(device(), &mut tensor, 0, None);
            prop_assert_eq!(bound.is_ok(), !fail_bind);
        }
        tensors.destroy(device(), tensor, None);

        prop_assert_eq!(driver.count(DriverOp::CreateBuffer), 1);
        prop_assert_eq!(driver.count(DriverOp::DestroyBuffer), 1);
        prop_assert_eq!(driver.count(DriverOp::AllocateMemory), usize::from(allocate));
        prop_assert_eq!(driver.count(DriverOp::FreeMemory), usize::from(allocate));
        prop_assert_eq!(driver.live_allocations(), 0);
    }
}
