//! Element sizes for tensor formats.

use vkml_abi::Format;

/// Element size assumed for formats missing from [`element_size`]'s table (a 32-bit float).
pub const DEFAULT_ELEMENT_SIZE: u32 = 4;

/// Bytes per element for the scalar formats tensors are declared with.
///
/// Returns `None` for anything else (multi-component, packed, compressed, depth formats);
/// callers fall back to a configured default rather than guessing.
pub fn element_size(format: Format) -> Option<u32> {
    let size = match format {
        Format::R8_UNORM
        | Format::R8_SNORM
        | Format::R8_UINT
        | Format::R8_SINT
        | Format::R8_BOOL_ARM => 1,
        Format::R16_UNORM
        | Format::R16_SNORM
        | Format::R16_UINT
        | Format::R16_SINT
        | Format::R16_SFLOAT => 2,
        Format::R32_UINT | Format::R32_SINT | Format::R32_SFLOAT => 4,
        Format::R64_UINT | Format::R64_SINT | Format::R64_SFLOAT => 8,
        _ => return None,
    };
    Some(size)
}
