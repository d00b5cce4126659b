use std::fmt;

/// `VkResult`.
///
/// Kept as a transparent `i32` rather than a Rust enum: drivers may return codes this crate has
/// never heard of, and those must reach the caller unchanged.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VkResult(i32);

impl VkResult {
    pub const SUCCESS: Self = Self(0);
    pub const NOT_READY: Self = Self(1);
    pub const TIMEOUT: Self = Self(2);
    pub const INCOMPLETE: Self = Self(5);
    pub const ERROR_OUT_OF_HOST_MEMORY: Self = Self(-1);
    pub const ERROR_OUT_OF_DEVICE_MEMORY: Self = Self(-2);
    pub const ERROR_INITIALIZATION_FAILED: Self = Self(-3);
    pub const ERROR_DEVICE_LOST: Self = Self(-4);
    pub const ERROR_MEMORY_MAP_FAILED: Self = Self(-5);
    pub const ERROR_FEATURE_NOT_PRESENT: Self = Self(-8);
    pub const ERROR_UNKNOWN: Self = Self(-13);
    pub const ERROR_VALIDATION_FAILED_EXT: Self = Self(-1_000_011_001);
    pub const ERROR_INVALID_SHADER_NV: Self = Self(-1_000_012_000);
    pub const PIPELINE_COMPILE_REQUIRED: Self = Self(1_000_297_000);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// Negative codes are errors; zero and positive codes are (possibly partial) successes.
    pub const fn is_error(self) -> bool {
        self.0 < 0
    }

    /// `Ok(())` for `VK_SUCCESS` only, the way single-object create calls are checked.
    pub fn result(self) -> Result<(), VkResult> {
        if self == Self::SUCCESS {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::SUCCESS => "VK_SUCCESS",
            Self::NOT_READY => "VK_NOT_READY",
            Self::TIMEOUT => "VK_TIMEOUT",
            Self::INCOMPLETE => "VK_INCOMPLETE",
            Self::ERROR_OUT_OF_HOST_MEMORY => "VK_ERROR_OUT_OF_HOST_MEMORY",
            Self::ERROR_OUT_OF_DEVICE_MEMORY => "VK_ERROR_OUT_OF_DEVICE_MEMORY",
            Self::ERROR_INITIALIZATION_FAILED => "VK_ERROR_INITIALIZATION_FAILED",
            Self::ERROR_DEVICE_LOST => "VK_ERROR_DEVICE_LOST",
            Self::ERROR_MEMORY_MAP_FAILED => "VK_ERROR_MEMORY_MAP_FAILED",
            Self::ERROR_FEATURE_NOT_PRESENT => "VK_ERROR_FEATURE_NOT_PRESENT",
            Self::ERROR_UNKNOWN => "VK_ERROR_UNKNOWN",
            Self::ERROR_VALIDATION_FAILED_EXT => "VK_ERROR_VALIDATION_FAILED_EXT",
            Self::ERROR_INVALID_SHADER_NV => "VK_ERROR_INVALID_SHADER_NV",
            Self::PIPELINE_COMPILE_REQUIRED => "VK_PIPELINE_COMPILE_REQUIRED",
            _ => return None,
        })
    }
}

impl Default for VkResult {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl fmt::Debug for VkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "VkResult({})", self.0),
        }
    }
}

impl fmt::Display for VkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for VkResult {}
