use std::ffi::c_void;

macro_rules! non_dispatchable_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub const NULL: Self = Self(0);

            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn as_raw(self) -> u64 {
                self.0
            }

            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

non_dispatchable_handle!(Buffer);
non_dispatchable_handle!(DeviceMemory);
non_dispatchable_handle!(Pipeline);
non_dispatchable_handle!(PipelineCache);
non_dispatchable_handle!(PipelineLayout);
non_dispatchable_handle!(ShaderModule);
non_dispatchable_handle!(
    /// `VkTensorARM`. Opaque to callers; the layer resolves it back to its tensor record.
    TensorArm
);

/// `VkDevice`: a dispatchable (pointer-sized) handle.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Device(*mut c_void);

// The handle is an opaque identifier handed out by the loader; it is never dereferenced here.
unsafe impl Send for Device {}
unsafe impl Sync for Device {}

impl Device {
    pub const NULL: Self = Self(std::ptr::null_mut());

    pub fn from_raw(raw: usize) -> Self {
        Self(raw as *mut c_void)
    }

    pub fn as_raw(self) -> usize {
        self.0 as usize
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::NULL
    }
}
