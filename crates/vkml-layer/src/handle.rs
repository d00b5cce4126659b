//! Opaque tensor handles.
//!
//! A handle is the address of a heap slot holding the tensor and a tag. Lookups check alignment
//! and the tag before touching the tensor, and release retires the tag before the slot is freed,
//! so null handles, handles minted elsewhere and (until the allocation is reused) destroyed
//! handles are turned away instead of dereferenced as tensors.

use std::mem;
use std::ptr;

use vkml_abi::TensorArm;
use vkml_emu::Tensor;

const LIVE_TAG: u64 = u64::from_be_bytes(*b"vkmlTnsr");
const RETIRED_TAG: u64 = !LIVE_TAG;

#[repr(C)]
struct TensorSlot {
    tag: u64,
    tensor: Tensor,
}

/// Move `tensor` behind a fresh handle.
pub(crate) fn register(tensor: Tensor) -> TensorArm {
    let slot = Box::into_raw(Box::new(TensorSlot {
        tag: LIVE_TAG,
        tensor,
    }));
    TensorArm::from_raw(slot as usize as u64)
}

/// # Safety
///
/// As for [`resolve`].
unsafe fn live_slot(handle: TensorArm) -> Option<*mut TensorSlot> {
    let raw = usize::try_from(handle.as_raw()).ok()?;
    if raw == 0 || raw % mem::align_of::<TensorSlot>() != 0 {
        return None;
    }
    let slot = raw as *mut TensorSlot;
    // SAFETY: aligned and non-null; readability is the caller's contract.
    let tag = unsafe { ptr::addr_of!((*slot).tag).read() };
    (tag == LIVE_TAG).then_some(slot)
}

/// Borrow the tensor behind `handle`, or `None` if the handle is not live.
///
/// # Safety
///
/// `handle` must be null, a handle returned by [`register`], or otherwise point to at least
/// eight readable bytes. No other reference to the same tensor may exist for `'a`.
pub(crate) unsafe fn resolve<'a>(handle: TensorArm) -> Option<&'a mut Tensor> {
    // SAFETY: guaranteed by the caller.
    let slot = unsafe { live_slot(handle) }?;
    // SAFETY: the tag marks a slot produced by `register` and not yet released.
    Some(unsafe { &mut (*slot).tensor })
}

/// Take the tensor back out of `handle`, invalidating it.
///
/// # Safety
///
/// Same as [`resolve`].
pub(crate) unsafe fn release(handle: TensorArm) -> Option<Tensor> {
    // SAFETY: guaranteed by the caller.
    let slot = unsafe { live_slot(handle) }?;
    // SAFETY: live slot from `register`; the volatile store survives until the slot is freed.
    unsafe {
        ptr::addr_of_mut!((*slot).tag).write_volatile(RETIRED_TAG);
        let TensorSlot { tensor, .. } = *Box::from_raw(slot);
        Some(tensor)
    }
}
