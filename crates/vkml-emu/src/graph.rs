//! Data-graph pipelines narrowed to single-stage compute pipelines.
//!
//! The host driver can only build compute pipelines, which carry exactly one shader stage. A
//! graph request is translated by keeping its first stage and discarding the rest; there is no
//! multi-stage execution. A request with no stages becomes a compute request whose stage is
//! all-zero, and the driver's rejection of it is what the caller sees.

use std::slice;

use tracing::{debug, warn};
use vkml_abi::{
    AllocationCallbacks, ComputePipelineCreateInfo, DataGraphPipelineCreateInfoArm, Device,
    Pipeline, PipelineCache, PipelineCreateFlags, PipelineLayout, PipelineShaderStageCreateInfo,
    VkResult,
};

use crate::driver::NativeDriver;
use crate::error::EmulationError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphPipelineRequest<'a> {
    pub flags: PipelineCreateFlags,
    pub layout: PipelineLayout,
    pub stages: &'a [PipelineShaderStageCreateInfo],
}

impl<'a> GraphPipelineRequest<'a> {
    pub fn new(
        flags: PipelineCreateFlags,
        layout: PipelineLayout,
        stages: &'a [PipelineShaderStageCreateInfo],
    ) -> Self {
        Self {
            flags,
            layout,
            stages,
        }
    }

    /// View a native create-info as a request.
    ///
    /// A null `p_stages` or a zero `stage_count` yields no stages.
    ///
    /// # Safety
    ///
    /// When `p_stages` is non-null it must point to `stage_count` initialized stage descriptors
    /// that stay valid and unmodified for `'a`.
    pub unsafe fn from_raw(info: &'a DataGraphPipelineCreateInfoArm) -> Self {
        let stages = if info.p_stages.is_null() || info.stage_count == 0 {
            &[][..]
        } else {
            // SAFETY: guaranteed by the caller.
            unsafe { slice::from_raw_parts(info.p_stages, info.stage_count as usize) }
        };
        Self::new(info.flags, info.layout, stages)
    }
}

/// The compute create-info a graph request collapses into.
///
/// Flags and layout are copied verbatim and the first stage (or [`PipelineShaderStageCreateInfo::UNSET`])
/// becomes the compute stage. Every other field keeps its zero default.
pub fn narrow_to_compute(request: &GraphPipelineRequest<'_>) -> ComputePipelineCreateInfo {
    ComputePipelineCreateInfo {
        flags: request.flags,
        layout: request.layout,
        stage: request
            .stages
            .first()
            .copied()
            .unwrap_or(PipelineShaderStageCreateInfo::UNSET),
        ..ComputePipelineCreateInfo::default()
    }
}

/// How many stages [`narrow_to_compute`] discards.
pub fn dropped_stage_count(request: &GraphPipelineRequest<'_>) -> usize {
    request.stages.len().saturating_sub(1)
}

#[derive(Debug, Clone)]
pub struct GraphPipelineEmulator<D> {
    driver: D,
}

impl<D: NativeDriver> GraphPipelineEmulator<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// Narrow every request and create all of them with a single driver call.
    ///
    /// Order is preserved: `pipelines[i]` receives the pipeline built from `requests[i]`. The
    /// driver's result is returned unchanged, including for an empty batch. Mismatched lengths
    /// are rejected without calling the driver.
    pub fn create_graph_pipelines(
        &self,
        device: Device,
        cache: PipelineCache,
        requests: &[GraphPipelineRequest<'_>],
        allocator: Option<&AllocationCallbacks>,
        pipelines: &mut [Pipeline],
    ) -> VkResult {
        if requests.len() != pipelines.len() {
            let err = EmulationError::PipelineCountMismatch {
                infos: requests.len(),
                pipelines: pipelines.len(),
            };
            warn!(%err, "rejecting graph pipeline batch");
            return err.to_vk_result();
        }

        let infos: Vec<ComputePipelineCreateInfo> = requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                let dropped = dropped_stage_count(request);
                if dropped > 0 {
                    warn!(
                        index,
                        stages = request.stages.len(),
                        dropped,
                        "graph pipeline narrowed to its first stage"
                    );
                } else if request.stages.is_empty() {
                    debug!(index, "graph pipeline has no stages");
                }
                narrow_to_compute(request)
            })
            .collect();

        let result = self
            .driver
            .create_compute_pipelines(device, cache, &infos, allocator, pipelines);
        debug!(count = infos.len(), %result, "graph pipelines created as compute pipelines");
        result
    }

    /// [`Self::create_graph_pipelines`] with freshly allocated output slots.
    pub fn create_graph_pipelines_vec(
        &self,
        device: Device,
        cache: PipelineCache,
        requests: &[GraphPipelineRequest<'_>],
        allocator: Option<&AllocationCallbacks>,
    ) -> (VkResult, Vec<Pipeline>) {
        let mut pipelines = vec![Pipeline::NULL; requests.len()];
        let result = self.create_graph_pipelines(device, cache, requests, allocator, &mut pipelines);
        (result, pipelines)
    }
}
