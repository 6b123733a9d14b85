//! Compute-target detection and batch-size policy.
//!
//! Targets are probed in a fixed priority order (CUDA, then Metal, then CPU) and the
//! first available one wins. The resolved [`DeviceProfile`] is computed once per
//! reranker and never re-probed.


use std::fmt;

use candle_core::{DType, Device};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::warn;

use crate::backend::BackendError;
use crate::constants::{
    BATCH_SIZE_CPU, BATCH_SIZE_GPU_HIGH, BATCH_SIZE_GPU_LOW, BATCH_SIZE_GPU_MID,
    BATCH_SIZE_METAL, BI_ENCODER_BATCH_SIZE_ACCELERATOR, BI_ENCODER_BATCH_SIZE_CPU,
    GPU_HIGH_MEMORY_GB, GPU_MID_MEMORY_GB,
};

/// A compute target the backend can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeTarget {
    /// NVIDIA GPU via CUDA.
    Cuda,
    /// Apple Silicon GPU via Metal.
    Metal,
    /// Host processor.
    Cpu,
}

impl ComputeTarget {
    /// Probe order used by [`detect_target`].
    pub const PRIORITY: [ComputeTarget; 3] =
        [ComputeTarget::Cuda, ComputeTarget::Metal, ComputeTarget::Cpu];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeTarget::Cuda => "cuda",
            ComputeTarget::Metal => "metal",
            ComputeTarget::Cpu => "cpu",
        }
    }

    #[inline]
    pub fn is_accelerator(&self) -> bool {
        !matches!(self, ComputeTarget::Cpu)
    }

    /// Weight precision used on this target (half precision on accelerators).
    #[inline]
    pub fn dtype(&self) -> DType {
        if self.is_accelerator() {
            DType::F16
        } else {
            DType::F32
        }
    }

    /// Opens the candle device for this target (ordinal 0).
    pub fn to_device(&self) -> Result<Device, BackendError> {
        let unavailable = |e: candle_core::Error| BackendError::DeviceUnavailable {
            device: self.as_str().to_string(),
            reason: e.to_string(),
        };

        match self {
            ComputeTarget::Cuda => Device::new_cuda(0).map_err(unavailable),
            ComputeTarget::Metal => Device::new_metal(0).map_err(unavailable),
            ComputeTarget::Cpu => Ok(Device::Cpu),
        }
    }
}

impl fmt::Display for ComputeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memory class of a resolved target; drives the default batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityClass {
    /// CUDA device with at least 24 GB.
    HighMemoryGpu,
    /// CUDA device with at least 12 GB.
    MidMemoryGpu,
    /// CUDA device below 12 GB, or with unknown memory.
    LowMemoryGpu,
    /// Apple Silicon shared memory.
    UnifiedMemory,
    /// Host processor.
    Host,
}

impl CapacityClass {
    pub fn classify(target: ComputeTarget, memory_gb: Option<f64>) -> Self {
        match target {
            ComputeTarget::Cuda => match memory_gb {
                Some(gb) if gb >= GPU_HIGH_MEMORY_GB => CapacityClass::HighMemoryGpu,
                Some(gb) if gb >= GPU_MID_MEMORY_GB => CapacityClass::MidMemoryGpu,
                _ => CapacityClass::LowMemoryGpu,
            },
            ComputeTarget::Metal => CapacityClass::UnifiedMemory,
            ComputeTarget::Cpu => CapacityClass::Host,
        }
    }
}

/// Which scoring strategy a batch size is being chosen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Pairwise scoring; memory-heavy, so batches scale with device memory.
    CrossEncoder,
    /// Independent encoding; large batches on CUDA, host processor otherwise.
    BiEncoder,
}

impl BatchPolicy {
    pub fn default_batch_size(&self, capacity: CapacityClass) -> usize {
        match self {
            BatchPolicy::CrossEncoder => match capacity {
                CapacityClass::HighMemoryGpu => BATCH_SIZE_GPU_HIGH,
                CapacityClass::MidMemoryGpu => BATCH_SIZE_GPU_MID,
                CapacityClass::LowMemoryGpu => BATCH_SIZE_GPU_LOW,
                CapacityClass::UnifiedMemory => BATCH_SIZE_METAL,
                CapacityClass::Host => BATCH_SIZE_CPU,
            },
            BatchPolicy::BiEncoder => match capacity {
                CapacityClass::HighMemoryGpu
                | CapacityClass::MidMemoryGpu
                | CapacityClass::LowMemoryGpu => BI_ENCODER_BATCH_SIZE_ACCELERATOR,
                CapacityClass::UnifiedMemory | CapacityClass::Host => BI_ENCODER_BATCH_SIZE_CPU,
            },
        }
    }

    /// Whether this strategy runs on `target`. The bi-encoder skips Metal.
    pub fn supports(&self, target: ComputeTarget) -> bool {
        match self {
            BatchPolicy::CrossEncoder => true,
            BatchPolicy::BiEncoder => target != ComputeTarget::Metal,
        }
    }
}

/// Answers which compute targets exist on this machine.
pub trait AcceleratorProbe {
    fn is_available(&self, target: ComputeTarget) -> bool;

    /// Total device memory in GB, when known.
    fn memory_gb(&self, _target: ComputeTarget) -> Option<f64> {
        None
    }
}

/// Probes candle backends compiled into this build.
///
/// Candle does not report device memory, so CUDA capacity comes from an explicit hint
/// (`SIFT_GPU_MEMORY_GB`); without one the device is treated as low-memory.
#[derive(Debug, Clone, Default)]
pub struct SystemProbe {
    gpu_memory_gb: Option<f64>,
}

impl SystemProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gpu_memory_gb(mut self, gpu_memory_gb: Option<f64>) -> Self {
        self.gpu_memory_gb = gpu_memory_gb;
        self
    }
}

impl AcceleratorProbe for SystemProbe {
    fn is_available(&self, target: ComputeTarget) -> bool {
        match target {
            ComputeTarget::Cuda => probe_cuda(),
            ComputeTarget::Metal => probe_metal(),
            ComputeTarget::Cpu => true,
        }
    }

    fn memory_gb(&self, target: ComputeTarget) -> Option<f64> {
        match target {
            ComputeTarget::Cuda => self.gpu_memory_gb,
            _ => None,
        }
    }
}

#[cfg(feature = "cuda")]
fn probe_cuda() -> bool {
    match Device::new_cuda(0) {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "CUDA device unavailable");
            false
        }
    }
}

#[cfg(not(feature = "cuda"))]
fn probe_cuda() -> bool {
    false
}

#[cfg(feature = "metal")]
fn probe_metal() -> bool {
    match Device::new_metal(0) {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Metal device unavailable");
            false
        }
    }
}

#[cfg(not(feature = "metal"))]
fn probe_metal() -> bool {
    false
}

/// Probe with a fixed answer; pins the target regardless of hardware.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    available: Vec<ComputeTarget>,
    memory_gb: Option<f64>,
}

impl StaticProbe {
    pub fn new(available: impl IntoIterator<Item = ComputeTarget>) -> Self {
        Self {
            available: available.into_iter().collect(),
            memory_gb: None,
        }
    }

    pub fn cpu_only() -> Self {
        Self::new([ComputeTarget::Cpu])
    }

    pub fn with_memory_gb(mut self, memory_gb: f64) -> Self {
        self.memory_gb = Some(memory_gb);
        self
    }
}

impl AcceleratorProbe for StaticProbe {
    fn is_available(&self, target: ComputeTarget) -> bool {
        self.available.contains(&target)
    }

    fn memory_gb(&self, target: ComputeTarget) -> Option<f64> {
        target.is_accelerator().then_some(self.memory_gb).flatten()
    }
}

/// Returns the first available target in [`ComputeTarget::PRIORITY`] order.
///
/// The host processor is always usable, even if the probe does not report it.
pub fn detect_target(probe: &dyn AcceleratorProbe) -> ComputeTarget {
    detect_target_for(probe, BatchPolicy::CrossEncoder)
}

/// Like [`detect_target`], skipping targets `policy` does not run on.
pub fn detect_target_for(probe: &dyn AcceleratorProbe, policy: BatchPolicy) -> ComputeTarget {
    ComputeTarget::PRIORITY
        .into_iter()
        .find(|target| {
            *target == ComputeTarget::Cpu
                || (policy.supports(*target) && probe.is_available(*target))
        })
        .unwrap_or(ComputeTarget::Cpu)
}

/// Resolved compute target plus the batch size derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    target: ComputeTarget,
    capacity: CapacityClass,
    batch_size: usize,
}

impl DeviceProfile {
    /// Probes the machine and derives a batch size; an explicit override always wins.
    pub fn resolve(
        probe: &dyn AcceleratorProbe,
        policy: BatchPolicy,
        batch_override: Option<usize>,
    ) -> Self {
        let target = detect_target_for(probe, policy);
        let memory_gb = probe.memory_gb(target);
        let profile = Self::for_target(target, memory_gb, policy, batch_override);

        match target {
            ComputeTarget::Cuda => info!(
                memory_gb = ?memory_gb,
                capacity = ?profile.capacity,
                "Using CUDA GPU acceleration"
            ),
            ComputeTarget::Metal => info!("Using Metal GPU acceleration"),
            ComputeTarget::Cpu => {
                let threads = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                info!(threads, "Using CPU");
            }
        }

        debug!(
            target = %profile.target,
            batch_size = profile.batch_size,
            overridden = batch_override.is_some(),
            "Resolved device profile"
        );

        profile
    }

    /// Builds a profile for a known target without probing.
    pub fn for_target(
        target: ComputeTarget,
        memory_gb: Option<f64>,
        policy: BatchPolicy,
        batch_override: Option<usize>,
    ) -> Self {
        let capacity = CapacityClass::classify(target, memory_gb);
        let batch_size = batch_override
            .unwrap_or_else(|| policy.default_batch_size(capacity))
            .max(1);

        Self {
            target,
            capacity,
            batch_size,
        }
    }

    /// CPU profile with the given batch size.
    pub fn cpu(batch_size: usize) -> Self {
        Self::for_target(
            ComputeTarget::Cpu,
            None,
            BatchPolicy::CrossEncoder,
            Some(batch_size),
        )
    }

    #[inline]
    pub fn target(&self) -> ComputeTarget {
        self.target
    }

    #[inline]
    pub fn capacity(&self) -> CapacityClass {
        self.capacity
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.target.dtype()
    }

    pub fn device(&self) -> Result<Device, BackendError> {
        self.target.to_device()
    }
}
