pub use ifp_core as core;
pub use ifp_imgproc as imgproc;
pub use ifp_objdetect as objdetect;

pub use ifp_core::{Circle, Image, Rect};
pub use ifp_objdetect::{run_pipeline, DetectionResult, Pipeline};

/// Initialize a single global Rayon thread pool for all CPU-parallel routines.
///
/// Call this once at application startup before processing images.
/// Repeated calls are idempotent and return the first initialization result.
///
/// Priority order:
/// 1. explicit `num_threads`
/// 2. `IFP_CPU_THREADS` env var
/// 3. Rayon default
pub fn init_thread_pool(num_threads: Option<usize>) -> ifp_core::Result<()> {
    ifp_core::init_global_thread_pool(num_threads)
}
