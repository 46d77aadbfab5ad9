//! CPU/GPU frame pacing over a ring of in-flight frame slots.
//!
//! A render loop records each frame into one of a small fixed set of slots
//! (command allocator + back buffer) while the GPU consumes previously
//! submitted frames. The CPU may run ahead, but it must never reset a slot's
//! recording resources before the GPU has retired the work last submitted
//! through that slot. [`FramePacer`] enforces exactly that, using a single
//! monotonic counter and one completion marker per slot:
//!
//! - [`FramePacer::signal`] bumps the counter and enqueues a completion
//!   update at the tail of the GPU queue;
//! - [`FramePacer::finish_frame`] signals and records the value as the
//!   slot's marker once a frame's work (including its present) is submitted;
//! - [`FramePacer::acquire_slot`] blocks until the slot's marker has been
//!   reached by the GPU, which only happens when the CPU has outrun the GPU
//!   by a full ring of slots.
//!
//! The GPU side is abstracted behind [`GpuTimeline`], so the protocol can be
//! driven by a real fence/queue pair or by a simulated timeline in tests.

mod pacer;
mod timeline;

pub use pacer::FramePacer;
pub use timeline::GpuTimeline;
