use tracing::trace;

use crate::timeline::GpuTimeline;

/// Paces a CPU render loop against a GPU consuming `SLOTS` in-flight frames.
///
/// Bundles the timeline handle, the process-wide monotonic counter, and the
/// per-slot completion markers. The counter starts at 0 and increments by
/// exactly 1 per [`signal`](Self::signal); markers start at 0, so a slot
/// that has never been submitted through is acquirable without blocking.
pub struct FramePacer<T: GpuTimeline, const SLOTS: usize> {
    timeline: T,
    submitted: u64,
    markers: [u64; SLOTS],
}

impl<T: GpuTimeline, const SLOTS: usize> FramePacer<T, SLOTS> {
    pub fn new(timeline: T) -> Self {
        Self {
            timeline,
            submitted: 0,
            markers: [0; SLOTS],
        }
    }

    /// Increments the monotonic counter and enqueues the matching completion
    /// update at the tail of the GPU queue. Returns the new counter value
    /// without blocking.
    pub fn signal(&mut self) -> Result<u64, T::Error> {
        self.submitted += 1;
        self.timeline.enqueue_signal(self.submitted)?;
        Ok(self.submitted)
    }

    /// Blocks the calling thread until the GPU's completion value reaches
    /// `target`. Returns immediately when the value is already there; the
    /// check costs one timeline read, no syscall. Safe to call repeatedly
    /// with an already-satisfied target.
    pub fn wait_until(&self, target: u64) -> Result<(), T::Error> {
        if self.timeline.completed_value() >= target {
            return Ok(());
        }
        trace!(target_value = target, "stalling until the gpu catches up");
        self.timeline.block_until(target)?;
        debug_assert!(self.timeline.completed_value() >= target);
        Ok(())
    }

    /// Signals and waits for that signal: once this returns, every piece of
    /// previously submitted work has retired. Used after initialization and
    /// before tearing down or structurally mutating shared GPU resources.
    pub fn flush(&mut self) -> Result<(), T::Error> {
        let target = self.signal()?;
        self.wait_until(target)
    }

    /// Records that `slot`'s frame (commands and present) has been fully
    /// submitted: signals, and stores the returned value as the slot's
    /// completion marker. The slot must not be reset again until
    /// [`acquire_slot`](Self::acquire_slot) confirms the marker retired.
    pub fn finish_frame(&mut self, slot: usize) -> Result<u64, T::Error> {
        let value = self.signal()?;
        self.markers[slot] = value;
        Ok(value)
    }

    /// Waits until the work last submitted through `slot` has retired,
    /// making the slot's recording resources safe to reset. This is the
    /// render loop's only stall point; it blocks only when the CPU has
    /// outrun the GPU by a full ring of slots.
    pub fn acquire_slot(&self, slot: usize) -> Result<(), T::Error> {
        self.wait_until(self.markers[slot])
    }

    /// The completion marker currently associated with `slot`.
    pub fn marker(&self, slot: usize) -> u64 {
        self.markers[slot]
    }

    /// The last value returned by [`signal`](Self::signal).
    pub fn last_signaled(&self) -> u64 {
        self.submitted
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::convert::Infallible;
    use std::rc::Rc;

    use super::*;

    #[derive(Default)]
    struct SimState {
        completed: Cell<u64>,
        enqueued: RefCell<VecDeque<u64>>,
        blocking_waits: Cell<u32>,
    }

    impl SimState {
        // Retire enqueued signals in submission order until the completion
        // value reaches `value`.
        fn run_gpu_to(&self, value: u64) {
            while self.completed.get() < value {
                let next = self
                    .enqueued
                    .borrow_mut()
                    .pop_front()
                    .expect("waiting for a value that was never signaled");
                assert!(next > self.completed.get(), "completion value went backwards");
                self.completed.set(next);
            }
        }
    }

    #[derive(Clone, Default)]
    struct SimTimeline {
        state: Rc<SimState>,
    }

    impl GpuTimeline for SimTimeline {
        type Error = Infallible;

        fn enqueue_signal(&mut self, value: u64) -> Result<(), Infallible> {
            self.state.enqueued.borrow_mut().push_back(value);
            Ok(())
        }

        fn completed_value(&self) -> u64 {
            self.state.completed.get()
        }

        fn block_until(&self, value: u64) -> Result<(), Infallible> {
            self.state
                .blocking_waits
                .set(self.state.blocking_waits.get() + 1);
            // The simulated GPU only makes progress while the CPU sleeps.
            self.state.run_gpu_to(value);
            Ok(())
        }
    }

    fn sim_pacer<const SLOTS: usize>() -> (FramePacer<SimTimeline, SLOTS>, Rc<SimState>) {
        let timeline = SimTimeline::default();
        let state = Rc::clone(&timeline.state);
        (FramePacer::new(timeline), state)
    }

    #[test]
    fn signal_values_increase_by_one() {
        let (mut pacer, _state) = sim_pacer::<2>();
        for expected in 1..=16 {
            assert_eq!(pacer.signal().unwrap(), expected);
        }
        assert_eq!(pacer.last_signaled(), 16);
    }

    #[test]
    fn satisfied_wait_never_blocks() {
        let (mut pacer, state) = sim_pacer::<2>();
        let v = pacer.signal().unwrap();
        state.run_gpu_to(v);
        pacer.wait_until(v).unwrap();
        assert_eq!(state.blocking_waits.get(), 0);
    }

    #[test]
    fn satisfied_wait_is_idempotent() {
        let (mut pacer, state) = sim_pacer::<2>();
        let v = pacer.signal().unwrap();
        state.run_gpu_to(v);
        pacer.wait_until(v).unwrap();
        pacer.wait_until(v).unwrap();
        assert_eq!(state.blocking_waits.get(), 0);
        assert_eq!(state.completed.get(), v);
    }

    #[test]
    fn unsatisfied_wait_blocks_until_reached() {
        let (mut pacer, state) = sim_pacer::<2>();
        let v = pacer.signal().unwrap();
        pacer.wait_until(v).unwrap();
        assert_eq!(state.blocking_waits.get(), 1);
        assert!(state.completed.get() >= v);
    }

    #[test]
    fn flush_retires_everything_submitted() {
        let (mut pacer, state) = sim_pacer::<3>();
        for _ in 0..5 {
            pacer.signal().unwrap();
        }
        pacer.flush().unwrap();
        assert_eq!(state.completed.get(), pacer.last_signaled());
        assert!(state.enqueued.borrow().is_empty());
    }

    #[test]
    fn fresh_slots_acquire_without_blocking() {
        let (pacer, state) = sim_pacer::<3>();
        for slot in 0..3 {
            pacer.acquire_slot(slot).unwrap();
        }
        assert_eq!(state.blocking_waits.get(), 0);
    }

    #[test]
    fn lagging_gpu_blocks_third_wraparound_until_first_frame_retires() {
        // Three slots, values 1..=3 submitted back to back while the GPU has
        // not started: wrapping around to slot 0 must stall until completion
        // reaches that slot's marker (1), and no further.
        let (mut pacer, state) = sim_pacer::<3>();
        for slot in 0..3 {
            pacer.acquire_slot(slot).unwrap();
            assert_eq!(pacer.finish_frame(slot).unwrap(), slot as u64 + 1);
        }
        assert_eq!(state.blocking_waits.get(), 0);

        pacer.acquire_slot(0).unwrap();
        assert_eq!(state.blocking_waits.get(), 1);
        assert_eq!(state.completed.get(), 1);
    }

    #[test]
    fn slot_is_never_reacquired_before_its_marker_retires() {
        // Drive the per-frame loop with a surface that hands slots back in
        // a non-sequential order, as a flip-model swap chain may.
        let presented_order = [0usize, 1, 2, 0, 2, 1, 0, 1, 2, 1];
        let (mut pacer, state) = sim_pacer::<3>();
        let mut slot = presented_order[0];
        for &next in &presented_order[1..] {
            // Recording on `slot` is only legal once its last submission
            // has retired.
            assert!(pacer.marker(slot) <= state.completed.get());
            pacer.finish_frame(slot).unwrap();
            slot = next;
            pacer.acquire_slot(slot).unwrap();
            assert!(state.completed.get() >= pacer.marker(slot));
        }
    }
}
