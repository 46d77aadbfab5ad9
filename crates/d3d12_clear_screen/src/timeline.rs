use frame_pacer::GpuTimeline;
use windows::core::Result;
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Graphics::Direct3D12::ID3D12CommandQueue;
use windows::Win32::Graphics::Direct3D12::ID3D12Fence;
use windows::Win32::System::Threading::WaitForSingleObjectEx;
use windows::Win32::System::Threading::INFINITE;

/// Fence-backed progress channel over a direct command queue. Owns the
/// auto-reset event used for blocking waits and closes it on drop.
pub struct D3d12Timeline {
    command_queue: ID3D12CommandQueue,
    fence: ID3D12Fence,
    wait_event: HANDLE,
}

impl D3d12Timeline {
    pub fn new(command_queue: ID3D12CommandQueue, fence: ID3D12Fence, wait_event: HANDLE) -> Self {
        Self {
            command_queue,
            fence,
            wait_event,
        }
    }
}

impl GpuTimeline for D3d12Timeline {
    type Error = windows::core::Error;

    fn enqueue_signal(&mut self, value: u64) -> Result<()> {
        unsafe { self.command_queue.Signal(&self.fence, value) }
    }

    fn completed_value(&self) -> u64 {
        unsafe { self.fence.GetCompletedValue() }
    }

    fn block_until(&self, value: u64) -> Result<()> {
        unsafe {
            self.fence.SetEventOnCompletion(value, self.wait_event)?;
            WaitForSingleObjectEx(self.wait_event, INFINITE, false);
        }
        Ok(())
    }
}

impl Drop for D3d12Timeline {
    fn drop(&mut self) {
        if !self.wait_event.is_invalid() {
            unsafe { _ = CloseHandle(self.wait_event) };
        }
    }
}
