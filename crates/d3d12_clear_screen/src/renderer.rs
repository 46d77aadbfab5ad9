use std::mem::ManuallyDrop;

use frame_pacer::FramePacer;
use tracing::debug;
use tracing::info;
use windows::core::Interface;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::Win32::System::Threading::CreateEventA;

use crate::clear_error::AppResult;
use crate::launch_options::LaunchOptions;
use crate::swap_chain;
use crate::timeline::D3d12Timeline;

/// Back buffers cycling through the swap chain: while one is on screen,
/// the other two can be recorded into or in flight.
pub const FRAME_COUNT: usize = 3;

/// Steel blue. The only thing this sample draws.
const CLEAR_COLOR: [f32; 4] = [0.4, 0.6, 0.9, 1.0];

/// How finished frames are handed to the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentMode {
    /// Wait for the vertical refresh.
    VsyncLocked,
    /// Present immediately, tearing if the display stack allows it.
    Immediate { allow_tearing: bool },
}

/// Everything the render loop touches, owned in one place and passed by
/// reference; no process-wide state.
pub struct Renderer {
    command_queue: ID3D12CommandQueue,
    swap_chain: IDXGISwapChain3,
    frame_index: usize,
    render_targets: [ID3D12Resource; FRAME_COUNT],
    rtv_heap: ID3D12DescriptorHeap,
    rtv_descriptor_size: u32,
    command_allocators: [ID3D12CommandAllocator; FRAME_COUNT],
    command_list: ID3D12GraphicsCommandList,
    pacer: FramePacer<D3d12Timeline, FRAME_COUNT>,
    present_mode: PresentMode,
}

impl Renderer {
    pub fn bind_to_window(
        device: &ID3D12Device,
        factory: &IDXGIFactory4,
        hwnd: &HWND,
        window_size: (u32, u32),
        options: &LaunchOptions,
    ) -> AppResult<Self> {
        let command_queue: ID3D12CommandQueue = unsafe {
            device.CreateCommandQueue(&D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                ..Default::default()
            })?
        };

        let tearing = swap_chain::tearing_supported(factory);
        let present_mode = if options.vsync {
            PresentMode::VsyncLocked
        } else {
            PresentMode::Immediate {
                allow_tearing: tearing,
            }
        };

        let swap_chain =
            swap_chain::create_swap_chain(factory, &command_queue, hwnd, window_size, tearing)?;
        let frame_index = unsafe { swap_chain.GetCurrentBackBufferIndex() } as usize;

        let rtv_heap: ID3D12DescriptorHeap = unsafe {
            device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
                NumDescriptors: FRAME_COUNT as u32,
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
                ..Default::default()
            })?
        };
        let rtv_descriptor_size =
            unsafe { device.GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_RTV) };
        let rtv_base = unsafe { rtv_heap.GetCPUDescriptorHandleForHeapStart() };

        let render_targets: [ID3D12Resource; FRAME_COUNT] =
            array_init::try_array_init(|i| -> windows::core::Result<ID3D12Resource> {
                let buffer: ID3D12Resource = unsafe { swap_chain.GetBuffer(i as u32)? };
                let rtv_handle = D3D12_CPU_DESCRIPTOR_HANDLE {
                    ptr: rtv_base.ptr + i * rtv_descriptor_size as usize,
                };
                unsafe { device.CreateRenderTargetView(&buffer, None, rtv_handle) };
                Ok(buffer)
            })?;

        let command_allocators: [ID3D12CommandAllocator; FRAME_COUNT] =
            array_init::try_array_init(|_| unsafe {
                device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)
            })?;

        // No pipeline state: the only recorded work is a clear between two
        // barriers.
        let command_list: ID3D12GraphicsCommandList = unsafe {
            device.CreateCommandList(
                0,
                D3D12_COMMAND_LIST_TYPE_DIRECT,
                &command_allocators[frame_index],
                None::<&ID3D12PipelineState>,
            )?
        };
        // Created open; the render loop expects to start with a Reset.
        unsafe { command_list.Close()? };

        let fence: ID3D12Fence = unsafe { device.CreateFence(0, D3D12_FENCE_FLAG_NONE)? };
        let wait_event = unsafe { CreateEventA(None, false, false, None)? };
        let mut pacer =
            FramePacer::new(D3d12Timeline::new(command_queue.clone(), fence, wait_event));

        // Let setup work retire before the first frame records.
        pacer.flush()?;

        info!(?present_mode, frame_index, "renderer bound to window");

        Ok(Self {
            command_queue,
            swap_chain,
            frame_index,
            render_targets,
            rtv_heap,
            rtv_descriptor_size,
            command_allocators,
            command_list,
            pacer,
            present_mode,
        })
    }

    /// Records and submits one frame, presents it, then moves to whichever
    /// slot the surface reports next, stalling only if that slot's previous
    /// work has not retired.
    pub fn render(&mut self) -> AppResult<()> {
        self.record_clear()?;

        let command_lists = [Some(self.command_list.cast::<ID3D12CommandList>()?)];
        unsafe { self.command_queue.ExecuteCommandLists(&command_lists) };

        let (sync_interval, flags) = match self.present_mode {
            PresentMode::VsyncLocked => (1, DXGI_PRESENT(0)),
            PresentMode::Immediate {
                allow_tearing: true,
            } => (0, DXGI_PRESENT_ALLOW_TEARING),
            PresentMode::Immediate {
                allow_tearing: false,
            } => (0, DXGI_PRESENT(0)),
        };
        unsafe { self.swap_chain.Present(sync_interval, flags) }.ok()?;

        self.pacer.finish_frame(self.frame_index)?;

        // The flip model may hand buffers back out of order; trust the
        // surface's index, never a round-robin increment.
        self.frame_index = unsafe { self.swap_chain.GetCurrentBackBufferIndex() } as usize;
        self.pacer.acquire_slot(self.frame_index)?;

        Ok(())
    }

    fn record_clear(&mut self) -> AppResult<()> {
        // acquire_slot at the end of the previous iteration guarantees this
        // allocator's commands have retired.
        let command_allocator = &self.command_allocators[self.frame_index];
        unsafe { command_allocator.Reset()? };

        let command_list = &self.command_list;
        unsafe { command_list.Reset(command_allocator, None::<&ID3D12PipelineState>)? };

        unsafe {
            command_list.ResourceBarrier(&[transition_barrier(
                &self.render_targets[self.frame_index],
                D3D12_RESOURCE_STATE_PRESENT,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
            )])
        };

        let rtv_handle = D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: unsafe { self.rtv_heap.GetCPUDescriptorHandleForHeapStart() }.ptr
                + self.frame_index * self.rtv_descriptor_size as usize,
        };

        unsafe {
            command_list.ClearRenderTargetView(rtv_handle, &CLEAR_COLOR, None);
            command_list.ResourceBarrier(&[transition_barrier(
                &self.render_targets[self.frame_index],
                D3D12_RESOURCE_STATE_RENDER_TARGET,
                D3D12_RESOURCE_STATE_PRESENT,
            )]);
        }

        unsafe { command_list.Close()? };
        Ok(())
    }

    /// Blocks until all submitted work has retired. Called before teardown
    /// so the GPU never executes against released buffers.
    pub fn drain(&mut self) -> AppResult<()> {
        self.pacer.flush()?;
        debug!(last_signaled = self.pacer.last_signaled(), "gpu drained");
        Ok(())
    }
}

fn transition_barrier(
    resource: &ID3D12Resource,
    state_before: D3D12_RESOURCE_STATES,
    state_after: D3D12_RESOURCE_STATES,
) -> D3D12_RESOURCE_BARRIER {
    D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: D3D12_RESOURCE_BARRIER_0 {
            // ManuallyDrop keeps the union field from dropping the resource
            // reference it does not own.
            Transition: ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: unsafe { std::mem::transmute_copy(resource) },
                StateBefore: state_before,
                StateAfter: state_after,
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
            }),
        },
    }
}
