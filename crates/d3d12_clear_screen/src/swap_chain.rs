use tracing::debug;
use windows::core::BOOL;
use windows::core::Interface;
use windows::core::Result;
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Direct3D12::ID3D12CommandQueue;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

use crate::renderer::FRAME_COUNT;

/// One-time capability query: can presents tear past the vertical refresh?
/// A factory that does not reach `IDXGIFactory5` cannot, and neither can a
/// driver that reports the feature unsupported.
pub fn tearing_supported(factory: &IDXGIFactory4) -> bool {
    let Ok(factory5) = factory.cast::<IDXGIFactory5>() else {
        return false;
    };

    let mut allow_tearing = BOOL::default();
    let queried = unsafe {
        factory5.CheckFeatureSupport(
            DXGI_FEATURE_PRESENT_ALLOW_TEARING,
            &mut allow_tearing as *mut BOOL as *mut core::ffi::c_void,
            std::mem::size_of::<BOOL>() as u32,
        )
    };
    queried.is_ok() && allow_tearing.as_bool()
}

pub fn create_swap_chain(
    factory: &IDXGIFactory4,
    command_queue: &ID3D12CommandQueue,
    hwnd: &HWND,
    (width, height): (u32, u32),
    allow_tearing: bool,
) -> Result<IDXGISwapChain3> {
    let desc = DXGI_SWAP_CHAIN_DESC1 {
        BufferCount: FRAME_COUNT as u32,
        Width: width,
        Height: height,
        Format: DXGI_FORMAT_R8G8B8A8_UNORM,
        BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
        SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        // The tearing flag must match the Present flags used later.
        Flags: if allow_tearing {
            DXGI_SWAP_CHAIN_FLAG_ALLOW_TEARING.0 as u32
        } else {
            0
        },
        ..Default::default()
    };

    let factory2: IDXGIFactory2 = factory.cast()?;
    let swap_chain: IDXGISwapChain1 =
        unsafe { factory2.CreateSwapChainForHwnd(command_queue, *hwnd, &desc, None, None)? };
    let swap_chain: IDXGISwapChain3 = swap_chain.cast()?;

    // Fullscreen transitions stay stubbed; keep DXGI from hooking Alt+Enter.
    unsafe { factory.MakeWindowAssociation(*hwnd, DXGI_MWA_NO_ALT_ENTER)? };

    debug!(buffers = FRAME_COUNT, allow_tearing, "swap chain created");
    Ok(swap_chain)
}
