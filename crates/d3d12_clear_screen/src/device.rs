use tracing::info;
use tracing::warn;
use windows::core::Result;
use windows::Win32::Graphics::Direct3D::D3D_FEATURE_LEVEL_11_0;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;

use crate::adapter::select_hardware_adapter;

pub fn create_device(use_warp: bool) -> Result<(IDXGIFactory4, ID3D12Device)> {
    let mut factory_flags = DXGI_CREATE_FACTORY_FLAGS(0);
    if cfg!(debug_assertions) {
        unsafe {
            let mut debug: Option<ID3D12Debug> = None;
            if let Some(debug) = D3D12GetDebugInterface(&mut debug).ok().and(debug) {
                debug.EnableDebugLayer();
                factory_flags |= DXGI_CREATE_FACTORY_DEBUG;
                info!("d3d12 debug layer enabled");
            } else {
                warn!("d3d12 debug layer unavailable");
            }
        }
    }

    let dxgi_factory: IDXGIFactory4 = unsafe { CreateDXGIFactory2(factory_flags) }?;

    let adapter = if use_warp {
        info!("using the WARP adapter");
        unsafe { dxgi_factory.EnumWarpAdapter()? }
    } else {
        select_hardware_adapter(&dxgi_factory)?
    };

    let mut device: Option<ID3D12Device> = None;
    unsafe { D3D12CreateDevice(&adapter, D3D_FEATURE_LEVEL_11_0, &mut device) }?;
    Ok((dxgi_factory, device.unwrap()))
}
