use tracing::info;
use windows::core::Error;
use windows::core::Result;
use windows::Win32::Graphics::Direct3D::D3D_FEATURE_LEVEL_11_0;
use windows::Win32::Graphics::Direct3D12::D3D12CreateDevice;
use windows::Win32::Graphics::Direct3D12::ID3D12Device;
use windows::Win32::Graphics::Dxgi::*;

/// Picks the hardware adapter with the most dedicated video memory among
/// those that validate against Direct3D 12 feature level 11.0.
pub fn select_hardware_adapter(factory: &IDXGIFactory4) -> Result<IDXGIAdapter1> {
    let mut best: Option<(IDXGIAdapter1, usize)> = None;

    for i in 0.. {
        let adapter = match unsafe { factory.EnumAdapters1(i) } {
            Ok(a) => a,
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break, // No more adapters
            Err(e) => return Err(e),
        };

        let desc = unsafe { adapter.GetDesc1()? };
        let name = String::from_utf16_lossy(&desc.Description);
        let name = name.trim_end_matches('\0');

        if (DXGI_ADAPTER_FLAG(desc.Flags as i32) & DXGI_ADAPTER_FLAG_SOFTWARE)
            != DXGI_ADAPTER_FLAG_NONE
        {
            info!(adapter = %name, "skipping software adapter");
            continue;
        }

        // A null device request validates feature-level support without
        // actually creating a device.
        if unsafe {
            D3D12CreateDevice(
                &adapter,
                D3D_FEATURE_LEVEL_11_0,
                std::ptr::null_mut::<Option<ID3D12Device>>(),
            )
        }
        .is_err()
        {
            info!(adapter = %name, "adapter does not support feature level 11.0");
            continue;
        }

        let memory = desc.DedicatedVideoMemory;
        info!(adapter = %name, dedicated_video_memory = memory, "usable adapter");
        if best.as_ref().map_or(true, |(_, most)| memory > *most) {
            best = Some((adapter, memory));
        }
    }

    best.map(|(adapter, _)| adapter).ok_or_else(|| {
        Error::new(
            DXGI_ERROR_NOT_FOUND,
            "no hardware adapter supports Direct3D 12 feature level 11.0",
        )
    })
}
