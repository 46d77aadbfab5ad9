//! Minimal Direct3D 12 setup: pick an adapter, create a device and swap
//! chain, and clear the screen every frame, pacing the CPU against the GPU
//! with a fence over a ring of three frame slots.

#[cfg(windows)]
mod adapter;
#[cfg(windows)]
mod clear_error;
#[cfg(windows)]
mod clear_window;
#[cfg(windows)]
mod create_window;
#[cfg(windows)]
mod device;
#[cfg(windows)]
mod launch_options;
#[cfg(windows)]
mod renderer;
#[cfg(windows)]
mod swap_chain;
#[cfg(windows)]
mod timeline;
#[cfg(windows)]
mod window_class;

#[cfg(windows)]
fn main() -> clear_error::AppResult<()> {
    use clear_window::ClearScreenWindow;
    use create_window::create_window;
    use device::create_device;
    use launch_options::build_launch_options;
    use renderer::Renderer;
    use tracing::info;
    use window_class::create_window_class_struct;
    use window_class::register_window_class;
    use windows::core::w;
    use windows::Win32::Foundation::RECT;
    use windows::Win32::UI::WindowsAndMessaging::*;

    color_eyre::install()?;
    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_target(false)
        .init();

    let options = build_launch_options();
    info!(
        use_warp = options.use_warp,
        vsync = options.vsync,
        "starting the clear-screen sample"
    );

    let our_module = current_process_module()?;

    let window_class = create_window_class_struct::<ClearScreenWindow>(our_module)?;
    register_window_class(&window_class)?;

    let window_size = (1280u32, 720u32);
    let mut window_rect = RECT {
        left: 0,
        top: 0,
        right: window_size.0 as i32,
        bottom: window_size.1 as i32,
    };
    // Grow the rectangle so the client area, not the whole window, gets the
    // requested size.
    unsafe { AdjustWindowRect(&mut window_rect, WS_OVERLAPPEDWINDOW, false)? };

    let title = match options.use_warp {
        true => w!("D3D12 Clear Screen (WARP)"),
        false => w!("D3D12 Clear Screen"),
    };

    // Must outlive the window: the wndproc keeps a pointer to it.
    let mut window = ClearScreenWindow::default();
    let hwnd = create_window::<ClearScreenWindow>(our_module, window_rect, title, &mut window)?;

    let (dxgi_factory, device) = create_device(options.use_warp)?;
    let mut renderer =
        Renderer::bind_to_window(&device, &dxgi_factory, &hwnd, window_size, &options)?;

    unsafe { _ = ShowWindow(hwnd, SW_SHOW) };

    let mut done = false;
    while !done {
        let mut message = MSG::default();

        if unsafe { PeekMessageA(&mut message, None, 0, 0, PM_REMOVE) }.into() {
            unsafe {
                _ = TranslateMessage(&message);
                DispatchMessageA(&message);
            }

            if message.message == WM_QUIT {
                done = true;
            }
        } else {
            // Render when idle. A failed submit or present leaves the device
            // in an unknown state; give up rather than retry.
            renderer.render()?;
        }
    }

    renderer.drain()?;
    info!("clear-screen sample finished");
    Ok(())
}

#[cfg(windows)]
fn current_process_module() -> clear_error::AppResult<windows::Win32::Foundation::HMODULE> {
    use windows::Win32::System::LibraryLoader::GetModuleHandleExW;

    let mut module = Default::default();
    unsafe { GetModuleHandleExW(Default::default(), None, &mut module)? };
    Ok(module)
}

#[cfg(not(windows))]
fn main() {
    eprintln!("d3d12_clear_screen drives DXGI and Direct3D 12; it only runs on Windows.");
    std::process::exit(1);
}
