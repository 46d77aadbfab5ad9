use windows::core::PCWSTR;
use windows::Win32::Foundation::*;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::clear_error::AppResult;
use crate::window_class::WindowClass;

pub fn create_window<W: WindowClass>(
    our_module: HMODULE,
    window_rect: RECT,
    title: PCWSTR,
    behaviour: &mut W,
) -> AppResult<HWND> {
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            W::ID,
            title,
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            window_rect.right - window_rect.left,
            window_rect.bottom - window_rect.top,
            None,                    // no parent window
            None,                    // no menus
            Some(our_module.into()),
            Some(behaviour as *mut W as _),
        )
    }?;
    Ok(hwnd)
}
