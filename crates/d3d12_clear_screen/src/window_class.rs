use windows::core::PCWSTR;
use windows::Win32::Foundation::*;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::clear_error::AppResult;

/// Behaviour attached to a registered window class. A pointer to the
/// implementing value is stored in `GWLP_USERDATA` at `WM_CREATE`, so it
/// must outlive the window it is bound to.
pub trait WindowClass {
    const ID: PCWSTR;

    /// Handles one message. Returning false falls through to `DefWindowProc`.
    fn handle(&mut self, message: u32, wparam: WPARAM) -> bool;
}

pub fn create_window_class_struct<W: WindowClass>(instance: HMODULE) -> AppResult<WNDCLASSEXW> {
    // WNDCLASSEXW - https://learn.microsoft.com/en-us/windows/win32/api/winuser/ns-winuser-wndclassexw
    let wc = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wndproc::<W>),
        hInstance: instance.into(),
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW)? },
        lpszClassName: W::ID,
        ..Default::default()
    };
    Ok(wc)
}

pub fn register_window_class(class: &WNDCLASSEXW) -> AppResult<u16> {
    let atom = unsafe { RegisterClassExW(class) };
    if atom == 0 {
        return Err(windows::core::Error::from_win32().into());
    }
    Ok(atom)
}

// The wndproc runs inside a foreign callback; a panic must not unwind
// across the OS frame.
fn safe_window_message<W: WindowClass>(behaviour: &mut W, message: u32, wparam: WPARAM) -> bool {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        behaviour.handle(message, wparam)
    }))
    .unwrap_or(false)
}

extern "system" fn wndproc<W: WindowClass>(
    window: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if message == WM_CREATE {
        unsafe {
            let create_struct: &CREATESTRUCTW = &*(lparam.0 as *const CREATESTRUCTW);
            SetWindowLongPtrW(window, GWLP_USERDATA, create_struct.lpCreateParams as _);
        }
        return LRESULT(0);
    }

    let user_data = unsafe { GetWindowLongPtrW(window, GWLP_USERDATA) };
    if user_data == 0 {
        // We can get messages before WM_CREATE or after WM_DESTROY.
        return unsafe { DefWindowProcW(window, message, wparam, lparam) };
    }

    let behaviour = std::ptr::NonNull::<W>::new(user_data as *mut W);

    let handled = if let Some(mut b) = behaviour {
        match message {
            WM_DESTROY => {
                unsafe { PostQuitMessage(0) };
                true
            }
            _ => safe_window_message(unsafe { b.as_mut() }, message, wparam),
        }
    } else {
        false
    };

    if handled {
        LRESULT(0)
    } else {
        unsafe { DefWindowProcW(window, message, wparam, lparam) }
    }
}
