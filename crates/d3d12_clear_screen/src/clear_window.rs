use tracing::debug;
use windows::core::w;
use windows::core::PCWSTR;
use windows::Win32::Foundation::WPARAM;
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::window_class::WindowClass;

/// Message handling for the clear-screen window. Nothing here feeds back
/// into rendering; keys and size changes are observed and dropped.
#[derive(Default)]
pub struct ClearScreenWindow;

impl WindowClass for ClearScreenWindow {
    const ID: PCWSTR = w!("ClearScreenWindowClass");

    fn handle(&mut self, message: u32, wparam: WPARAM) -> bool {
        match message {
            WM_KEYDOWN => {
                debug!(key = wparam.0 as u8, "WM_KEYDOWN");
                true
            }
            WM_KEYUP => {
                debug!(key = wparam.0 as u8, "WM_KEYUP");
                true
            }
            WM_SIZE => {
                // Swap chain resizing is not wired up; the surface keeps its
                // creation size.
                false
            }
            WM_PAINT => {
                // The idle loop renders; DefWindowProc validates the region.
                false
            }
            _ => false,
        }
    }
}
