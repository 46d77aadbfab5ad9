/// Flags accepted on the command line.
#[derive(Clone, Debug)]
pub struct LaunchOptions {
    /// Use the WARP software rasterizer instead of a hardware adapter.
    pub use_warp: bool,
    /// Lock presents to the vertical refresh. Off means present immediately,
    /// with tearing when the display stack allows it.
    pub vsync: bool,
}

pub fn build_launch_options() -> LaunchOptions {
    parse_launch_options(std::env::args())
}

fn parse_launch_options(args: impl Iterator<Item = String>) -> LaunchOptions {
    let mut use_warp = false;
    let mut vsync = true;

    for arg in args {
        if arg.eq_ignore_ascii_case("-warp") || arg.eq_ignore_ascii_case("/warp") {
            use_warp = true;
        } else if arg.eq_ignore_ascii_case("-no-vsync") || arg.eq_ignore_ascii_case("/no-vsync") {
            vsync = false;
        }
    }

    LaunchOptions { use_warp, vsync }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_vsynced_hardware_rendering() {
        let options = parse_launch_options(["clear_screen.exe".to_string()].into_iter());
        assert!(!options.use_warp);
        assert!(options.vsync);
    }

    #[test]
    fn flags_accept_either_prefix_in_any_case() {
        let options =
            parse_launch_options(["exe", "/WARP", "-No-Vsync"].map(String::from).into_iter());
        assert!(options.use_warp);
        assert!(!options.vsync);
    }
}
