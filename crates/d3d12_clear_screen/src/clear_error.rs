pub type AppResult<T, E = AppReport> = core::result::Result<T, E>;

pub struct AppReport {
    inner: eyre::Report,
}

impl From<eyre::Report> for AppReport {
    fn from(report: eyre::Report) -> Self {
        Self { inner: report }
    }
}

impl std::fmt::Display for AppReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl std::fmt::Debug for AppReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl From<windows::core::Error> for AppReport {
    fn from(error: windows::core::Error) -> Self {
        Self {
            inner: eyre::Report::new(Win32Error::from(error)),
        }
    }
}

pub struct Win32Error {
    inner: windows::core::Error,
}

impl From<windows::core::Error> for Win32Error {
    fn from(error: windows::core::Error) -> Self {
        Self { inner: error }
    }
}

impl std::error::Error for Win32Error {}

impl std::fmt::Display for Win32Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::fmt::Debug for Win32Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
