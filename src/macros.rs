#[macro_export]
macro_rules! err {
    ($fmt:expr) => {
        $crate::Error::Other(anyhow::anyhow!($fmt))
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::Error::Other(anyhow::anyhow!($fmt, $($arg)+))
    };
}

/// Builds an `Error::CorruptHeader` from a format string.
#[macro_export]
macro_rules! corrupt_header {
    ($fmt:expr) => {
        $crate::Error::CorruptHeader(format!($fmt))
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::Error::CorruptHeader(format!($fmt, $($arg)+))
    };
}
