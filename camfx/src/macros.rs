#[cfg(feature = "tracing")]
macro_rules! fx_trace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "camfx", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! fx_trace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! fx_debug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "camfx", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! fx_debug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! fx_warn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "camfx", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! fx_warn {
    ($($tt:tt)*) => {};
}
