//! Crate-internal logging macros.
//!
//! Every level macro routes through [`log_event!`]. With the `tracing` feature enabled the call is
//! forwarded to `tracing` under the `address_scanner` target; without it the field expressions are
//! borrowed and dropped so call sites compile identically and cost nothing.
//!
//! Supported call shape: `level!(field = value, field = %value, field = ?value, "message")`.

macro_rules! log_event {
    ($level:ident, $($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        tracing::$level!(target: "address_scanner", $($arg)*);
        #[cfg(not(feature = "tracing"))]
        __discard_fields!($($arg)*);
    }};
}

#[allow(unused_macros)]
macro_rules! __discard_fields {
    ($field:ident = % $value:expr, $($rest:tt)*) => {{
        let _ = &$value;
        __discard_fields!($($rest)*);
    }};
    ($field:ident = ? $value:expr, $($rest:tt)*) => {{
        let _ = &$value;
        __discard_fields!($($rest)*);
    }};
    ($field:ident = $value:expr, $($rest:tt)*) => {{
        let _ = &$value;
        __discard_fields!($($rest)*);
    }};
    ($message:literal) => {};
    () => {};
}

#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)*) => { log_event!(error, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! warn {
    ($($arg:tt)*) => { log_event!(warn, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! info {
    ($($arg:tt)*) => { log_event!(info, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => { log_event!(debug, $($arg)*) };
}

#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => { log_event!(trace, $($arg)*) };
}
