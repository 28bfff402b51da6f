//! Crate-local logging macros.
//!
//! The driver logs through `defmt` on embedded targets (`defmt` feature),
//! through the `log` crate on hosted targets (`log` feature), and through
//! plain `println!`/`eprintln!` inside the crate's own unit tests. With no
//! feature enabled outside of tests the macros compile to nothing.
//!
//! Format strings stay within the subset both `defmt` and `core::fmt`
//! accept (`{}` and simple hints like `{:02x}`).

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!($($arg)*);
        #[cfg(all(not(feature = "defmt"), feature = "log"))]
        ::log::trace!($($arg)*);
        #[cfg(all(not(feature = "defmt"), not(feature = "log"), test))]
        println!("[TRACE] {}", format!($($arg)*));
        #[cfg(all(not(feature = "defmt"), not(feature = "log"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);
        #[cfg(all(not(feature = "defmt"), feature = "log"))]
        ::log::debug!($($arg)*);
        #[cfg(all(not(feature = "defmt"), not(feature = "log"), test))]
        println!("[DEBUG] {}", format!($($arg)*));
        #[cfg(all(not(feature = "defmt"), not(feature = "log"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);
        #[cfg(all(not(feature = "defmt"), feature = "log"))]
        ::log::info!($($arg)*);
        #[cfg(all(not(feature = "defmt"), not(feature = "log"), test))]
        println!("[INFO] {}", format!($($arg)*));
        #[cfg(all(not(feature = "defmt"), not(feature = "log"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);
        #[cfg(all(not(feature = "defmt"), feature = "log"))]
        ::log::warn!($($arg)*);
        #[cfg(all(not(feature = "defmt"), not(feature = "log"), test))]
        println!("[WARN] {}", format!($($arg)*));
        #[cfg(all(not(feature = "defmt"), not(feature = "log"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);
        #[cfg(all(not(feature = "defmt"), feature = "log"))]
        ::log::error!($($arg)*);
        #[cfg(all(not(feature = "defmt"), not(feature = "log"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));
        #[cfg(all(not(feature = "defmt"), not(feature = "log"), not(test)))]
        { let _ = ($($arg)*,); }
    }};
}
