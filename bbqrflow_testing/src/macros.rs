//! Assertion macros shared by integration tests.

/// Await a future under a five second timeout, panicking with the call
/// site on expiry.
#[macro_export]
macro_rules! within {
    ($fut:expr) => {{
        ::tokio::time::timeout(::std::time::Duration::from_secs(5), $fut)
            .await
            .expect(concat!("timed out at ", file!(), ":", line!()))
    }};
    ($fut:expr, $msg:expr) => {{
        let m = ::std::format!("{msg} timed out at {}:{}", file!(), line!(), msg = $msg);
        ::tokio::time::timeout(::std::time::Duration::from_secs(5), $fut)
            .await
            .expect(&m)
    }};
}

pub use crate::within;
