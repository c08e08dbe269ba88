//! Instrumentation hooks for scans and searches.
//!
//! `enter_span!` opens and enters an info span, returning its guard.
//! `record!` emits an event at an explicit level. Without the `tracing`
//! feature both evaluate their field values and discard them.

#[cfg(feature = "tracing")]
macro_rules! enter_span {
    ($name:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info_span!($name $(, $key = $value)*).entered()
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! enter_span {
    ($name:literal $(, $key:ident = $value:expr)* $(,)?) => {{
        let _ = ($($value,)*);
        $crate::trace::Unentered
    }};
}

#[cfg(feature = "tracing")]
macro_rules! record {
    ($level:ident, $name:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::$level!(name: $name $(, $key = $value)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! record {
    ($level:ident, $name:literal $(, $key:ident = $value:expr)* $(,)?) => {{
        let _ = ($($value,)*);
    }};
}

pub(crate) use enter_span;
pub(crate) use record;

/// Guard returned by `enter_span!` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
#[must_use]
pub(crate) struct Unentered;
