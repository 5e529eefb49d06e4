//! Stack growth for recursive tree walks.
//!
//! Frontends can hand us arbitrarily deep expression trees (long `a + b + ...`
//! chains, nested closures). Every recursive walk in the analyses goes
//! through [`ensure_sufficient_stack`].

/// Keep at least this much stack available before recursing.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
#[cfg(not(target_arch = "wasm32"))]
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than the red zone remains.
#[cfg(not(target_arch = "wasm32"))]
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; run `f` directly.
#[cfg(target_arch = "wasm32")]
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
