//! Stack growth guard.
//!
//! The exemplar compiler recurses once per bracketed construct and the
//! engine recurses once per nested call argument or script function call.
//! Deeply nested scripts would otherwise overflow the native stack before
//! any depth limit in the engine is reached.
//!
//! Wrap each recursive step with [`ensure_sufficient_stack`]:
//!
//! ```text
//! fn compile_exemplar(&mut self, open: TapeCursor) -> Result<..., CompileError> {
//!     ensure_sufficient_stack(|| self.compile_exemplar_inner(open))
//! }
//! ```

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;
