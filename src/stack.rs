//! Dedicated stack for the recursive read and decode passes.
//!
//! Both passes recurse once per nesting level, and the depth limit only
//! holds if the stack can take that many frames. Callers may run on
//! threads with small stacks (test threads, rayon workers), so the work
//! moves to a scoped thread whose stack grows with the limit.

use std::io;
use std::thread;

/// Stack reserved per permitted nesting level. Unoptimized builds need
/// most of this for the large `match` frames of the decoder.
const STACK_PER_LEVEL: usize = 64 * 1024;

/// Stack reserved on top of the per-level share.
const BASE_STACK: usize = 1024 * 1024;

/// Stack size for a pass bounded by `max_depth`.
pub(crate) fn stack_size(max_depth: usize) -> usize {
    max_depth
        .saturating_mul(STACK_PER_LEVEL)
        .saturating_add(BASE_STACK)
}

/// Run `f` on a thread with room for `max_depth` nesting levels.
///
/// A panic in `f` resumes on the calling thread.
pub(crate) fn with_stack<T, F>(max_depth: usize, f: F) -> io::Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    thread::scope(|scope| {
        let handle = thread::Builder::new()
            .name("laurel-ion-decode".to_string())
            .stack_size(stack_size(max_depth))
            .spawn_scoped(scope, f)?;
        match handle.join() {
            Ok(value) => Ok(value),
            Err(payload) => std::panic::resume_unwind(payload),
        }
    })
}
