/*!
 * Lock guard tests entry point
 */

#[path = "guard/unique_lock_test.rs"]
mod unique_lock_test;

#[path = "guard/timed_guard_test.rs"]
mod timed_guard_test;
