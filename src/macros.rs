#![allow(unused_macros)]

/// Helper macro for reading locked items
///
/// ```rust, ignore
///  let reader = read_lock!(self.reader).clone();
/// ```
macro_rules! read_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.read().expect("Failed to acquire read lock")
    };
}

/// Helper macro for writing to locked items
///
/// ```rust, ignore
///  *write_lock!(self.backend) = backend;
/// ```
macro_rules! write_lock {
    ($arc_rwlock:expr) => {
        $arc_rwlock.write().expect("Failed to acquire write lock")
    };
}
