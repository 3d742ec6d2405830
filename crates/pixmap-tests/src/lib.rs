//! Integration tests for pixmap crates.
//!
//! End-to-end checks that cross crate boundaries: buffers built and
//! transformed with `pixmap-ops`, carried through `pixmap-wire`, and
//! inspected with `pixmap-core`.
