//! Test-only package; the actual tests live under `tests/`.
