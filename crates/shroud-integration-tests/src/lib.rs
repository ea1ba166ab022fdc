//! Integration test crate for blinded onion-message paths.
//!
//! This crate has no library code. Its tests build paths with
//! `shroud-blinding`, wrap the hop payloads in real onion packets with
//! `shroud-sphinx`, and walk them hop by hop.
//!
//! ```sh
//! cargo test -p shroud-integration-tests
//! ```
