//! Integration tests over real sockets and processes

mod emitter_tests;
mod endpoint_tests;
mod loki_tests;
