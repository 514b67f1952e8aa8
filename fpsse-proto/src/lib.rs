//! Generated gRPC types and service stubs for the forward-private SSE wire
//! contract. See `proto/fpsse.proto` for the IDL this crate compiles.

tonic::include_proto!("fpsse");
