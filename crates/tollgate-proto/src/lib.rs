//! Tollgate Proto - gRPC Protocol Buffers
//!
//! Generated code from the `tollgate.v1` Protocol Buffer definitions.
//!
//! # Example
//!
//! ```ignore
//! use tollgate_proto::auth_service::auth_service_client::AuthServiceClient;
//! use tollgate_proto::LoginRequest;
//!
//! let mut client = AuthServiceClient::connect("http://localhost:50051").await?;
//! let response = client.login(LoginRequest {
//!     email: "a@x.com".to_string(),
//!     password: "pass1".to_string(),
//! }).await?;
//! ```

// Suppress clippy warnings from generated tonic code
#![allow(clippy::derive_partial_eq_without_eq)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::too_many_lines)]

/// Tollgate v1 API types and services.
pub mod tollgate {
    pub mod v1 {
        tonic::include_proto!("tollgate.v1");

        /// File descriptor set for gRPC reflection.
        pub const FILE_DESCRIPTOR_SET: &[u8] =
            tonic::include_file_descriptor_set!("tollgate_descriptor");
    }
}

pub use tollgate::v1::*;

pub mod auth_service {
    pub use super::tollgate::v1::auth_service_client;
    pub use super::tollgate::v1::auth_service_server;
}
