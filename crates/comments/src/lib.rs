pub mod domain;
pub mod grpc;
pub mod repo;
pub mod service;
pub mod settings;
