pub mod domain;
pub mod grpc;
pub mod order;
pub mod outbox_publisher;
pub mod repo;
pub mod settings;
pub mod stock;
