pub mod assignment;
pub mod cleanup;
pub mod lifecycle;
pub mod lock;
pub mod scoring;
