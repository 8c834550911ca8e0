//! Process record storage backends

mod factory;
mod in_memory_repository;
mod redis_repository;

pub use factory::build_process_repository;
pub use in_memory_repository::InMemoryProcessRepository;
pub use redis_repository::{RedisProcessRepository, RedisProcessRepositoryConfig};
