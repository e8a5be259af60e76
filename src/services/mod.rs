pub mod fetcher;
pub mod follow_service;
pub mod ingestor;
pub mod scheduler;
pub mod task;

pub use fetcher::Fetcher;
pub use follow_service::FollowService;
pub use scheduler::Scheduler;
