//! SQLite implementations of the storage traits

pub mod income_repository;
pub mod subscription_repository;
pub mod user_repository;

pub use income_repository::IncomeRepository;
pub use subscription_repository::SubscriptionRepository;
pub use user_repository::UserRepository;
