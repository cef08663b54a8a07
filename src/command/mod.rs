mod check;
mod config;
mod repo;

pub use check::run_check;
pub use config::run_config;
pub use repo::run_repo;
