pub mod event_repo;
pub use event_repo::EventRepository;
pub mod lodge_repo;
pub use lodge_repo::LodgeRepository;
pub mod request_repo;
pub use request_repo::RequestRepository;
pub mod setup_repo;
pub use setup_repo::{ProfessionRepository, SetupRepository};
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod workflow_store;
pub use workflow_store::PgWorkflowStore;
