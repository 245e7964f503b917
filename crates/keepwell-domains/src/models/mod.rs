pub mod cluster;
pub mod cluster_membership;
pub mod processing_job;
pub mod shared_content;
pub mod user;
pub mod user_content_save;

pub use cluster::Cluster;
pub use cluster_membership::ClusterMembership;
pub use processing_job::ProcessingJob;
pub use shared_content::SharedContent;
pub use user::User;
pub use user_content_save::UserContentSave;
