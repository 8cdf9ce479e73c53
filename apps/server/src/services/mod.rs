pub mod comment;
pub mod commitment;
pub mod notification;
pub mod pin;
pub mod proposal;
pub mod rate_limit;
pub mod review;
pub mod users;

pub use comment::CommentService;
pub use commitment::CommitmentService;
pub use notification::NotificationService;
pub use pin::PinService;
pub use proposal::ProposalService;
pub use rate_limit::RateLimitService;
pub use review::ReviewService;
pub use users::UsersService;
