pub mod comment;
pub mod commitment;
pub mod geo;
pub mod notification;
pub mod pin;
pub mod proposal;
pub mod rate_limit;
pub mod review;
pub mod user;

pub use comment::{CreatePinComment, PinComment};
pub use commitment::{CommitOutcome, Commitment, CommittedUser};
pub use geo::Coordinates;
pub use notification::Notification;
pub use pin::{CreatePin, Pin, PinCreatedResponse, PinType};
pub use proposal::{CreateProposal, Proposal, ProposalStatus, ProposalSummary};
pub use rate_limit::{RateLimitCounter, RateLimitDecision, ACTION_CREATE_PIN};
pub use review::{CreateSafetyReview, SafetyReview};
pub use user::{CreateUserRequest, LoginRequest, User};
