pub mod business;
pub mod call_session;
pub mod datetime;
pub mod directory;
pub mod lead;
pub mod outcome;
pub mod queue;
pub mod sale;
pub mod scope;

pub use business::{Business, BusinessStatus, LeadSource, NewBusiness, StatusUpdate};
pub use call_session::{CallCounters, CallModeSession, CallSessionPatch, NewCallSession};
pub use directory::{Development, Role, Team, User};
pub use lead::{Lead, LeadUpdate};
pub use outcome::{classify, AnswerResult, CallOutcome, NoAnswer, OutcomeToggles};
pub use sale::{Client, Sale, SaleStatus};
