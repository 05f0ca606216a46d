pub mod business;
pub mod call_mode;
pub mod commissions;
pub mod login;
pub mod reports;

pub use business::{business_page, BusinessPageVm, BusinessRow};
pub use call_mode::{call_screen, summary_page, CallScreenVm};
pub use commissions::{commissions_page, CommissionQuery, CommissionsVm};
pub use login::login_page;
pub use reports::{reports_page, ReportQuery, ReportsVm};
