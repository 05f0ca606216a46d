mod auth_tests;
mod business_tests;
mod call_mode_tests;
mod commissions_tests;
mod events_tests;
mod reports_tests;
