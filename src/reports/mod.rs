pub mod aggregate;
pub mod commissions;
pub mod export_xlsx;

pub use aggregate::{aggregate, select_sessions, ReportFilter, ReportTotals};
pub use commissions::{
    commission_rows, commission_totals, sale_years, CommissionFilter, CommissionRow,
    CommissionTotals,
};
pub use export_xlsx::report_workbook;
