//! Companies-created-per-day histogram from a CRM company export, after
//! dropping placeholder and test-automation accounts.

pub mod daily;
pub mod filter;

pub use daily::{daily_counts, DailySummary};
pub use filter::{
    created_since, drop_blank_names, drop_containing, drop_excluded_names, load_companies,
    parse_dates, CompanyFilterReport, CompanyRecord, DatedCompany,
};
