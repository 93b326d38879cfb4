//! Lead AI Common Library
//!
//! CLIと将来のフロントエンドで共有される型とリード処理パイプライン
//! （フィルタ → ソート → ページ分割）

pub mod types;
pub mod error;
pub mod filter;
pub mod sort;
pub mod paginate;
pub mod row;
pub mod report;
pub mod export;

pub use types::{
    AnalysisReport, CompanySize, CrmState, CrmStatus, Lead, LeadTier, PrimaryContact, RemoteSync,
    SalesInsights, TechCategory, Verification, VerificationStatus,
};
pub use error::{Error, Result};
pub use filter::{filter_leads, filter_leads_at, CustomDateRange, DateAddedMode, FilterSpec};
pub use sort::{sort_leads, SortDirection, SortField, SortSpec};
pub use paginate::{paginate, total_pages, PageInfo, ITEMS_PER_PAGE};
pub use row::{Badge, LeadRow};
