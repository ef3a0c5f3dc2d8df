//! Data models for the toolkit server

pub mod category;
pub mod enums;
pub mod loan;
pub mod pagination;
pub mod toolkit;
pub mod user;

// Re-export commonly used types
pub use category::{Category, CategoryNode};
pub use enums::{LoanStatus, Role, ToolkitCondition, ToolkitStatus};
pub use loan::{Loan, LoanDetails};
pub use pagination::{PageRequest, Paginated, Pagination};
pub use toolkit::{Toolkit, ToolkitShort};
pub use user::{User, UserClaims, UserShort};
