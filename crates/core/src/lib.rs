pub mod brand;
pub mod money;
pub mod order;

pub use brand::{classify_brand, OTHER_BRAND};
pub use money::Money;
pub use order::{FilterCriteria, FilterOptions, ServiceOrder};
