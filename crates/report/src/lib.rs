pub mod aggregate;
pub mod parse;
pub mod session;

pub use aggregate::{aggregate, BreakdownEntry, DailyPoint, MonthlyPoint, Summary};
pub use parse::{parse_report, ParseError};
pub use session::{LoadSession, LoadTicket, StaleLoad};
