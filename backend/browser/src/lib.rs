pub mod browser;
pub mod detail;

pub use browser::RecordBrowser;
pub use detail::{DetailField, DetailSection, RecordDetail, SectionBody};
