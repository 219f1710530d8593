//! markwise-report — results export.
//!
//! Renders graded results as the marker-facing CSV spreadsheet or a
//! self-contained HTML page.

pub mod csv;
pub mod html;

pub use csv::{results_csv_string, write_results_csv};
pub use html::{render_html_results, write_html_results};
