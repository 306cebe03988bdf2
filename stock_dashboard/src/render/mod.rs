//! Charts, tables and the HTML page

pub mod forecast;
pub mod page;
pub mod series;
pub mod table;

pub use forecast::{components_chart, forecast_chart};
pub use page::{failure_page, success_page};
pub use series::series_chart;
pub use table::html_table;
