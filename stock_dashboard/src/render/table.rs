//! DataFrame previews as HTML tables

use crate::error::Result;
use polars::prelude::{AnyValue, DataFrame};

/// Escape text for HTML element content
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn cell(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float64(v) => format!("{:.4}", v),
        AnyValue::Float32(v) => format!("{:.4}", v),
        other => other.to_string(),
    }
}

/// Render every row of `df` with its column names as header
pub fn html_table(df: &DataFrame) -> Result<String> {
    let mut html = String::from("<table class=\"preview\">\n<thead><tr>");
    for name in df.get_column_names() {
        html.push_str(&format!("<th>{}</th>", escape(name.as_str())));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in 0..df.height() {
        html.push_str("<tr>");
        for column in df.get_columns() {
            let value = column.get(row)?;
            html.push_str(&format!("<td>{}</td>", escape(&cell(&value))));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    Ok(html)
}
