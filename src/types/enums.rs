//! Shared enum types that map directly to Looker API string values.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::settings::ResponseEncoding;

// ---------------------------------------------------------------------------
// Result Format
// ---------------------------------------------------------------------------

/// Output format for running a look or query.
///
/// Used as the `{result_format}` path segment of the `run_*` endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResultFormat {
    /// Plain JSON rows.
    Json,
    /// JSON rows with field metadata.
    JsonDetail,
    /// JSON in the shape the Looker frontend uses.
    JsonFe,
    Csv,
    /// Tab-separated text.
    Txt,
    Html,
    /// Markdown table.
    Md,
    Xlsx,
    /// The generated SQL instead of results.
    Sql,
    Png,
    Jpg,
}

impl ResultFormat {
    /// Whether results in this format are binary rather than text.
    pub fn is_binary(self) -> bool {
        matches!(self, Self::Xlsx | Self::Png | Self::Jpg)
    }

    /// The response decoding hint matching this format.
    pub fn encoding(self) -> ResponseEncoding {
        if self.is_binary() {
            ResponseEncoding::Binary
        } else {
            ResponseEncoding::Utf8
        }
    }
}

// ---------------------------------------------------------------------------
// Render Format
// ---------------------------------------------------------------------------

/// Output format of a render task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RenderFormat {
    Png,
    Jpg,
    Pdf,
}

// ---------------------------------------------------------------------------
// Render Task Status
// ---------------------------------------------------------------------------

/// Lifecycle state of a render task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RenderTaskStatus {
    Enqueued,
    Rendering,
    Success,
    Failure,
    /// Any status this client does not know about yet.
    #[serde(other)]
    Unknown,
}

impl RenderTaskStatus {
    /// Whether the task has stopped, successfully or not.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_format_wire_names() {
        assert_eq!(ResultFormat::JsonDetail.to_string(), "json_detail");
        assert_eq!(ResultFormat::JsonFe.to_string(), "json_fe");
        assert_eq!(serde_json::to_string(&ResultFormat::Xlsx).unwrap(), "\"xlsx\"");
        assert_eq!("csv".parse::<ResultFormat>().unwrap(), ResultFormat::Csv);
    }

    #[test]
    fn binary_formats() {
        assert!(ResultFormat::Png.is_binary());
        assert_eq!(ResultFormat::Xlsx.encoding(), ResponseEncoding::Binary);
        assert_eq!(ResultFormat::Csv.encoding(), ResponseEncoding::Utf8);
    }

    #[test]
    fn unknown_render_status() {
        let status: RenderTaskStatus = serde_json::from_str("\"paused\"").unwrap();
        assert_eq!(status, RenderTaskStatus::Unknown);
        assert!(!status.is_finished());
        assert!(RenderTaskStatus::Failure.is_finished());
    }
}
