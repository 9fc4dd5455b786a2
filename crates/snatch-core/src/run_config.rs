//! Validated, immutable description of one fetch-and-assemble run.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sanitize::sanitize_file_name;
use crate::staging::{StagingArea, SEGMENT_NAME_WIDTH};
use crate::template;

/// Extension of the assembled output file.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Rejected run configuration. Raised before any run starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("URL must contain a (*) placeholder for segment numbers")]
    MissingPlaceholder,
    #[error("URL template does not produce a valid http(s) URL: {0}")]
    InvalidUrl(String),
    #[error("the referer URL cannot be empty")]
    EmptyReferer,
    #[error("output folder does not exist: {}", .0.display())]
    FolderNotFound(PathBuf),
    #[error("the output file name cannot be empty")]
    EmptyFileName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    url_template: String,
    referer: String,
    zero_padding: usize,
    segment_count: u64,
    output_folder: PathBuf,
    output_file_name: String,
}

impl RunConfig {
    /// Validates the inputs and builds a config. The file name is sanitized here.
    pub fn new(
        url_template: impl Into<String>,
        referer: impl Into<String>,
        zero_padding: usize,
        segment_count: u64,
        output_folder: impl Into<PathBuf>,
        output_file_name: &str,
    ) -> Result<Self, ConfigError> {
        let url_template = url_template.into();
        if !template::has_placeholder(&url_template) {
            return Err(ConfigError::MissingPlaceholder);
        }
        let first = template::resolve(&url_template, 0, zero_padding);
        match url::Url::parse(&first) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            Ok(u) => return Err(ConfigError::InvalidUrl(format!("unsupported scheme {}", u.scheme()))),
            Err(e) => return Err(ConfigError::InvalidUrl(e.to_string())),
        }

        let referer = referer.into();
        if referer.trim().is_empty() {
            return Err(ConfigError::EmptyReferer);
        }

        let output_folder = output_folder.into();
        if !output_folder.is_dir() {
            return Err(ConfigError::FolderNotFound(output_folder));
        }

        let output_file_name = sanitize_file_name(output_file_name);
        if output_file_name.is_empty() {
            return Err(ConfigError::EmptyFileName);
        }

        Ok(Self {
            url_template,
            referer,
            zero_padding,
            segment_count,
            output_folder,
            output_file_name,
        })
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn referer(&self) -> &str {
        &self.referer
    }

    pub fn zero_padding(&self) -> usize {
        self.zero_padding
    }

    /// Highest segment index (inclusive).
    pub fn segment_count(&self) -> u64 {
        self.segment_count
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    pub fn output_file_name(&self) -> &str {
        &self.output_file_name
    }

    /// Every index fetched by the run: `0..=segment_count`.
    pub fn indices(&self) -> RangeInclusive<u64> {
        0..=self.segment_count
    }

    /// Number of fetch operations in a run (`segment_count + 1`, saturating).
    pub fn total_segments(&self) -> u64 {
        self.segment_count.saturating_add(1)
    }

    /// Request URL for one segment.
    pub fn url_for(&self, index: u64) -> String {
        template::resolve(&self.url_template, index, self.zero_padding)
    }

    /// `{output_folder}/{output_file_name}_tmp`.
    pub fn staging(&self) -> StagingArea {
        StagingArea::for_output(&self.output_folder, &self.output_file_name)
    }

    /// `{output_folder}/{output_file_name}.mp4`.
    pub fn output_path(&self) -> PathBuf {
        self.output_folder
            .join(format!("{}.{}", self.output_file_name, OUTPUT_EXTENSION))
    }

    /// True when the highest index needs more digits than staging file names
    /// carry. Lexicographic manifest order then no longer matches numeric order.
    pub fn staging_order_overflows(&self) -> bool {
        self.segment_count.to_string().len() > SEGMENT_NAME_WIDTH
    }
}
