//! Argument types and override resolution shared by the CLI.

use clap::ValueEnum;
use retile::{DecodePolicy, ResampleFilter, RetileConfig};

/// Resampling filter selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum FilterArg {
    /// Pixel replication (sharp, same as the classic retile scripts)
    Nearest,
    /// Bilinear
    Triangle,
    /// Bicubic
    CatmullRom,
    /// Gaussian blur
    Gaussian,
    /// Lanczos with window 3 (sharpest, slowest)
    Lanczos3,
}

impl From<FilterArg> for ResampleFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Nearest => ResampleFilter::Nearest,
            FilterArg::Triangle => ResampleFilter::Triangle,
            FilterArg::CatmullRom => ResampleFilter::CatmullRom,
            FilterArg::Gaussian => ResampleFilter::Gaussian,
            FilterArg::Lanczos3 => ResampleFilter::Lanczos3,
        }
    }
}

/// Values given on the command line that replace config file values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub start: Option<u32>,
    pub end: Option<u32>,
    pub threads: Option<usize>,
    pub batch_size: Option<usize>,
    pub filter: Option<FilterArg>,
    pub blank_size: Option<u64>,
    pub skip_corrupt: bool,
}

impl Overrides {
    /// Apply the overrides to `config`.
    ///
    /// CLI takes precedence, then config. `--skip-corrupt` can only turn
    /// skipping on.
    pub fn apply(&self, config: &mut RetileConfig) {
        if let Some(start) = self.start {
            config.start_zoom_level = start;
        }
        if let Some(end) = self.end {
            config.end_zoom_level = end;
        }

        let options = &mut config.options;
        if let Some(threads) = self.threads {
            options.threads = threads;
        }
        if let Some(batch_size) = self.batch_size {
            options.batch_size = batch_size;
        }
        if let Some(filter) = self.filter {
            options.filter = filter.into();
        }
        if let Some(blank_size) = self.blank_size {
            options.blank_tile_size = blank_size;
        }
        if self.skip_corrupt {
            options.on_decode_error = DecodePolicy::Skip;
        }
    }
}
