//! Splitting one tile into the four tiles of the next zoom level.
//!
//! Each 128×128 quadrant of the 256×256 source is scaled back up to
//! 256×256. Resizing works on straight (non-premultiplied) RGBA, so
//! transparent and partially transparent pixels keep their alpha.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tile::{Quadrant, TileCoord, QUADRANT_SIZE, TILE_SIZE};

/// Errors that can occur while splitting a tile.
#[derive(Debug, Error)]
pub enum SplitError {
    /// The source bytes are not a valid PNG image.
    #[error("failed to decode tile: {0}")]
    Decode(#[source] image::ImageError),

    /// The source decoded, but is not a 256×256 tile.
    #[error("invalid tile dimensions {width}×{height} (expected 256×256)")]
    InvalidDimensions { width: u32, height: u32 },

    /// A child tile could not be encoded.
    #[error("failed to encode tile: {0}")]
    Encode(#[source] image::ImageError),

    /// The child coordinates of this tile do not fit in a `u32`.
    #[error("child coordinates of tile {0} are out of range")]
    CoordinateOverflow(TileCoord),
}

impl SplitError {
    /// Returns true if the error means the source tile itself is corrupt.
    ///
    /// Only these errors may be skipped with [`crate::level::DecodePolicy::Skip`].
    pub fn is_corrupt_source(&self) -> bool {
        matches!(
            self,
            SplitError::Decode(_) | SplitError::InvalidDimensions { .. }
        )
    }
}

/// Resampling filter used to scale a quadrant up to a full tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResampleFilter {
    /// Pixel replication. Every source pixel becomes a 2×2 block.
    #[default]
    Nearest,
    /// Bilinear.
    Triangle,
    /// Bicubic.
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResampleFilter {
    fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }

    /// Name as written in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            ResampleFilter::Nearest => "nearest",
            ResampleFilter::Triangle => "triangle",
            ResampleFilter::CatmullRom => "catmullRom",
            ResampleFilter::Gaussian => "gaussian",
            ResampleFilter::Lanczos3 => "lanczos3",
        }
    }
}

/// One of the four tiles produced from a source tile.
#[derive(Debug, Clone)]
pub struct ChildTile {
    /// The quadrant of the source this tile was cut from.
    pub quadrant: Quadrant,
    /// Coordinates of the tile in the next zoom level.
    pub coord: TileCoord,
    /// PNG-encoded image.
    pub data: Vec<u8>,
}

/// Cuts tiles into quadrants and scales each quadrant to a full tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileSplitter {
    filter: ResampleFilter,
}

impl TileSplitter {
    /// Create a splitter using `filter` for upscaling.
    pub fn new(filter: ResampleFilter) -> Self {
        Self { filter }
    }

    /// Returns the resampling filter.
    pub fn filter(&self) -> ResampleFilter {
        self.filter
    }

    /// Decode the PNG tile at `source` and produce its four children.
    ///
    /// Children are returned in [`Quadrant::ALL`] order. The decoded source
    /// image is dropped before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a 256×256 PNG, or if a child
    /// cannot be encoded.
    pub fn split(&self, source: TileCoord, data: &[u8]) -> Result<Vec<ChildTile>, SplitError> {
        // Compute coordinates first so an overflow never costs a decode
        let mut coords = Vec::with_capacity(Quadrant::ALL.len());
        for quadrant in Quadrant::ALL {
            let coord = quadrant
                .child_of(source)
                .ok_or(SplitError::CoordinateOverflow(source))?;
            coords.push((quadrant, coord));
        }

        let image = decode_tile(data)?;

        coords
            .into_iter()
            .map(|(quadrant, coord)| {
                let zoomed = self.zoom_quadrant(&image, quadrant);
                Ok(ChildTile {
                    quadrant,
                    coord,
                    data: encode_tile(&zoomed)?,
                })
            })
            .collect()
    }

    /// Scale one quadrant of a decoded tile up to a full tile.
    pub fn zoom_quadrant(&self, image: &RgbaImage, quadrant: Quadrant) -> RgbaImage {
        let (dx, dy) = quadrant.offset();
        let region = imageops::crop_imm(image, dx, dy, QUADRANT_SIZE, QUADRANT_SIZE).to_image();
        imageops::resize(&region, TILE_SIZE, TILE_SIZE, self.filter.filter_type())
    }
}

/// Decode a PNG tile into straight RGBA.
pub fn decode_tile(data: &[u8]) -> Result<RgbaImage, SplitError> {
    let image = image::load_from_memory_with_format(data, ImageFormat::Png)
        .map_err(SplitError::Decode)?
        .to_rgba8();

    if image.width() != TILE_SIZE || image.height() != TILE_SIZE {
        return Err(SplitError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(image)
}

/// Encode an RGBA tile as PNG, keeping the alpha channel.
pub fn encode_tile(image: &RgbaImage) -> Result<Vec<u8>, SplitError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(SplitError::Encode)?;
    Ok(buffer.into_inner())
}
