//! Tile file name parsing.
//!
//! Tile files are named `{x}_{y}.png`, for example `197_81.png`. Zoom level
//! directories also contain entries that are not tiles (hidden metadata
//! files, temporary files, sub-directories); those are recognised here and
//! nowhere else, so the pruner and the splitter always agree on what a tile is.

use regex::Regex;
use std::sync::OnceLock;

use super::TileCoord;

/// Error parsing a tile file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileNameError {
    /// Name doesn't match `{x}_{y}.png`
    InvalidPattern(String),
    /// A coordinate doesn't fit in a `u32`
    CoordinateOutOfRange(String),
}

impl std::fmt::Display for TileNameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TileNameError::InvalidPattern(name) => {
                write!(f, "'{}' is not a tile file name", name)
            }
            TileNameError::CoordinateOutOfRange(s) => {
                write!(f, "tile coordinate out of range: {}", s)
            }
        }
    }
}

impl std::error::Error for TileNameError {}

/// Tile file name pattern.
///
/// - Group 1: x (unsigned integer, no leading zeros)
/// - Group 2: y (unsigned integer, no leading zeros)
///
/// Only canonical numbers are accepted, so the name always equals
/// [`TileCoord::file_name`] of the parsed coordinate. The extension must appear exactly once and be the last component, so
/// `1_2.png.tmp` and `1_2.png.png` are not tiles.
fn tile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(0|[1-9][0-9]*)_(0|[1-9][0-9]*)\.png$").unwrap())
}

/// Parse a tile file name into its coordinates.
///
/// # Examples
///
/// ```
/// use retile::tile::{parse_tile_name, TileCoord};
///
/// assert_eq!(parse_tile_name("197_81.png").unwrap(), TileCoord::new(197, 81));
/// assert!(parse_tile_name(".DS_Store").is_err());
/// ```
pub fn parse_tile_name(name: &str) -> Result<TileCoord, TileNameError> {
    let captures = tile_pattern()
        .captures(name)
        .ok_or_else(|| TileNameError::InvalidPattern(name.to_string()))?;

    let parse = |index: usize| {
        let digits = &captures[index];
        digits
            .parse::<u32>()
            .map_err(|_| TileNameError::CoordinateOutOfRange(digits.to_string()))
    };

    Ok(TileCoord::new(parse(1)?, parse(2)?))
}

/// Returns true if `name` is the file name of a tile.
///
/// This is the single predicate used to decide which directory entries are
/// pruned and split.
pub fn is_tile_name(name: &str) -> bool {
    parse_tile_name(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_name() {
        assert_eq!(parse_tile_name("5_9.png"), Ok(TileCoord::new(5, 9)));
    }

    #[test]
    fn test_parse_large_coordinates() {
        assert_eq!(
            parse_tile_name("394_163.png"),
            Ok(TileCoord::new(394, 163))
        );
        assert_eq!(
            parse_tile_name("4294967295_0.png"),
            Ok(TileCoord::new(u32::MAX, 0))
        );
    }

    #[test]
    fn test_parse_coordinate_overflow() {
        let result = parse_tile_name("4294967296_0.png");
        assert_eq!(
            result,
            Err(TileNameError::CoordinateOutOfRange("4294967296".to_string()))
        );
    }

    #[test]
    fn test_rejects_directory_markers() {
        assert!(!is_tile_name("."));
        assert!(!is_tile_name(".."));
    }

    #[test]
    fn test_rejects_hidden_and_metadata_files() {
        assert!(!is_tile_name(".DS_Store"));
        assert!(!is_tile_name(".1_2.png"));
        assert!(!is_tile_name("tilemapresource.xml"));
        assert!(!is_tile_name("Thumbs.db"));
    }

    #[test]
    fn test_rejects_repeated_or_trailing_extension() {
        assert!(!is_tile_name("1_2.png.png"));
        assert!(!is_tile_name("1_2.png.tmp"));
        assert!(!is_tile_name("1_2.pngx"));
    }

    #[test]
    fn test_rejects_other_formats() {
        assert!(!is_tile_name("1_2.jpg"));
        assert!(!is_tile_name("1_2.PNG"));
        assert!(!is_tile_name("1_2.dds"));
    }

    #[test]
    fn test_rejects_malformed_stems() {
        assert!(!is_tile_name("1.png"));
        assert!(!is_tile_name("1_2_3.png"));
        assert!(!is_tile_name("-1_2.png"));
        assert!(!is_tile_name("a_b.png"));
        assert!(!is_tile_name("_2.png"));
        assert!(!is_tile_name("1_.png"));
    }

    #[test]
    fn test_rejects_leading_zeros() {
        assert!(!is_tile_name("05_9.png"));
        assert!(!is_tile_name("5_09.png"));
        assert!(!is_tile_name("00_0.png"));
        assert_eq!(parse_tile_name("0_0.png"), Ok(TileCoord::new(0, 0)));
        assert_eq!(parse_tile_name("10_200.png"), Ok(TileCoord::new(10, 200)));
    }

    #[test]
    fn test_error_display() {
        let err = TileNameError::InvalidPattern("foo.txt".to_string());
        assert_eq!(err.to_string(), "'foo.txt' is not a tile file name");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_file_name_roundtrip(x in any::<u32>(), y in any::<u32>()) {
                let coord = TileCoord::new(x, y);
                prop_assert_eq!(parse_tile_name(&coord.file_name()), Ok(coord));
            }

            #[test]
            fn test_accepted_names_are_canonical(name in "[0-9]{1,4}_[0-9]{1,4}\\.png") {
                if let Ok(coord) = parse_tile_name(&name) {
                    prop_assert_eq!(coord.file_name(), name);
                }
            }

            #[test]
            fn test_names_without_png_suffix_are_never_tiles(name in "[a-zA-Z0-9_.]{0,20}") {
                if !name.ends_with(".png") {
                    prop_assert!(!is_tile_name(&name));
                }
            }
        }
    }
}
