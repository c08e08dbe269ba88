//! scenematch finds a small template image inside a larger scene.
//!
//! The crate computes dense score surfaces under six correlation methods,
//! locates global extrema with deterministic tie-breaking, and extracts
//! ranked, non-overlapping matches by iterative suppression. Optional
//! features add row parallelism (`rayon`), vectorized reductions (`simd`),
//! image decoding (`image-io`) and `tracing` spans.
//!
//! ```
//! use scenematch::{find_matches, Mat, Method, PixelFormat};
//!
//! let mut scene = Mat::zeros(40, 40, PixelFormat::U8C1).unwrap();
//! scene.set_region(12, 7, 5, 5, 255.0).unwrap();
//! let templ = Mat::from_u8(5, 5, PixelFormat::U8C1, &[255; 25]).unwrap();
//!
//! let found = find_matches(&scene, &templ, Method::SqDiff, 1.0, 4).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!((found[0].location.x, found[0].location.y), (12, 7));
//! ```

pub mod handle;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod search;
pub mod template;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use image::io;
pub use image::{ElemType, Mat, MatView, PixelFormat};
pub use kernel::{CancelToken, Method, Polarity, ScanOptions};
pub use search::extremum::{min_max_loc, MinMaxLoc};
pub use search::scan::{match_template, match_template_with};
pub use search::{find_matches, Match, MatchConfig, Matcher, Point, Rect};
pub use template::TemplatePlan;
pub use util::{ErrorKind, MatchError, MatchResult};

pub use handle::{BufferHandle, Registry};
