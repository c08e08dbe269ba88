//! Search strategies for locating template matches.
//!
//! The scan module computes dense score surfaces, `extremum` locates global
//! peaks and `suppress` turns one surface into a ranked list of distinct
//! matches. [`Matcher`] ties them together for repeated searches with the same
//! template.

pub(crate) mod extremum;
pub(crate) mod scan;
pub(crate) mod suppress;

use crate::image::Mat;
use crate::kernel::{CancelToken, Method, ScanOptions};
use crate::search::scan::{match_template_with, surface_size};
use crate::search::suppress::suppress_peaks;
use crate::template::TemplatePlan;
use crate::trace::{enter_span, record};
use crate::util::{MatchError, MatchResult};

/// Pixel location in scene coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
}

/// Axis-aligned rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left column.
    pub x: usize,
    /// Top row.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Rect {
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Accepted match: a score, the template's top-left location in the scene and
/// the template size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Score under the method that produced this match.
    pub score: f64,
    /// Top-left corner of the template placement.
    pub location: Point,
    /// Template width in pixels.
    pub width: usize,
    /// Template height in pixels.
    pub height: usize,
}

impl Match {
    /// Scene-space footprint of the template placement.
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.location.x,
            y: self.location.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Centre of the footprint, rounded down.
    pub fn center(&self) -> Point {
        Point {
            x: self.location.x + self.width / 2,
            y: self.location.y + self.height / 2,
        }
    }
}

/// Configuration for multi-match search.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Scoring formula.
    pub method: Method,
    /// Acceptance threshold; compared with `<=` for minimizing methods and
    /// `>=` for maximizing ones.
    pub threshold: f64,
    /// Maximum number of matches returned.
    pub max_matches: usize,
    /// Score rows in parallel when the `rayon` feature is enabled.
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            method: Method::CCoeffNormed,
            threshold: 0.7,
            max_matches: 100,
            parallel: false,
        }
    }
}

/// Template matcher reusable across scenes.
pub struct Matcher {
    plan: TemplatePlan,
    cfg: MatchConfig,
    cancel: Option<CancelToken>,
}

impl Matcher {
    /// Creates a matcher from a precomputed plan with default configuration.
    pub fn new(plan: TemplatePlan) -> Self {
        Self {
            plan,
            cfg: MatchConfig::default(),
            cancel: None,
        }
    }

    /// Plans `templ` and creates a matcher for it.
    pub fn from_template(templ: &Mat) -> MatchResult<Self> {
        Ok(Self::new(TemplatePlan::from_mat(templ)?))
    }

    /// Replaces the match configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Attaches a cancellation token checked between surface rows.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the match configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Returns the template plan.
    pub fn plan(&self) -> &TemplatePlan {
        &self.plan
    }

    /// Computes the full score surface for `scene`.
    pub fn score_surface(&self, scene: &Mat) -> MatchResult<Mat> {
        let opts = ScanOptions {
            parallel: self.cfg.parallel,
            cancel: self.cancel.clone(),
        };
        match_template_with(scene, &self.plan, self.cfg.method, &opts)
    }

    /// Returns up to `max_matches` non-overlapping matches, best first.
    ///
    /// An empty vector means no placement passed the threshold; failures are
    /// reported as errors and never as a partial list.
    pub fn find_matches(&self, scene: &Mat) -> MatchResult<Vec<Match>> {
        self.find_capped(scene, self.cfg.max_matches)
    }

    /// Returns the single best match if it passes the threshold.
    pub fn best_match(&self, scene: &Mat) -> MatchResult<Option<Match>> {
        Ok(self.find_capped(scene, 1)?.into_iter().next())
    }

    fn find_capped(&self, scene: &Mat, max_matches: usize) -> MatchResult<Vec<Match>> {
        let cfg = &self.cfg;
        if cfg.threshold.is_nan() {
            return Err(MatchError::InvalidThreshold(cfg.threshold));
        }
        let _span = enter_span!(
            "find_matches",
            method = cfg.method.name(),
            threshold = cfg.threshold,
            max_matches = max_matches
        );

        if max_matches == 0 {
            surface_size(scene.view(), &self.plan)?;
            return Ok(Vec::new());
        }

        let mut surface = self.score_surface(scene)?;
        let matches = suppress_peaks(
            &mut surface,
            cfg.method,
            self.plan.cols(),
            self.plan.rows(),
            cfg.threshold,
            max_matches,
        )?;
        record!(info, "search_done", count = matches.len());
        Ok(matches)
    }
}

/// Finds up to `max_matches` non-overlapping placements of `templ` in `scene`.
pub fn find_matches(
    scene: &Mat,
    templ: &Mat,
    method: Method,
    threshold: f64,
    max_matches: usize,
) -> MatchResult<Vec<Match>> {
    Matcher::from_template(templ)?
        .with_config(MatchConfig {
            method,
            threshold,
            max_matches,
            ..MatchConfig::default()
        })
        .find_matches(scene)
}
