//! Slicing one tall snapshot into fixed-size pages.
//!
//! The snapshot is scaled to the page width, keeping its aspect ratio. Page 1
//! shows it from the top; every following page shows the same scaled image
//! shifted up by the height already consumed, revealing the next band.
//!
//! ```text
//!  image            page 1       page 2       page 3
//! ┌──────┐ 0       ┌──────┐
//! │ band │         │ band │
//! ├──────┤ H       └──────┘     ┌──────┐
//! │ band │                      │ band │
//! ├──────┤ 2H                   └──────┘     ┌──────┐
//! │ band │                                   │ band │
//! └──────┘                                   └──────┘
//! ```

use super::RasterSnapshot;
use crate::{Error, Result};

/// Page orientation. Normalises which page dimension is the width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// When to stop adding pages.
///
/// Page `k` (zero-based) is added while the height left after the first `k`
/// pages is positive (`Strict`) or non-negative (`Inclusive`). An image that
/// is an exact multiple of the page height therefore fills exactly that many
/// pages under `Strict`, and gets one blank trailing page under `Inclusive`,
/// which reproduces documents produced by older exports.
///
/// The comparison is made on the image-to-page height ratio, snapped to the
/// nearest whole number when it is within [`RATIO_TOLERANCE`] of one, so the
/// policy alone decides the exact-multiple case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    #[default]
    Strict,
    Inclusive,
}

/// Ratios closer than this to a whole number count as an exact multiple.
pub const RATIO_TOLERANCE: f64 = 1e-9;

impl BoundaryPolicy {
    /// Pages needed for an image `ratio` page heights tall.
    pub fn page_count(self, ratio: f64) -> usize {
        let ratio = snap(ratio);
        let pages = match self {
            BoundaryPolicy::Strict => ratio.ceil(),
            BoundaryPolicy::Inclusive => ratio.floor() + 1.0,
        };
        pages.max(1.0) as usize
    }
}

fn snap(ratio: f64) -> f64 {
    let nearest = ratio.round();
    if (ratio - nearest).abs() < RATIO_TOLERANCE {
        nearest
    } else {
        ratio
    }
}

/// Destination page geometry, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub orientation: Orientation,
    pub boundary: BoundaryPolicy,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageLayout {
    /// A4 portrait
    pub fn a4() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            orientation: Orientation::Portrait,
            boundary: BoundaryPolicy::Strict,
        }
    }

    /// Effective `(width, height)` once orientation is applied.
    pub fn page_size_mm(&self) -> (f64, f64) {
        let short = self.page_width_mm.min(self.page_height_mm);
        let long = self.page_width_mm.max(self.page_height_mm);
        match self.orientation {
            Orientation::Portrait => (short, long),
            Orientation::Landscape => (long, short),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("page_width_mm", self.page_width_mm),
            ("page_height_mm", self.page_height_mm),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::ConfigError(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Placement of the scaled image on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlice {
    /// Zero-based page number
    pub index: usize,
    /// Vertical position of the image's top edge, measured down from the
    /// top of the page. Zero on the first page, negative afterwards.
    pub offset_mm: f64,
}

/// Where the scaled image goes on every page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    /// Scaled image height; the scaled width equals the page width.
    pub image_height_mm: f64,
    pub slices: Vec<PageSlice>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.slices.len()
    }
}

/// Compute page placements for an image of the given pixel size.
pub fn plan_pages(width_px: u32, height_px: u32, layout: &PageLayout) -> Result<PagePlan> {
    layout.validate()?;
    if width_px == 0 || height_px == 0 {
        return Err(Error::RenderError(format!(
            "cannot paginate an empty {}x{} snapshot",
            width_px, height_px
        )));
    }

    let (page_width, page_height) = layout.page_size_mm();
    let image_height = height_px as f64 * page_width / width_px as f64;

    let pages = layout.boundary.page_count(image_height / page_height);
    let slices = (0..pages)
        .map(|index| PageSlice {
            index,
            offset_mm: -(index as f64 * page_height),
        })
        .collect();

    Ok(PagePlan {
        page_width_mm: page_width,
        page_height_mm: page_height,
        image_height_mm: image_height,
        slices,
    })
}

/// A snapshot together with its page plan, ready for rendering.
#[derive(Debug, Clone)]
pub struct PaginatedDocument<'a> {
    pub snapshot: &'a RasterSnapshot,
    pub plan: PagePlan,
}

impl PaginatedDocument<'_> {
    pub fn page_count(&self) -> usize {
        self.plan.page_count()
    }
}

pub fn paginate<'a>(snapshot: &'a RasterSnapshot, layout: &PageLayout) -> Result<PaginatedDocument<'a>> {
    let plan = plan_pages(snapshot.width, snapshot.height, layout)?;
    log::debug!(
        "paginated {}x{} snapshot into {} page(s), scaled height {:.2}mm",
        snapshot.width,
        snapshot.height,
        plan.page_count(),
        plan.image_height_mm
    );
    Ok(PaginatedDocument { snapshot, plan })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(boundary: BoundaryPolicy) -> PageLayout {
        PageLayout {
            boundary,
            ..PageLayout::a4()
        }
    }

    #[test]
    fn short_image_fits_on_one_page() {
        let plan = plan_pages(210, 100, &PageLayout::a4()).unwrap();
        assert_eq!(plan.page_count(), 1);
        assert_eq!(plan.image_height_mm, 100.0);
        assert_eq!(plan.slices[0].offset_mm, 0.0);
    }

    #[test]
    fn image_is_scaled_to_page_width() {
        // 420px wide -> 210mm, so 1000px tall -> 500mm
        let plan = plan_pages(420, 1000, &PageLayout::a4()).unwrap();
        assert_eq!(plan.image_height_mm, 500.0);
        assert_eq!(plan.page_count(), 2);
        assert_eq!(plan.slices[1].offset_mm, -297.0);
    }

    #[test]
    fn offsets_reveal_consecutive_bands() {
        let plan = plan_pages(210, 1000, &PageLayout::a4()).unwrap();
        let offsets: Vec<f64> = plan.slices.iter().map(|s| s.offset_mm).collect();
        assert_eq!(offsets, vec![0.0, -297.0, -594.0, -891.0]);
        let indices: Vec<usize> = plan.slices.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn exact_multiple_boundary() {
        let strict = plan_pages(210, 891, &layout(BoundaryPolicy::Strict)).unwrap();
        assert_eq!(strict.page_count(), 3);

        let inclusive = plan_pages(210, 891, &layout(BoundaryPolicy::Inclusive)).unwrap();
        assert_eq!(inclusive.page_count(), 4);
        assert_eq!(inclusive.slices[3].offset_mm, -891.0);
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn us_letter_exact_multiple_follows_the_policy() {
        let letter = |boundary| PageLayout {
            page_width_mm: 215.9,
            page_height_mm: 279.4,
            boundary,
            ..PageLayout::a4()
        };
        // 2159px -> 215.9mm wide, so 8382px is three 279.4mm pages.
        let strict = plan_pages(2159, 8382, &letter(BoundaryPolicy::Strict)).unwrap();
        assert_eq!(strict.page_count(), 3);
        assert!(approx(strict.slices[2].offset_mm, -558.8));

        let inclusive = plan_pages(2159, 8382, &letter(BoundaryPolicy::Inclusive)).unwrap();
        assert_eq!(inclusive.page_count(), 4);
        assert!(approx(inclusive.slices[3].offset_mm, -838.2));
    }

    #[test]
    fn fractional_page_sizes_follow_the_policy() {
        let small = |boundary| PageLayout {
            page_width_mm: 21.0,
            page_height_mm: 29.7,
            boundary,
            ..PageLayout::a4()
        };
        assert_eq!(plan_pages(210, 891, &small(BoundaryPolicy::Strict)).unwrap().page_count(), 3);
        assert_eq!(plan_pages(210, 891, &small(BoundaryPolicy::Inclusive)).unwrap().page_count(), 4);

        let tiny = |boundary| PageLayout {
            page_width_mm: 1.1,
            page_height_mm: 3.3,
            boundary,
            ..PageLayout::a4()
        };
        assert_eq!(plan_pages(1000, 3000, &tiny(BoundaryPolicy::Strict)).unwrap().page_count(), 1);
        assert_eq!(plan_pages(1000, 3000, &tiny(BoundaryPolicy::Inclusive)).unwrap().page_count(), 2);
    }

    #[test]
    fn page_count_from_ratio() {
        assert_eq!(BoundaryPolicy::Strict.page_count(0.2), 1);
        assert_eq!(BoundaryPolicy::Inclusive.page_count(0.2), 1);
        assert_eq!(BoundaryPolicy::Strict.page_count(2.5), 3);
        assert_eq!(BoundaryPolicy::Inclusive.page_count(2.5), 3);
        assert_eq!(BoundaryPolicy::Strict.page_count(3.0 - 1e-12), 3);
        assert_eq!(BoundaryPolicy::Inclusive.page_count(3.0 + 1e-12), 4);
        assert_eq!(BoundaryPolicy::Strict.page_count(3.0 + 1e-12), 3);
    }

    #[test]
    fn landscape_swaps_dimensions() {
        let l = PageLayout {
            orientation: Orientation::Landscape,
            ..PageLayout::a4()
        };
        assert_eq!(l.page_size_mm(), (297.0, 210.0));
        let plan = plan_pages(297, 420, &l).unwrap();
        assert_eq!(plan.page_count(), 2);
    }

    #[test]
    fn invalid_inputs_are_errors() {
        assert!(plan_pages(0, 10, &PageLayout::a4()).is_err());
        let bad = PageLayout {
            page_height_mm: 0.0,
            ..PageLayout::a4()
        };
        assert!(matches!(plan_pages(10, 10, &bad), Err(Error::ConfigError(_))));
        let nan = PageLayout {
            page_width_mm: f64::NAN,
            ..PageLayout::a4()
        };
        assert!(plan_pages(10, 10, &nan).is_err());
    }
}
