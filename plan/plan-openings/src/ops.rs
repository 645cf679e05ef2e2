//! Opening operations: place, move, resize, remove, revalidate.

use tracing::{debug, warn};

use plan_catalog::{CatalogSource, HostKind};
use plan_types::{CatalogId, Opening, OpeningId, Plan, SegmentId, WallSegment};

use crate::error::{OpeningError, OpeningResult};

/// Tuning for opening validation.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct OpeningConfig {
    /// Minimum clear wall length required between two openings, in meters.
    /// Always > 0.
    pub min_clearance: f64,
}

impl Default for OpeningConfig {
    fn default() -> Self {
        Self { min_clearance: 0.05 }
    }
}

/// Outcome of revalidating a segment's openings after a host change.
#[derive(Debug, Clone, Default)]
pub struct RevalidationOutcome {
    /// Openings that stopped fitting and are now orphaned.
    pub newly_orphaned: Vec<OpeningId>,
    /// Previously orphaned openings that fit again.
    pub restored: Vec<OpeningId>,
}

impl RevalidationOutcome {
    /// Whether any flag changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.newly_orphaned.is_empty() || !self.restored.is_empty()
    }
}

/// The opening manager.
///
/// Stateless besides its configuration; every operation validates the
/// proposed state in full before mutating the plan, so a rejection leaves
/// the prior state untouched.
#[derive(Debug, Clone, Default)]
pub struct OpeningOps {
    config: OpeningConfig,
}

impl OpeningOps {
    /// Create a manager with the given configuration.
    #[must_use]
    pub const fn new(config: OpeningConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OpeningConfig {
        &self.config
    }

    /// Place a new opening on a segment.
    ///
    /// The opening takes the catalog definition's nominal width and height.
    /// Validation order: length bounds, height range, clearance.
    ///
    /// # Errors
    ///
    /// [`OpeningError::UnknownSegment`], [`OpeningError::UnknownDefinition`],
    /// [`OpeningError::NotWallHosted`], or a validation error.
    pub fn place(
        &self,
        plan: &mut Plan,
        catalog: &dyn CatalogSource,
        segment_id: SegmentId,
        def_id: &CatalogId,
        offset: f64,
        sill: f64,
    ) -> OpeningResult<OpeningId> {
        self.place_as(plan, catalog, segment_id, def_id, offset, sill, OpeningId::new())
    }

    /// [`place`](Self::place) with a caller-chosen opening id.
    ///
    /// Replicated sessions generate the id at the requesting client so the
    /// speculative copy and the authoritative one agree on identity.
    ///
    /// # Errors
    ///
    /// As [`place`](Self::place).
    #[allow(clippy::too_many_arguments)]
    pub fn place_as(
        &self,
        plan: &mut Plan,
        catalog: &dyn CatalogSource,
        segment_id: SegmentId,
        def_id: &CatalogId,
        offset: f64,
        sill: f64,
        id: OpeningId,
    ) -> OpeningResult<OpeningId> {
        let def = catalog
            .definition(def_id)
            .ok_or_else(|| OpeningError::UnknownDefinition { id: def_id.clone() })?;
        if def.host != HostKind::Wall {
            return Err(OpeningError::NotWallHosted { id: def_id.clone() });
        }

        let mut opening = Opening::new(
            def.id.clone(),
            offset,
            sill,
            def.nominal_width,
            def.nominal_height,
        );
        opening.id = id;

        let segment = plan
            .segment(segment_id)
            .map(|(_, s)| s)
            .ok_or(OpeningError::UnknownSegment { id: segment_id })?;
        self.validate(segment, &opening, None)?;

        let id = opening.id;
        debug!(segment = %segment_id, opening = %id, offset, sill, "place opening");

        let segment = plan
            .segment_mut(segment_id)
            .ok_or(OpeningError::UnknownSegment { id: segment_id })?;
        segment.openings.push(opening);
        segment.sort_openings();
        Ok(id)
    }

    /// Move an opening along its host segment.
    ///
    /// # Errors
    ///
    /// [`OpeningError::UnknownOpening`] or a validation error; the opening
    /// keeps its prior placement on rejection.
    pub fn move_opening(
        &self,
        plan: &mut Plan,
        opening_id: OpeningId,
        offset: f64,
        sill: f64,
    ) -> OpeningResult<()> {
        self.edit(plan, opening_id, |proposed| {
            proposed.offset = offset;
            proposed.sill = sill;
        })
    }

    /// Resize an opening in place.
    ///
    /// # Errors
    ///
    /// [`OpeningError::UnknownOpening`] or a validation error; the opening
    /// keeps its prior size on rejection.
    pub fn resize(
        &self,
        plan: &mut Plan,
        opening_id: OpeningId,
        width: f64,
        height: f64,
    ) -> OpeningResult<()> {
        self.edit(plan, opening_id, |proposed| {
            proposed.width = width;
            proposed.height = height;
        })
    }

    /// Set an opening's rotation. Purely cosmetic for the cutout, so no
    /// geometric validation applies.
    ///
    /// # Errors
    ///
    /// [`OpeningError::UnknownOpening`].
    pub fn set_rotation(
        &self,
        plan: &mut Plan,
        opening_id: OpeningId,
        rotation_deg: f64,
    ) -> OpeningResult<()> {
        let segment = plan
            .host_of_opening_mut(opening_id)
            .ok_or(OpeningError::UnknownOpening { id: opening_id })?;
        let opening = segment
            .opening_mut(opening_id)
            .ok_or(OpeningError::UnknownOpening { id: opening_id })?;
        opening.rotation_deg = rotation_deg;
        Ok(())
    }

    /// Remove an opening, returning it.
    ///
    /// # Errors
    ///
    /// [`OpeningError::UnknownOpening`].
    pub fn remove(&self, plan: &mut Plan, opening_id: OpeningId) -> OpeningResult<Opening> {
        let segment = plan
            .host_of_opening_mut(opening_id)
            .ok_or(OpeningError::UnknownOpening { id: opening_id })?;
        let index = segment
            .openings
            .iter()
            .position(|o| o.id == opening_id)
            .ok_or(OpeningError::UnknownOpening { id: opening_id })?;
        debug!(opening = %opening_id, "remove opening");
        Ok(segment.openings.remove(index))
    }

    /// Re-validate every opening on a segment after its geometry changed.
    ///
    /// Openings that no longer fit are flagged orphaned, not deleted, so
    /// authored intent survives transient invalid states during interactive
    /// dragging. Orphaned openings that fit again are restored. Openings
    /// are considered in offset order; a restored opening must also clear
    /// the openings already accepted in this pass.
    ///
    /// # Errors
    ///
    /// [`OpeningError::UnknownSegment`].
    pub fn revalidate_segment(
        &self,
        plan: &mut Plan,
        segment_id: SegmentId,
    ) -> OpeningResult<RevalidationOutcome> {
        let segment = plan
            .segment_mut(segment_id)
            .ok_or(OpeningError::UnknownSegment { id: segment_id })?;

        let length = segment.length();
        let height = segment.height;
        let clearance = self.config.min_clearance;

        let mut outcome = RevalidationOutcome::default();
        let mut accepted: Vec<(f64, f64)> = Vec::with_capacity(segment.openings.len());

        for opening in &mut segment.openings {
            let ext = opening.extent();
            let fits_length = ext.start >= 0.0 && ext.end <= length;
            let fits_height = opening.sill >= 0.0 && opening.head() <= height;
            let clears = accepted.iter().all(|(start, end)| {
                ext.start - end >= clearance || start - ext.end >= clearance
            });

            let fits = fits_length && fits_height && clears;
            if fits {
                accepted.push((ext.start, ext.end));
                if opening.orphaned {
                    opening.orphaned = false;
                    outcome.restored.push(opening.id);
                }
            } else if !opening.orphaned {
                opening.orphaned = true;
                outcome.newly_orphaned.push(opening.id);
            }
        }

        if outcome.changed() {
            warn!(
                segment = %segment_id,
                orphaned = outcome.newly_orphaned.len(),
                restored = outcome.restored.len(),
                "opening revalidation changed flags"
            );
        }
        Ok(outcome)
    }

    /// Apply an edit all-or-nothing: validate the proposed opening against
    /// its host before committing.
    fn edit(
        &self,
        plan: &mut Plan,
        opening_id: OpeningId,
        apply: impl FnOnce(&mut Opening),
    ) -> OpeningResult<()> {
        let segment = plan
            .host_of_opening_mut(opening_id)
            .ok_or(OpeningError::UnknownOpening { id: opening_id })?;

        let current = segment
            .opening(opening_id)
            .ok_or(OpeningError::UnknownOpening { id: opening_id })?;
        let mut proposed = current.clone();
        apply(&mut proposed);
        proposed.orphaned = false;

        // Validate against the segment with the edited opening excluded.
        let validation = {
            let snapshot = &*segment;
            Self::validate_with(&self.config, snapshot, &proposed, Some(opening_id))
        };
        validation?;

        if let Some(opening) = segment.opening_mut(opening_id) {
            *opening = proposed;
        }
        segment.sort_openings();
        Ok(())
    }

    fn validate(
        &self,
        segment: &WallSegment,
        proposed: &Opening,
        ignore: Option<OpeningId>,
    ) -> OpeningResult<()> {
        Self::validate_with(&self.config, segment, proposed, ignore)
    }

    /// The three validation checks, in spec order.
    fn validate_with(
        config: &OpeningConfig,
        segment: &WallSegment,
        proposed: &Opening,
        ignore: Option<OpeningId>,
    ) -> OpeningResult<()> {
        let ext = proposed.extent();
        let length = segment.length();
        if ext.start < 0.0 || ext.end > length {
            return Err(OpeningError::OutOfBounds {
                start: ext.start,
                end: ext.end,
                length,
            });
        }

        if proposed.sill < 0.0 || proposed.head() > segment.height {
            return Err(OpeningError::HeightOutOfRange {
                sill: proposed.sill,
                head: proposed.head(),
                wall_height: segment.height,
            });
        }

        // Clearance applies against every authored opening, orphaned ones
        // included: an orphaned door keeps its claim on the wall.
        for other in &segment.openings {
            if Some(other.id) == ignore {
                continue;
            }
            if ext.overlaps_with_clearance(&other.extent(), config.min_clearance) {
                return Err(OpeningError::ClearanceViolation {
                    other: other.id,
                    clearance: config.min_clearance,
                });
            }
        }
        Ok(())
    }
}
