//! Per-field orchestration of the full sky <-> plate transform.
//!
//! A [`FieldTransformSession`] fixes everything that does not vary from
//! target to target: the two observed-parameter blocks (pointing and
//! observing wavelength), the mount rotation and the radial distortion law.
//! Each call then only refreshes the time-dependent part of the blocks.
//!
//! ```text
//! apparent RA/Dec --provider--> observed Az/ZD --mount--> (-HA, Dec)
//!     --tangent plane about centre--> (xi, eta) --radial--> plate X/Y
//! ```

use crate::distortion::RadialDistortionParams;
use crate::error::{Body, PlateError, PlateResult};
use crate::mount::{MountFrameRotator, MountMisalignment, ZENITH_DISTANCE_LIMIT_DEG};
use crate::setup::{validate_positions, validate_wavelength, FieldSetup};
use focalplate_astrometry::{AstrometryProvider, ObservedParams, Site};
use focalplate_core::constants::{DEG_TO_RAD, RAD_TO_DEG};
use tracing::{debug, warn};

/// Site and mount description shared by every session at one telescope.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionOptions {
    pub site: Site,
    pub misalignment: MountMisalignment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    /// An observing wavelength (micrometres) was set explicitly.
    ReadyForWavelength(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ParamBlocks {
    pointing: ObservedParams,
    observing: ObservedParams,
}

/// Result of the field-centre feasibility check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observability {
    /// Unrefracted zenith distance of the field centre, radians.
    pub zenith_distance: f64,
    pub observable: bool,
}

/// Feasibility of a field centre for a snapshot of the pointing block.
///
/// Refraction is switched off on a copy of `snapshot`; the caller's block is
/// not touched.
pub fn check_observable<P: AstrometryProvider + ?Sized>(
    provider: &P,
    snapshot: &ObservedParams,
    centre_ra: f64,
    centre_dec: f64,
) -> Observability {
    let dry = snapshot.without_refraction();
    let place = provider.apparent_to_observed(centre_ra, centre_dec, &dry);
    Observability {
        zenith_distance: place.zenith_distance,
        observable: place.zenith_distance <= ZENITH_DISTANCE_LIMIT_DEG * DEG_TO_RAD,
    }
}

#[derive(Debug, Clone)]
pub struct FieldTransformSession<P> {
    provider: P,
    site: Site,
    setup: FieldSetup,
    radial: RadialDistortionParams,
    rotator: MountFrameRotator,
    blocks: Option<ParamBlocks>,
    state: SessionState,
}

impl<P: AstrometryProvider> FieldTransformSession<P> {
    /// Validates `setup` and builds both parameter blocks.
    pub fn new(
        provider: P,
        setup: FieldSetup,
        radial: RadialDistortionParams,
        options: SessionOptions,
    ) -> PlateResult<Self> {
        let mut session = Self {
            provider,
            site: options.site,
            setup: setup.validated()?,
            radial,
            rotator: MountFrameRotator::new(options.site.latitude, options.misalignment),
            blocks: None,
            state: SessionState::Uninitialized,
        };
        session.reinitialize()?;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn setup(&self) -> &FieldSetup {
        &self.setup
    }

    pub fn radial(&self) -> &RadialDistortionParams {
        &self.radial
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn rotator(&self) -> &MountFrameRotator {
        &self.rotator
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn observing_wavelength(&self) -> f64 {
        self.setup.observing_wavelength_um
    }

    fn build_block(&self, wavelength_um: f64) -> PlateResult<ObservedParams> {
        let conditions = self.setup.conditions(self.site, wavelength_um);
        Ok(self.provider.build_observed_params(&conditions)?)
    }

    /// Rebuilds both parameter blocks from the stored set-up.
    pub fn reinitialize(&mut self) -> PlateResult<()> {
        self.blocks = None;
        self.state = SessionState::Uninitialized;

        let pointing = self.build_block(self.setup.pointing_wavelength_um)?;
        let observing = self.build_block(self.setup.observing_wavelength_um)?;
        self.blocks = Some(ParamBlocks {
            pointing,
            observing,
        });
        self.state = SessionState::Initialized;
        debug!(
            mjd = self.setup.mjd,
            pointing_um = self.setup.pointing_wavelength_um,
            observing_um = self.setup.observing_wavelength_um,
            "field transform session initialised"
        );
        Ok(())
    }

    /// Switches the observing wavelength, rebuilding only the observing block.
    ///
    /// Any failure leaves the session uninitialised.
    pub fn set_observing_wavelength(&mut self, wavelength_um: f64) -> PlateResult<()> {
        let Some(blocks) = self.blocks else {
            return Err(PlateError::SessionUninitialized);
        };
        if wavelength_um == self.setup.observing_wavelength_um {
            self.state = SessionState::ReadyForWavelength(wavelength_um);
            return Ok(());
        }

        match validate_wavelength(wavelength_um).and_then(|_| self.build_block(wavelength_um)) {
            Ok(observing) => {
                self.blocks = Some(ParamBlocks {
                    observing,
                    ..blocks
                });
                self.setup.observing_wavelength_um = wavelength_um;
                self.state = SessionState::ReadyForWavelength(wavelength_um);
                debug!(wavelength_um, "observing parameters rebuilt");
                Ok(())
            }
            Err(err) => {
                warn!(wavelength_um, error = %err, "observing wavelength rebuild failed");
                self.blocks = None;
                self.state = SessionState::Uninitialized;
                Err(err)
            }
        }
    }

    /// Both blocks refreshed for `mjd`.
    fn blocks_at(&self, mjd: f64) -> PlateResult<ParamBlocks> {
        let mut blocks = self.blocks.ok_or(PlateError::SessionUninitialized)?;
        self.provider.refresh_for_time(&mut blocks.pointing, mjd);
        self.provider.refresh_for_time(&mut blocks.observing, mjd);
        Ok(blocks)
    }

    /// Feasibility check followed by the centre's mount-frame position.
    fn centre_in_mount_frame(
        &self,
        blocks: &ParamBlocks,
        centre_ra: f64,
        centre_dec: f64,
    ) -> PlateResult<(f64, f64)> {
        let check = check_observable(&self.provider, &blocks.pointing, centre_ra, centre_dec);
        if !check.observable {
            debug!(
                zd_deg = check.zenith_distance * RAD_TO_DEG,
                "field centre not observable"
            );
            return Err(PlateError::zenith_distance(
                Body::FieldCentre,
                centre_ra,
                centre_dec,
                blocks.pointing.mjd,
                check.zenith_distance * RAD_TO_DEG,
                ZENITH_DISTANCE_LIMIT_DEG,
            ));
        }
        self.rotator.to_mount_frame(
            &self.provider,
            Body::FieldCentre,
            centre_ra,
            centre_dec,
            &blocks.pointing,
        )
    }

    /// Apparent (RA, Dec) of a target to plate (X, Y) in microns.
    pub fn radec_to_xy(
        &self,
        centre_ra: f64,
        centre_dec: f64,
        ra: f64,
        dec: f64,
        mjd: f64,
    ) -> PlateResult<(f64, f64)> {
        validate_positions(centre_ra, centre_dec, Some((ra, dec)))?;
        let blocks = self.blocks_at(mjd)?;

        let (cmha, cmdec) = self.centre_in_mount_frame(&blocks, centre_ra, centre_dec)?;
        let (mha, mdec) =
            self.rotator
                .to_mount_frame(&self.provider, Body::Target, ra, dec, &blocks.observing)?;

        let (xi, eta) = self.provider.tangent_project(mha, mdec, cmha, cmdec)?;
        Ok(self
            .radial
            .forward(xi, eta, blocks.observing.wavelength_um))
    }

    /// Plate (X, Y) in microns back to apparent (RA, Dec).
    pub fn xy_to_radec(
        &self,
        centre_ra: f64,
        centre_dec: f64,
        x: f64,
        y: f64,
        mjd: f64,
    ) -> PlateResult<(f64, f64)> {
        validate_positions(centre_ra, centre_dec, None)?;
        let blocks = self.blocks_at(mjd)?;

        let (cmha, cmdec) = self.centre_in_mount_frame(&blocks, centre_ra, centre_dec)?;
        let (xi, eta) = self.radial.inverse(x, y, blocks.observing.wavelength_um);
        let (mha, mdec) = self.provider.tangent_deproject(xi, eta, cmha, cmdec);
        let (azimuth, zd) = self.rotator.from_mount_frame(mha, mdec);
        Ok(self
            .provider
            .observed_to_apparent(azimuth, zd, &blocks.observing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::AtmosphereParams;
    use approx::assert_abs_diff_eq;
    use focalplate_astrometry::SphericalAstrometry;

    const MJD: f64 = 59000.3;

    fn setup() -> FieldSetup {
        FieldSetup {
            mjd: MJD,
            dut: 0.0,
            centre_ra: 3.0,
            centre_dec: -0.5,
            pointing_wavelength_um: 0.55,
            observing_wavelength_um: 0.55,
            atmosphere: AtmosphereParams {
                temperature_k: 283.0,
                pressure_mb: 900.0,
                humidity: 0.3,
            },
        }
    }

    fn session() -> FieldTransformSession<SphericalAstrometry> {
        FieldTransformSession::new(
            SphericalAstrometry::new(),
            setup(),
            RadialDistortionParams::default(),
            SessionOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_session_is_initialised() {
        let session = session();
        assert_eq!(session.state(), SessionState::Initialized);
        assert_eq!(session.observing_wavelength(), 0.55);
    }

    #[test]
    fn test_invalid_setup_rejected() {
        let bad = FieldSetup {
            atmosphere: AtmosphereParams {
                pressure_mb: 400.0,
                ..setup().atmosphere
            },
            ..setup()
        };
        let result = FieldTransformSession::new(
            SphericalAstrometry::new(),
            bad,
            RadialDistortionParams::default(),
            SessionOptions::default(),
        );
        assert!(matches!(result, Err(PlateError::IllegalPressure { .. })));
    }

    #[test]
    fn test_centre_maps_to_origin() {
        let session = session();
        let (x, y) = session.radec_to_xy(3.0, -0.5, 3.0, -0.5, MJD).unwrap();
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_round_trip() {
        let session = session();
        let (x, y) = session.radec_to_xy(3.0, -0.5, 3.0005, -0.4995, MJD).unwrap();
        assert!(x.is_finite() && y.is_finite());
        assert!(x.hypot(y) > 1000.0 && x.hypot(y) < 253_000.0);

        let (ra, dec) = session.xy_to_radec(3.0, -0.5, x, y, MJD).unwrap();
        assert_abs_diff_eq!(ra, 3.0005, epsilon = 1e-8);
        assert_abs_diff_eq!(dec, -0.4995, epsilon = 1e-8);
    }

    #[test]
    fn test_illegal_positions() {
        let session = session();
        assert!(matches!(
            session.radec_to_xy(7.0, -0.5, 3.0, -0.5, MJD),
            Err(PlateError::IllegalRa { .. })
        ));
        assert!(matches!(
            session.radec_to_xy(3.0, -0.5, 3.0, -3.5, MJD),
            Err(PlateError::IllegalDec { .. })
        ));
        assert!(matches!(
            session.xy_to_radec(-1.0, -0.5, 0.0, 0.0, MJD),
            Err(PlateError::IllegalRa { .. })
        ));
    }

    #[test]
    fn test_check_observable_leaves_snapshot_untouched() {
        let session = session();
        let blocks = session.blocks_at(MJD).unwrap();
        let before = blocks.pointing;
        let check = check_observable(session.provider(), &blocks.pointing, 3.0, -0.5);
        assert!(check.observable);
        assert_eq!(blocks.pointing, before);
        assert!(!before.refraction.is_none());
    }

    #[test]
    fn test_unobservable_centre() {
        let session = session();
        let err = session.radec_to_xy(3.0, -0.5, 3.0, -0.5, 59000.0).unwrap_err();
        assert!(matches!(
            err,
            PlateError::ZenithDistance {
                body: Body::FieldCentre,
                ..
            }
        ));
    }

    #[test]
    fn test_same_wavelength_is_noop() {
        let mut session = session();
        let before = session.blocks;
        session.set_observing_wavelength(0.55).unwrap();
        assert_eq!(session.state(), SessionState::ReadyForWavelength(0.55));
        assert_eq!(session.blocks, before);
    }

    #[test]
    fn test_wavelength_change_moves_target() {
        let mut session = session();
        let (x1, y1) = session.radec_to_xy(3.0, -0.5, 3.0005, -0.4995, MJD).unwrap();
        session.set_observing_wavelength(0.4).unwrap();
        assert_eq!(session.state(), SessionState::ReadyForWavelength(0.4));
        let (x2, y2) = session.radec_to_xy(3.0, -0.5, 3.0005, -0.4995, MJD).unwrap();
        assert!((x1 - x2).hypot(y1 - y2) > 0.01);
    }

    #[test]
    fn test_failed_wavelength_uninitialises() {
        let mut session = session();
        let err = session.set_observing_wavelength(1.5).unwrap_err();
        assert!(matches!(err, PlateError::IllegalWavelength { .. }));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(matches!(
            session.radec_to_xy(3.0, -0.5, 3.0005, -0.4995, MJD),
            Err(PlateError::SessionUninitialized)
        ));
        assert!(matches!(
            session.set_observing_wavelength(0.6),
            Err(PlateError::SessionUninitialized)
        ));

        session.reinitialize().unwrap();
        assert_eq!(session.state(), SessionState::Initialized);
        assert_eq!(session.observing_wavelength(), 0.55);
        assert!(session.radec_to_xy(3.0, -0.5, 3.0005, -0.4995, MJD).is_ok());
    }

    #[test]
    fn test_session_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<FieldTransformSession<SphericalAstrometry>>();
    }
}
