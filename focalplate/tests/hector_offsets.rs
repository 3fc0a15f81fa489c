use approx::assert_abs_diff_eq;
use focalplate::{
    AtmosphereParams, FieldSetup, FieldTransformSession, HectorOffsetCorrector, InstrumentConfig,
    RadialDistortionParams, SessionOptions, ThermalExpansion,
};
use focalplate_astrometry::{AstrometryProvider, SphericalAstrometry};

const CENTRE_RA: f64 = 3.0;
const CENTRE_DEC: f64 = -0.5;
const MJD: f64 = 59000.3;

fn session() -> FieldTransformSession<SphericalAstrometry> {
    let setup = FieldSetup {
        mjd: MJD,
        dut: 0.2,
        centre_ra: CENTRE_RA,
        centre_dec: CENTRE_DEC,
        pointing_wavelength_um: 0.6,
        observing_wavelength_um: 0.55,
        atmosphere: AtmosphereParams {
            temperature_k: 285.0,
            pressure_mb: 890.0,
            humidity: 0.45,
        },
    };
    FieldTransformSession::new(
        SphericalAstrometry::new(),
        setup,
        RadialDistortionParams::default(),
        SessionOptions::default(),
    )
    .unwrap()
}

/// A target roughly `separation_deg` from the centre in direction `angle_deg`.
fn target(separation_deg: f64, angle_deg: f64) -> (f64, f64) {
    let separation = separation_deg.to_radians();
    let angle = angle_deg.to_radians();
    (
        CENTRE_RA + separation * angle.cos() / CENTRE_DEC.cos(),
        CENTRE_DEC + separation * angle.sin(),
    )
}

#[test]
fn offsets_round_trip_in_every_zone() {
    let session = session();
    let corrector = HectorOffsetCorrector::default();
    for (i, &separation) in [0.2, 0.5, 0.7, 0.9, 1.1].iter().enumerate() {
        let (ra, dec) = target(separation, 40.0 + 65.0 * i as f64);
        let (x, y) = corrector
            .to_xy(&session, CENTRE_RA, CENTRE_DEC, ra, dec, MJD)
            .unwrap();
        let (ra2, dec2) = corrector
            .to_radec(&session, CENTRE_RA, CENTRE_DEC, x, y, MJD)
            .unwrap();
        assert_abs_diff_eq!(ra2, ra, epsilon = 1e-8);
        assert_abs_diff_eq!(dec2, dec, epsilon = 1e-8);
    }
}

#[test]
fn offset_moves_target_radially() {
    let session = session();
    let corrector = HectorOffsetCorrector::default();
    let (ra, dec) = target(0.9, 10.0);
    let (x0, y0) = session
        .radec_to_xy(CENTRE_RA, CENTRE_DEC, ra, dec, MJD)
        .unwrap();
    let (x1, y1) = corrector
        .to_xy(&session, CENTRE_RA, CENTRE_DEC, ra, dec, MJD)
        .unwrap();

    let separation = session
        .provider()
        .angular_separation(CENTRE_RA, CENTRE_DEC, ra, dec)
        .to_degrees();
    let expected = corrector.zone_offset(separation).combined();
    assert!(expected > 9.0);
    assert_abs_diff_eq!(x1.hypot(y1) - x0.hypot(y0), expected, epsilon = 1e-6);
    assert_abs_diff_eq!(y1.atan2(x1), y0.atan2(x0), epsilon = 1e-12);
}

#[test]
fn thermal_expansion_round_trips() {
    let session = session();
    let corrector = HectorOffsetCorrector::default().with_thermal(Some(ThermalExpansion {
        config_temperature_c: 21.0,
        observing_temperature_c: 9.5,
        cte_ppm_per_k: 11.5,
    }));
    let plain = HectorOffsetCorrector::default();
    let (ra, dec) = target(0.95, 200.0);

    let (x, y) = corrector
        .to_xy(&session, CENTRE_RA, CENTRE_DEC, ra, dec, MJD)
        .unwrap();
    let (xp, yp) = plain
        .to_xy(&session, CENTRE_RA, CENTRE_DEC, ra, dec, MJD)
        .unwrap();
    // 11.5 ppm/K over 11.5 K.
    assert_abs_diff_eq!(x.hypot(y) / xp.hypot(yp), 1.0 + 11.5 * 11.5e-6, epsilon = 1e-12);

    let (ra2, dec2) = corrector
        .to_radec(&session, CENTRE_RA, CENTRE_DEC, x, y, MJD)
        .unwrap();
    assert_abs_diff_eq!(ra2, ra, epsilon = 1e-8);
    assert_abs_diff_eq!(dec2, dec, epsilon = 1e-8);
}

#[test]
fn zone_crossing_uses_second_zone_offset_once() {
    let session = session();
    let corrector = HectorOffsetCorrector::default();
    // Just outside the zone 1/2 boundary. Removing the zone 2 offset (+1.5 um)
    // drops the position into zone 1, whose offset (-3 um) is then applied
    // to the original position instead.
    let (ra, dec) = (CENTRE_RA, CENTRE_DEC + (0.396f64 + 1e-6).to_radians());
    let (x, y) = session
        .radec_to_xy(CENTRE_RA, CENTRE_DEC, ra, dec, MJD)
        .unwrap();
    assert_eq!(corrector.zone_offset(0.396 + 1e-6).zone, 2);

    let resolved = corrector
        .apply_to_radec(&session, CENTRE_RA, CENTRE_DEC, x, y, MJD)
        .unwrap();

    let radius = x.hypot(y);
    let factor = (radius + 3.0) / radius;
    let expected = session
        .xy_to_radec(CENTRE_RA, CENTRE_DEC, x * factor, y * factor, MJD)
        .unwrap();
    assert_abs_diff_eq!(resolved.0, expected.0, epsilon = 1e-14);
    assert_abs_diff_eq!(resolved.1, expected.1, epsilon = 1e-14);
}

#[test]
fn configured_corrector_matches_defaults() {
    let session = session();
    let configured = InstrumentConfig::default().hector_corrector(None).unwrap();
    let default = HectorOffsetCorrector::default();
    let (ra, dec) = target(0.75, 300.0);
    assert_eq!(
        configured
            .to_xy(&session, CENTRE_RA, CENTRE_DEC, ra, dec, MJD)
            .unwrap(),
        default
            .to_xy(&session, CENTRE_RA, CENTRE_DEC, ra, dec, MJD)
            .unwrap()
    );
}
