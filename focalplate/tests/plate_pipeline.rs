use approx::assert_abs_diff_eq;
use focalplate::{
    AtmosphereParams, FieldSetup, FieldTransformSession, GridSource, InstrumentConfig,
    LinearCoefficients, LinearModelParams, LinearPlateModel, PlateError, PlateParameters,
    RadialDistortionParams,
};
use focalplate_astrometry::SphericalAstrometry;
use std::fmt::Write as _;
use std::path::Path;

const MJD: f64 = 59000.32;

fn write_grid(path: &Path, dx: f64, dy: f64) {
    let mut text = String::from("# gx gy ix iy dx dy\n");
    for iy in 0..23 {
        for ix in 0..23 {
            let gx = ix as f64 * 23_000.0 - 253_000.0;
            let gy = iy as f64 * 23_000.0 - 253_000.0;
            writeln!(text, "{gx:.1} {gy:.1} {ix} {iy} {dx} {dy}").unwrap();
        }
    }
    std::fs::write(path, text).unwrap();
}

fn parameters() -> PlateParameters {
    PlateParameters {
        radial: RadialDistortionParams {
            x0: 40.0,
            y0: -25.0,
            ..RadialDistortionParams::default()
        },
        linear: LinearModelParams {
            coefficients: LinearCoefficients {
                a: -310.0,
                b: 0.99987,
                c: 0.0012,
                d: 145.0,
                e: -0.0011,
                f: 1.00021,
            },
            extra_scale: 0.99995,
            extra_rotation_deg: -0.015,
            extra_nonperp_deg: 0.004,
        },
    }
}

fn session(radial: RadialDistortionParams) -> FieldTransformSession<SphericalAstrometry> {
    let setup = FieldSetup {
        mjd: MJD,
        dut: -0.1,
        centre_ra: 3.0,
        centre_dec: -0.5,
        pointing_wavelength_um: 0.55,
        observing_wavelength_um: 0.65,
        atmosphere: AtmosphereParams {
            temperature_k: 281.0,
            pressure_mb: 895.0,
            humidity: 0.0,
        },
    };
    let config = InstrumentConfig::default();
    FieldTransformSession::new(SphericalAstrometry::new(), setup, radial, config.session_options())
        .unwrap()
}

#[test]
fn sky_to_positioner_and_back() {
    let dir = tempfile::tempdir().unwrap();
    let param_path = dir.path().join("plate0.toml");
    parameters().save(&param_path).unwrap();
    write_grid(&dir.path().join("distortion_map.txt"), 1.2, -0.7);

    let params = PlateParameters::load(&param_path).unwrap();
    let config = InstrumentConfig::default();
    let model = LinearPlateModel::new(params.linear, config.grid_source(&param_path)).unwrap();
    let session = session(params.radial);

    for &(ra, dec) in &[(3.0005, -0.4995), (3.012, -0.51), (2.99, -0.492)] {
        let (x, y) = session.radec_to_xy(3.0, -0.5, ra, dec, MJD).unwrap();
        let (xp, yp) = model.plate_to_positioner(x, y).unwrap();
        let (x2, y2) = model.positioner_to_plate(xp, yp).unwrap();
        assert_abs_diff_eq!(x2, x, epsilon = 1e-6);
        assert_abs_diff_eq!(y2, y, epsilon = 1e-6);

        let (ra2, dec2) = session.xy_to_radec(3.0, -0.5, x2, y2, MJD).unwrap();
        assert_abs_diff_eq!(ra2, ra, epsilon = 1e-8);
        assert_abs_diff_eq!(dec2, dec, epsilon = 1e-8);
    }
    assert!(model.grid().unwrap().is_loaded());
}

#[test]
fn negated_grid_from_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let grid_path = dir.path().join("custom_map.txt");
    write_grid(&grid_path, 2.0, 1.0);

    let grid_setting = grid_path.display().to_string();
    let config = InstrumentConfig::default().with_overrides(|name| match name {
        "HECTOR_DISTORTION_MAP" => Some(grid_setting.clone()),
        "HECTOR_NEGATE_DISTORTION_MAP" => Some("yes".to_string()),
        _ => None,
    });
    let source = config.grid_source(&dir.path().join("plate0.toml"));
    assert_eq!(
        source,
        GridSource::File {
            path: grid_path.clone(),
            negate: true
        }
    );

    let model = LinearPlateModel::new(LinearModelParams::default(), source).unwrap();
    assert_eq!(model.plate_to_positioner(500.0, 500.0).unwrap(), (498.0, 499.0));
}

#[test]
fn averaged_parameters_sit_between_plates() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("plate0.toml");
    let second = dir.path().join("plate1.toml");
    parameters().save(&first).unwrap();
    PlateParameters::default().save(&second).unwrap();

    let mean = PlateParameters::load_averaged(&first, &second).unwrap();
    let a = LinearPlateModel::new(parameters().linear, GridSource::None).unwrap();
    let b = LinearPlateModel::new(LinearModelParams::default(), GridSource::None).unwrap();
    let m = LinearPlateModel::new(mean.linear, GridSource::None).unwrap();

    let (xa, _) = a.plate_to_positioner(100_000.0, 0.0).unwrap();
    let (xb, _) = b.plate_to_positioner(100_000.0, 0.0).unwrap();
    let (xm, _) = m.plate_to_positioner(100_000.0, 0.0).unwrap();
    assert!(xm > xa.min(xb) && xm < xa.max(xb));
}

#[test]
fn malformed_grid_is_reported_on_first_use() {
    let dir = tempfile::tempdir().unwrap();
    let param_path = dir.path().join("plate0.toml");
    std::fs::write(dir.path().join("distortion_map.txt"), "# empty\n0 0 0 0 0\n").unwrap();

    let model = parameters().linear_model_beside(&param_path, false).unwrap();
    let err = model.positioner_to_plate(0.0, 0.0).unwrap_err();
    assert!(matches!(err, PlateError::DistortionMap { .. }));
    assert!(err.to_string().contains("columns"));
}
