//! Integration tests for tr-deffile: load, edit, save, reload.

use tr_deffile::{DefFile, save_lines, splice_parameter};

const SAMPLE: &str = "\
# rotcur model for NGC 2403
INSET= n2403.fits
OUTSET= n2403_out.fits
LOOPS= 1
NUR= 4
RADI= 0.00E+00 4.00E+01 8.00E+01 1.20E+02
VROT= 2.00E+01 1.00E+02 1.20E+02 1.25E+02
INCL= 6.10E+01 6.10E+01 6.10E+01 6.10E+01
ACTION= 0
";

#[test]
fn edit_one_parameter_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.def");
    std::fs::write(&path, SAMPLE).unwrap();

    let mut def = DefFile::load(&path).unwrap();
    assert_eq!(def.ring_count, 4);

    let mut values = def.parameter("VROT").unwrap().values.clone();
    values[3] = 130.0;
    splice_parameter(&mut def.lines, "VROT", &values, 2, "km s-1");
    save_lines(&path, &def.lines).unwrap();

    let reloaded = DefFile::load(&path).unwrap();
    assert_eq!(
        reloaded.parameter("VROT").unwrap().values,
        vec![20.0, 100.0, 120.0, 130.0]
    );
    // untouched lines survive byte-for-byte
    assert_eq!(reloaded.lines[0], "# rotcur model for NGC 2403");
    assert_eq!(reloaded.lines[2], "OUTSET= n2403_out.fits");
    assert_eq!(reloaded.inset, "n2403.fits");
}

#[test]
fn new_parameter_appends_with_unit_comment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.def");
    std::fs::write(&path, SAMPLE).unwrap();

    let mut def = DefFile::load(&path).unwrap();
    splice_parameter(&mut def.lines, "SDIS", &[8.0, 8.0, 8.0, 8.0], 1, "km s-1");
    save_lines(&path, &def.lines).unwrap();

    let reloaded = DefFile::load(&path).unwrap();
    assert_eq!(
        reloaded.parameter("SDIS").unwrap().values,
        vec![8.0, 8.0, 8.0, 8.0]
    );
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("# SDIS parameter in km s-1"));
}
