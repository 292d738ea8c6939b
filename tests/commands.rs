use skylens::command::{Command, CommandError};
use skylens::config::Config;
use skylens::scene::Scene;
use skylens::{Viewer, ViewerError};

use std::path::Path;

const SCENE: &str = r#"
[image]
width = 4
height = 2
samples = [0.0, 1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 13.0]

[wcs]
crpix = [2.5, 1.5]
crval = [83.633083, 22.0145]
cdelt = [-0.0002777778, 0.0002777778]
"#;

fn viewer() -> Viewer {
    let settings = Config::parse("viewport = [40, 20]").unwrap().settings().unwrap();
    let image = Scene::parse(SCENE).unwrap().into_image(Path::new(".")).unwrap();

    let mut viewer = Viewer::new(settings);
    viewer.load_image(image);
    viewer
}

/// Run a script, collecting the outputs
fn run_script(viewer: &mut Viewer, script: &str) -> Result<Vec<String>, CommandError> {
    let mut outputs = Vec::new();
    for line in script.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(output) = line.parse::<Command>()?.run(viewer)? {
            outputs.push(output);
        }
    }
    Ok(outputs)
}

#[test]
fn probe_reads_values_and_coordinates() {
    let mut viewer = viewer();

    // Center of the 40x20 viewport is the center of the image, on the reference point
    let outputs = run_script(&mut viewer, "probe 20 10\nprobe 18.5 9.5").unwrap();

    assert_eq!(
        outputs[0],
        "x: 2.50, y: 1.50  value: 12  RA: 05:34:31.94 (83.633083)  Dec: +22:00:52.20 (22.014500)"
    );
    // Top-left pixel of the display is the last row of the samples
    assert!(outputs[1].starts_with("x: 1.00, y: 2.00  value: 10"));
}

#[test]
fn lock_flow() {
    let mut viewer = viewer();

    let outputs = run_script(
        &mut viewer,
        "
        scale 3
        pan 4 -2
        lock
        rotate 15
        state
        lock
        state
        ",
    )
    .unwrap();

    assert_eq!(outputs[0], "locked");
    assert!(outputs[1].contains("wcs locked"));
    assert!(outputs[1].contains("sky rotation: 15.00° ccw"));
    assert_eq!(outputs[2], "unlocked");
    assert!(outputs[3].starts_with("scale: 3.000, offset: (4.00, -2.00), rotation: 0.00° cw, flip: --"));
    assert!(!outputs[3].contains("wcs locked"));
}

#[test]
fn flip_is_refused_while_locked() {
    let mut viewer = viewer();
    run_script(&mut viewer, "lock").unwrap();

    assert!(matches!(
        run_script(&mut viewer, "flip h"),
        Err(CommandError::Viewer(ViewerError::OrientationLocked))
    ));
}

#[test]
fn drag_script_pans_per_frame() {
    let mut viewer = viewer();

    let outputs = run_script(
        &mut viewer,
        "
        down 10 10
        move 12 10
        move 15 11
        state
        frame
        move 16 11
        up window
        state
        ",
    )
    .unwrap();

    assert!(outputs[0].contains("offset: (0.00, 0.00)"));
    assert!(outputs[1].contains("offset: (6.00, 1.00)"));
}

#[test]
fn compass_reports_sky_axes() {
    let mut viewer = viewer();

    let outputs = run_script(&mut viewer, "compass\nflip h\ncompass").unwrap();

    assert_eq!(outputs[0], "X: 0.00  Y: 270.00  N: 270.00  E: 180.00");
    assert_eq!(outputs[1], "X: 180.00  Y: 270.00  N: 270.00  E: 0.00");
}
