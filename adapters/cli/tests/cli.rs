use std::process::Command;

fn lemming_defence() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lemming-defence"))
}

#[test]
fn seeded_run_prints_the_map_and_route() {
    let output = lemming_defence()
        .args(["--seed", "3"])
        .output()
        .expect("binary runs");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.starts_with("seed 3: 20x20 map"), "{stdout}");
    assert!(stdout.contains('A'));
    assert!(stdout.contains('Z'));
    assert!(stdout.contains("Walker route:"));
    assert!(stdout.contains('*'));
}

#[test]
fn same_seed_prints_the_same_map() {
    let run = || {
        lemming_defence()
            .args(["--seed", "11", "--width", "16", "--height", "12"])
            .output()
            .expect("binary runs")
            .stdout
    };

    assert_eq!(run(), run());
}

#[test]
fn simulation_reports_arrivals() {
    let output = lemming_defence()
        .args(["--seed", "8", "--simulate", "2"])
        .output()
        .expect("binary runs");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.contains("2/2 lemmings reached the end"), "{stdout}");
}

#[test]
fn missing_config_file_fails() {
    let output = lemming_defence()
        .args(["--config", "/nonexistent/lemming-defence.toml"])
        .output()
        .expect("binary runs");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("configuration file"), "{stderr}");
}

#[test]
fn undersized_grid_fails() {
    let output = lemming_defence()
        .args(["--seed", "1", "--width", "4"])
        .output()
        .expect("binary runs");

    assert!(!output.status.success());
}
