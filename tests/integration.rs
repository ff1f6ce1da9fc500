use std::{env, fs, path::PathBuf, process::Command};

const CONFIG: &str = r#"
[arena]
size_x = 100.0
size_y = 100.0

[init]
pop_size = 20
altruistic_fraction = 0.5
velocity = 4.0
altruism = 0.5
energy = 10.0
energy_release_rate = 0.1
longevity = 3

[model]
competition = "pursuit"
altruism = "sharing"
reproduction_factor = 40.0
mutation_chance = 10.0
mutability = 1.2
feeding_range = 5.0
meal_cap = 2
starvation = true
energy_limited = false
effortless_movement = true

[food]
abundance = 1.5
static_generation = false

[rewards]
cooperative_share = 0.6
conflict_cost = 0.2
selfish_take = 0.8
leftovers = 0.2

[run]
runs = 2
max_epochs = 10
max_steps_per_epoch = 60
render_every = 5
seed = 42
"#;

fn run_bin(args: &[&str]) -> std::process::Output {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_forage"));

    Command::new(bin)
        .args(args)
        .output()
        .expect("failed to execute command")
}

fn assert_success(output: &std::process::Output, args: &[&str]) {
    let stdout_str = String::from_utf8_lossy(&output.stdout);
    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    fs::write(test_dir.join("config.toml"), CONFIG).expect("failed to write config file");

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");

    let args = ["--sim-dir", test_dir_str, "create"];
    assert_success(&run_bin(&args), &args);

    for run_name in ["run-0000", "run-0001"] {
        let run_dir = test_dir.join(run_name);
        for file in ["config.toml", "metrics.msgpack", "metrics.json", "trajectory.msgpack"] {
            assert!(run_dir.join(file).is_file(), "missing {run_name}/{file}");
        }

        let metrics = fs::read_to_string(run_dir.join("metrics.json"))
            .expect("failed to read metrics");
        let metrics: serde_json::Value =
            serde_json::from_str(&metrics).expect("failed to parse metrics");
        assert_eq!(metrics["0"]["population_size"], 20);

        let run_config = fs::read_to_string(run_dir.join("config.toml"))
            .expect("failed to read run config");
        assert!(run_config.contains("[rewards]"), "run config:\n{run_config}");
    }
    assert!(!test_dir.join("run-0000").join("run-0000").exists());

    let args = ["--sim-dir", test_dir_str, "create"];
    assert_success(&run_bin(&args), &args);
    assert!(test_dir.join("run-0003").is_dir());

    let args = ["--sim-dir", test_dir_str, "clean"];
    assert_success(&run_bin(&args), &args);
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn invalid_config_is_rejected() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("invalid_config");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    let config = CONFIG.replace("leftovers = 0.2", "leftovers = 0.9");
    fs::write(test_dir.join("config.toml"), config).expect("failed to write config file");

    let test_dir_str = test_dir
        .to_str()
        .expect("failed to convert test directory to string");
    let output = run_bin(&["--sim-dir", test_dir_str, "create"]);

    assert!(!output.status.success());
    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(stderr_str.contains("selfish take"), "stderr:\n{stderr_str}");
    assert!(!test_dir.join("run-0000").exists());

    fs::remove_dir_all(&test_dir).ok();
}
