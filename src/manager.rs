use crate::config::Config;
use crate::engine::{ConfigStore, Engine, MetricsSink, Outcome, Outputs, Renderer};
use crate::metrics::MetricsTable;
use crate::model::{Food, Organism};
use anyhow::{Context, Result};
use glob::glob;
use rmp_serde::encode;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    /// Perform the configured number of runs, each in a new run dir.
    pub fn create_runs(&self) -> Result<Vec<Outcome>> {
        let first_idx = self.count_run_dirs().context("failed to count run dirs")?;
        (first_idx..first_idx + self.cfg.run.runs)
            .map(|run_idx| {
                self.create_run(run_idx)
                    .with_context(|| format!("failed to perform run {run_idx}"))
            })
            .collect()
    }

    fn create_run(&self, run_idx: usize) -> Result<Outcome> {
        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        let mut engine = Engine::generate_initial_condition(self.cfg.clone(), run_idx)
            .context("failed to generate initial condition")?;

        let mut trajectory = TrajectoryWriter::create(run_dir.join("trajectory.msgpack"))?;
        let mut metrics = MetricsWriter::new(run_dir);
        let mut configs = ConfigWriter::new(self.sim_dir.clone());
        let run_name = format!("run-{run_idx:04}");

        let outcome = engine.run(
            run_idx,
            &run_name,
            Outputs {
                renderer: &mut trajectory,
                metrics_sink: &mut metrics,
                config_store: &mut configs,
            },
        )?;
        trajectory.finish()?;
        log::info!(
            "run {run_idx} stopped after epoch {} with {} organisms",
            engine.epoch(),
            engine.organisms().len()
        );

        Ok(outcome)
    }

    pub fn clean_sim(&self) -> Result<()> {
        for run_dir in self.run_dirs()? {
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }
        Ok(())
    }

    fn run_dirs(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let dirs = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .collect();
        Ok(dirs)
    }

    fn count_run_dirs(&self) -> Result<usize> {
        Ok(self.run_dirs()?.len())
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }
}

#[derive(Serialize)]
struct Frame<'a> {
    epoch: usize,
    step: usize,
    organisms: &'a [Organism],
    food: &'a [Food],
}

/// Writes every drawn frame as a MessagePack record.
pub struct TrajectoryWriter {
    writer: BufWriter<File>,
}

impl TrajectoryWriter {
    pub fn create<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .context("failed to flush writer stream")
    }
}

impl Renderer for TrajectoryWriter {
    fn draw(
        &mut self,
        organisms: &[Organism],
        food: &[Food],
        step: usize,
        epoch: usize,
    ) -> Result<()> {
        log::debug!(
            "frame epoch {epoch} step {step}: {} organisms, {} food",
            organisms.len(),
            food.len()
        );
        let frame = Frame {
            epoch,
            step,
            organisms,
            food,
        };
        encode::write(&mut self.writer, &frame).context("failed to serialize frame")?;
        Ok(())
    }
}

/// Writes the metrics table of a run into its run dir.
pub struct MetricsWriter {
    run_dir: PathBuf,
}

impl MetricsWriter {
    pub fn new(run_dir: PathBuf) -> Self {
        Self { run_dir }
    }
}

impl MetricsSink for MetricsWriter {
    fn write(&mut self, run_idx: usize, metrics: &MetricsTable) -> Result<()> {
        let file = self.run_dir.join("metrics.msgpack");
        let mut writer = BufWriter::new(
            File::create(&file).with_context(|| format!("failed to create {file:?}"))?,
        );
        encode::write(&mut writer, metrics).context("failed to serialize metrics")?;
        writer.flush().context("failed to flush writer stream")?;

        let file = self.run_dir.join("metrics.json");
        let writer = BufWriter::new(
            File::create(&file).with_context(|| format!("failed to create {file:?}"))?,
        );
        serde_json::to_writer_pretty(writer, metrics).context("failed to serialize metrics")?;

        log::info!("wrote metrics of run {run_idx} to {:?}", self.run_dir);
        Ok(())
    }
}

/// Writes the config of each run to `<sim_dir>/<run_name>/config.toml`.
pub struct ConfigWriter {
    sim_dir: PathBuf,
}

impl ConfigWriter {
    pub fn new(sim_dir: PathBuf) -> Self {
        Self { sim_dir }
    }
}

impl ConfigStore for ConfigWriter {
    fn persist(&mut self, cfg: &Config, run_name: &str) -> Result<()> {
        let file = self.sim_dir.join(run_name).join("config.toml");
        fs::write(&file, cfg.to_toml()?).with_context(|| format!("failed to write {file:?}"))?;
        Ok(())
    }
}
