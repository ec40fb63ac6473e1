use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;
use xtbatch::engine::progress::{Progress, ProgressCallback};

const SPINNER_TICK_MS: u64 = 80;

/// The progress bar currently on screen, if any, shared with the log writer.
#[derive(Clone, Default)]
pub struct ActiveBar(Arc<Mutex<Option<ProgressBar>>>);

impl ActiveBar {
    pub fn set(&self, bar: Option<ProgressBar>) {
        match self.0.lock() {
            Ok(mut slot) => *slot = bar,
            Err(_) => warn!("Active progress bar mutex was poisoned."),
        }
    }

    /// Runs `f` with the bar cleared from the terminal and redraws it afterwards.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        let bar = self.0.lock().ok().and_then(|slot| slot.clone());
        match bar {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }
}

/// Renders core progress events as a single stderr progress bar.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: ProgressBar,
    phase: Arc<Mutex<&'static str>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), target).with_style(Self::spinner_style());
        Self {
            pb,
            phase: Arc::new(Mutex::new("")),
        }
    }

    /// Registers this handler's bar so log output is printed around it.
    pub fn attach(&self, active: &ActiveBar) {
        active.set(Some(self.pb.clone()));
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb = self.pb.clone();
        let phase = self.phase.clone();

        Box::new(move |progress: Progress| match progress {
            Progress::PhaseStart { name } => {
                match phase.lock() {
                    Ok(mut current) => *current = name,
                    Err(_) => warn!("Progress phase mutex was poisoned."),
                }
                pb.reset();
                pb.set_length(0);
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                pb.set_prefix(name);
                pb.set_message("");
            }
            Progress::TaskStart { total_steps } => {
                pb.disable_steady_tick();
                pb.set_length(total_steps);
                pb.set_position(0);
                pb.set_style(Self::bar_style());
            }
            Progress::StatusUpdate { text } => pb.set_message(text),
            Progress::TaskIncrement => pb.inc(1),
            Progress::TaskFinish => {
                if let Some(len) = pb.length() {
                    pb.set_position(len);
                }
            }
            Progress::PhaseFinish => {
                let name = phase.lock().map(|current| *current).unwrap_or_default();
                pb.disable_steady_tick();
                pb.finish_with_message(format!("✓ {} done", name));
            }
            Progress::Message(msg) => pb.println(format!("  {}", msg)),
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {prefix} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{prefix} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed_precise}) {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
