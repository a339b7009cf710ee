use crate::history::TrainingHistory;
use anyhow::Result;
use std::io::{Stdout, Write, stdout};
use std::ops::Range;

/// Everything observable about a single training iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub episode: usize,
    pub mu: f32,
    pub sigma: f32,
    pub action: f32,
    pub reward: f32,
    pub loss: f32,
    pub target: f32,
}

/// Fixed iteration budget with a report every `report_interval` iterations, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningSchedule {
    pub total_iterations: usize,
    pub report_interval: usize,
}

impl Default for LearningSchedule {
    fn default() -> Self {
        Self::iteration_bound(10_001, 100)
    }
}

impl LearningSchedule {
    pub fn iteration_bound(total_iterations: usize, report_interval: usize) -> Self {
        Self {
            total_iterations,
            report_interval,
        }
    }

    pub fn episodes(&self) -> Range<usize> {
        0..self.total_iterations
    }

    pub fn should_report(&self, episode: usize) -> bool {
        self.report_interval != 0 && episode % self.report_interval == 0
    }

    pub fn total_reports(&self) -> usize {
        self.episodes().filter(|e| self.should_report(*e)).count()
    }
}

/// Callbacks injected into the training loop. They only observe, they never feed back into
/// training.
pub trait TrainingHooks {
    fn init_hook(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called on every reported iteration, after `history` already contains `report`.
    fn report_hook(&mut self, report: &StepReport, history: &TrainingHistory) -> Result<()>;

    fn shutdown_hook(&mut self, _history: &TrainingHistory) -> Result<()> {
        Ok(())
    }
}

impl TrainingHooks for () {
    fn report_hook(&mut self, _report: &StepReport, _history: &TrainingHistory) -> Result<()> {
        Ok(())
    }
}

impl<H: TrainingHooks + ?Sized> TrainingHooks for Box<H> {
    fn init_hook(&mut self) -> Result<()> {
        (**self).init_hook()
    }

    fn report_hook(&mut self, report: &StepReport, history: &TrainingHistory) -> Result<()> {
        (**self).report_hook(report, history)
    }

    fn shutdown_hook(&mut self, history: &TrainingHistory) -> Result<()> {
        (**self).shutdown_hook(history)
    }
}

impl<H: TrainingHooks> TrainingHooks for Option<H> {
    fn init_hook(&mut self) -> Result<()> {
        match self {
            Some(hooks) => hooks.init_hook(),
            None => Ok(()),
        }
    }

    fn report_hook(&mut self, report: &StepReport, history: &TrainingHistory) -> Result<()> {
        match self {
            Some(hooks) => hooks.report_hook(report, history),
            None => Ok(()),
        }
    }

    fn shutdown_hook(&mut self, history: &TrainingHistory) -> Result<()> {
        match self {
            Some(hooks) => hooks.shutdown_hook(history),
            None => Ok(()),
        }
    }
}

// runs the left hooks first
impl<A: TrainingHooks, B: TrainingHooks> TrainingHooks for (A, B) {
    fn init_hook(&mut self) -> Result<()> {
        self.0.init_hook()?;
        self.1.init_hook()
    }

    fn report_hook(&mut self, report: &StepReport, history: &TrainingHistory) -> Result<()> {
        self.0.report_hook(report, history)?;
        self.1.report_hook(report, history)
    }

    fn shutdown_hook(&mut self, history: &TrainingHistory) -> Result<()> {
        self.0.shutdown_hook(history)?;
        self.1.shutdown_hook(history)
    }
}

/// Prints the labelled diagnostics block of every reported iteration.
pub struct ConsoleHooks<W: Write = Stdout> {
    out: W,
}

impl ConsoleHooks<Stdout> {
    pub fn new() -> Self {
        Self { out: stdout() }
    }
}

impl Default for ConsoleHooks<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleHooks<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TrainingHooks for ConsoleHooks<W> {
    fn report_hook(&mut self, report: &StepReport, _history: &TrainingHistory) -> Result<()> {
        writeln!(self.out, "\n======episode {} ======", report.episode)?;
        writeln!(self.out, "mu {:?}", report.mu)?;
        writeln!(self.out, "sigma {:?}", report.sigma)?;
        writeln!(self.out, "action {:?}", report.action)?;
        writeln!(self.out, "reward {:?}", report.reward)?;
        writeln!(self.out, "loss {:?}", report.loss)?;
        self.out.flush()?;
        Ok(())
    }
}
