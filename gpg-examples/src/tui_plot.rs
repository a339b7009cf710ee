use anyhow::Result;
use gpg_core::{
    history::TrainingHistory,
    hooks::{StepReport, TrainingHooks},
};
use ratatui::{
    DefaultTerminal, Frame,
    buffer::Buffer,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    layout::{Constraint, Rect},
    style::{Color, Style, Stylize},
    symbols,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

const SERIES_COLORS: [Color; 4] = [Color::Blue, Color::Green, Color::Yellow, Color::Red];

/// Shows the history as a line chart on every report and blocks until a key dismisses it.
#[derive(Debug, Default)]
pub struct TuiPlotHooks;

impl TrainingHooks for TuiPlotHooks {
    fn report_hook(&mut self, report: &StepReport, history: &TrainingHistory) -> Result<()> {
        let mut terminal = ratatui::init();
        let shown = show_until_dismissed(&mut terminal, &HistoryChart::new(history, report.episode));
        ratatui::restore();
        shown
    }
}

fn show_until_dismissed(terminal: &mut DefaultTerminal, chart: &HistoryChart) -> Result<()> {
    loop {
        terminal.draw(|frame: &mut Frame| frame.render_widget(chart, frame.area()))?;
        if let Event::Key(key_event) = event::read()? {
            if dismisses(key_event) {
                return Ok(());
            }
        }
    }
}

fn dismisses(key_event: KeyEvent) -> bool {
    key_event.kind == KeyEventKind::Press
        && matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter
        )
}

pub struct HistoryChart<'a> {
    history: &'a TrainingHistory,
    episode: usize,
}

impl<'a> HistoryChart<'a> {
    pub fn new(history: &'a TrainingHistory, episode: usize) -> Self {
        Self { history, episode }
    }
}

impl Widget for &HistoryChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let series = self.history.series();
        if series[0].1.is_empty() {
            Line::from("Waiting for data to render").render(area, buf);
            return;
        }
        let datasets: Vec<Dataset> = series
            .iter()
            .zip(SERIES_COLORS)
            .map(|((name, points), color)| {
                Dataset::default()
                    .name(*name)
                    .marker(symbols::Marker::Braille)
                    .style(Style::new().fg(color))
                    .graph_type(GraphType::Line)
                    .data(points)
            })
            .collect();
        let x_bounds = episode_bounds(self.history);
        let y_bounds = value_bounds(&series);
        let title = format!(
            "Gaussian bandit at episode {} (q, Esc or Enter to continue)",
            self.episode
        );
        let chart = Chart::new(datasets)
            .block(Block::default().title(title).borders(Borders::ALL))
            .x_axis(
                Axis::default()
                    .title("Episode")
                    .style(Style::default().gray())
                    .bounds(x_bounds)
                    .labels(axis_labels(x_bounds, 0)),
            )
            .y_axis(
                Axis::default()
                    .title("Parameter value")
                    .style(Style::default().gray())
                    .bounds(y_bounds)
                    .labels(axis_labels(y_bounds, 2)),
            )
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));
        chart.render(area, buf);
    }
}

/// First and last recorded episode, widened by one when only a single report exists.
pub fn episode_bounds(history: &TrainingHistory) -> [f64; 2] {
    let first = history.episodes.first().copied().unwrap_or(0) as f64;
    let last = history.episodes.last().copied().unwrap_or(0) as f64;
    if last > first {
        [first, last]
    } else {
        [first, first + 1.]
    }
}

/// Smallest and largest value over all series, padded when the range is flat.
pub fn value_bounds(series: &[(&'static str, Vec<(f64, f64)>)]) -> [f64; 2] {
    let values = series.iter().flat_map(|(_, points)| points.iter().map(|(_, y)| *y));
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), y| {
        (low.min(y), high.max(y))
    });
    if !low.is_finite() || !high.is_finite() {
        return [0., 1.];
    }
    if high - low < f64::EPSILON {
        return [low - 0.5, high + 0.5];
    }
    [low, high]
}

/// Low, middle and high tick labels.
pub fn axis_labels(bounds: [f64; 2], precision: usize) -> [Line<'static>; 3] {
    let [low, high] = bounds;
    [low, low + (high - low) / 2., high].map(|v| format!("{v:.precision$}").bold().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn history(points: &[(usize, f32)]) -> TrainingHistory {
        let mut history = TrainingHistory::default();
        for (episode, mu) in points {
            history.record(&StepReport {
                episode: *episode,
                mu: *mu,
                sigma: 1.0,
                action: *mu,
                reward: 0.5,
                loss: 0.1,
                target: 4.0,
            });
        }
        history
    }

    #[test]
    fn bounds_cover_every_series() {
        let history = history(&[(0, -1.5), (100, 2.0), (200, 3.5)]);
        assert_eq!(episode_bounds(&history), [0., 200.]);
        // mu goes below zero, target stays at 4
        assert_eq!(value_bounds(&history.series()), [-1.5, 4.0]);
    }

    #[test]
    fn degenerate_bounds_are_widened() {
        let empty = TrainingHistory::default();
        assert_eq!(episode_bounds(&empty), [0., 1.]);
        assert_eq!(value_bounds(&empty.series()), [0., 1.]);
        let flat = [("mu", vec![(0., 2.), (1., 2.)])];
        assert_eq!(value_bounds(&flat), [1.5, 2.5]);
        assert_eq!(episode_bounds(&history(&[(300, 1.0)])), [300., 301.]);
    }

    #[test]
    fn labels_span_the_bounds() {
        let labels = axis_labels([0., 4.], 2);
        let text: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        assert_eq!(text, vec!["0.00", "2.00", "4.00"]);
    }

    #[test]
    fn only_dismiss_keys_close_the_chart() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert!(dismisses(press(KeyCode::Char('q'))));
        assert!(dismisses(press(KeyCode::Esc)));
        assert!(dismisses(press(KeyCode::Enter)));
        assert!(!dismisses(press(KeyCode::Char('x'))));
    }

    #[test]
    fn renders_legend_and_axis_titles() {
        let history = history(&[(0, 0.0), (100, 1.0), (200, 2.5)]);
        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        (&HistoryChart::new(&history, 200)).render(area, &mut buf);
        let rendered: String = buf.content().iter().map(|cell| cell.symbol()).collect();
        for text in ["Episode", "Parameter value", "mu", "sigma", "reward", "target"] {
            assert!(rendered.contains(text), "missing {text}");
        }
    }
}
