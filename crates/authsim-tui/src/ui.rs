//! Rendering of simulation snapshots.

use authsim_core::{SimulationSnapshot, StepStatus, StepView};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Gauge, List, ListItem, Paragraph, Wrap},
};

/// Title shown at the top of the dashboard.
pub const TITLE: &str = "IoMT Authentication Flow";

fn status_style(status: StepStatus) -> Style {
    match status {
        StepStatus::Pending => Style::default().fg(Color::DarkGray),
        StepStatus::Active => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        StepStatus::Completed => Style::default().fg(Color::Green),
        StepStatus::Error => Style::default().fg(Color::Red),
    }
}

fn status_marker(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Pending => "○",
        StepStatus::Active => "◉",
        StepStatus::Completed => "✔",
        StepStatus::Error => "✖",
    }
}

/// Step shown in the detail pane: the active one, otherwise the current or
/// last step.
fn focused_step(snapshot: &SimulationSnapshot) -> Option<&StepView> {
    snapshot.active_step().or_else(|| {
        let last = snapshot.total_steps().checked_sub(1)?;
        snapshot.steps.get(snapshot.current_index.min(last))
    })
}

/// Draw the full dashboard.
pub fn draw(frame: &mut Frame, snapshot: &SimulationSnapshot) {
    let [header, progress, steps, detail] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(11),
    ])
    .areas(frame.area());

    let controls = Line::from(vec![
        Span::styled(
            format!("[space] {}", snapshot.control_label()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  [s] start  [p] pause  [r] reset  [q] quit"),
    ]);
    frame.render_widget(Paragraph::new(controls).block(Block::bordered().title(TITLE)), header);

    let gauge = Gauge::default()
        .block(Block::bordered().title("Progress"))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio((snapshot.progress_percent / 100.0).clamp(0.0, 1.0))
        .label(snapshot.progress_label());
    frame.render_widget(gauge, progress);

    let items: Vec<ListItem> = snapshot.steps.iter().map(step_item).collect();
    frame.render_widget(List::new(items).block(Block::bordered().title("Protocol Steps")), steps);

    let detail_lines = focused_step(snapshot).map(detail_lines).unwrap_or_default();
    frame.render_widget(
        Paragraph::new(detail_lines)
            .wrap(Wrap { trim: true })
            .block(Block::bordered().title("Step Detail")),
        detail,
    );
}

fn step_item(step: &StepView) -> ListItem<'static> {
    let definition = &step.definition;
    let style = status_style(step.status);

    ListItem::new(Line::from(vec![
        Span::styled(format!("{} ", status_marker(step.status)), style),
        Span::styled(format!("{:>2}. {}", definition.id, definition.title), style),
        Span::raw(format!(
            "  {} → {}",
            definition.sender.display_name(),
            definition.receiver.display_name()
        )),
        Span::styled(format!("  [{}]", step.status.label()), style),
    ]))
}

fn detail_lines(step: &StepView) -> Vec<Line<'static>> {
    let definition = &step.definition;
    let mut lines = vec![
        Line::from(Span::styled(definition.title.clone(), status_style(step.status))),
        Line::from(definition.description.clone()),
    ];

    if let Some(message) = &definition.message {
        lines.push(Line::from(vec![
            Span::raw(format!(
                "{} → {}: ",
                definition.sender.display_name(),
                definition.receiver.display_name()
            )),
            Span::styled(message.clone(), Style::default().fg(Color::Magenta)),
        ]));
    }

    lines.extend(definition.operations.iter().map(|op| Line::from(format!("  • {op}"))));
    lines
}

/// Plain-text rendering, one line per step.
pub fn timeline(snapshot: &SimulationSnapshot) -> String {
    snapshot
        .steps
        .iter()
        .map(|step| {
            let definition = &step.definition;
            format!(
                "[{:<10}] {}. {} ({} -> {})",
                step.status.label(),
                definition.id,
                definition.title,
                definition.sender.display_name(),
                definition.receiver.display_name()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use authsim_core::{EngineAction, Participant, SimulationEngine, StepCatalog, StepDefinition};
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn small_catalog() -> StepCatalog {
        StepCatalog::new(vec![
            StepDefinition::new(
                1,
                "Hello",
                "device says hello",
                Participant::Device,
                Participant::Collector,
                Duration::from_millis(10),
            )
            .with_message("MSG1"),
            StepDefinition::new(
                2,
                "Verify",
                "collector verifies",
                Participant::Collector,
                Participant::System,
                Duration::from_millis(10),
            ),
            StepDefinition::new(
                3,
                "Done",
                "session established",
                Participant::System,
                Participant::System,
                Duration::from_millis(10),
            ),
        ])
        .unwrap()
    }

    fn after_one_step() -> SimulationSnapshot {
        let mut engine = SimulationEngine::new(small_catalog());
        if let [EngineAction::ScheduleAdvance { ticket, .. }] = engine.start()[..] {
            engine.on_timer(ticket);
        }
        engine.snapshot()
    }

    fn rendered_text(snapshot: &SimulationSnapshot) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, snapshot)).unwrap();
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn timeline_idle() {
        let snapshot = SimulationEngine::new(small_catalog()).snapshot();
        insta::assert_snapshot!(timeline(&snapshot), @r"
        [Pending   ] 1. Hello (IoMT Device -> Data Collector)
        [Pending   ] 2. Verify (Data Collector -> System)
        [Pending   ] 3. Done (System -> System)
        ");
    }

    #[test]
    fn timeline_mid_run() {
        insta::assert_snapshot!(timeline(&after_one_step()), @r"
        [Completed ] 1. Hello (IoMT Device -> Data Collector)
        [Processing] 2. Verify (Data Collector -> System)
        [Pending   ] 3. Done (System -> System)
        ");
    }

    #[test]
    fn dashboard_shows_progress_and_steps() {
        let text = rendered_text(&after_one_step());

        assert!(text.contains(TITLE));
        assert!(text.contains("Step 2 of 3 - 33% Complete"));
        assert!(text.contains("Hello"));
        assert!(text.contains("[Processing]"));
        assert!(text.contains("[space] Pause"));
    }

    #[test]
    fn detail_pane_shows_wire_message() {
        let mut engine = SimulationEngine::new(small_catalog());
        engine.start();

        let text = rendered_text(&engine.snapshot());
        assert!(text.contains("MSG1"));
        assert!(text.contains("device says hello"));
    }

    #[test]
    fn focused_step_falls_back_to_last_when_finished() {
        let mut engine = SimulationEngine::new(small_catalog());
        let mut actions = engine.start();
        while let [EngineAction::ScheduleAdvance { ticket, .. }] = actions[..] {
            actions = engine.on_timer(ticket);
        }

        let snapshot = engine.snapshot();
        assert_eq!(focused_step(&snapshot).map(|s| s.definition.id), Some(3));
    }
}
