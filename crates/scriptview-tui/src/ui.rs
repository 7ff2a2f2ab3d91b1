use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::app::{App, Panel};

const MAX_FAILURE_ROWS: usize = 6;

/// Render the full TUI frame.
pub fn render(f: &mut Frame, app: &App) {
    let failure_rows = app.session.failure_count().min(MAX_FAILURE_ROWS);
    let failure_height = if failure_rows == 0 {
        0
    } else {
        failure_rows as u16 + 2
    };
    let prompt_height = if app.input.is_some() { 1 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(failure_height), // failures
            Constraint::Min(5),                 // main area
            Constraint::Length(prompt_height),  // add-files prompt
            Constraint::Length(1),              // status bar
        ])
        .split(f.area());

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25), // speakers
            Constraint::Percentage(75), // transcript
        ])
        .split(chunks[1]);

    if failure_height > 0 {
        render_failures(f, app, chunks[0]);
    }
    render_speakers(f, app, main_chunks[0]);
    render_transcript(f, app, main_chunks[1]);
    if prompt_height > 0 {
        render_prompt(f, app, chunks[2]);
    }
    render_status_bar(f, app, chunks[3]);
}

fn panel_style(app: &App, panel: Panel) -> Style {
    if app.active_panel == panel {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_failures(f: &mut Frame, app: &App, area: Rect) {
    let failures = app.session.failures();
    let title = format!(" {}件のエラー  (d: 閉じる) ", failures.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let mut items: Vec<ListItem> = failures
        .iter()
        .take(MAX_FAILURE_ROWS)
        .map(|failure| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {}", failure.source_name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(failure.reason.as_str(), Style::default().fg(Color::Red)),
            ]))
        })
        .collect();
    if failures.len() > MAX_FAILURE_ROWS {
        // Replace the last row with an overflow marker.
        items.pop();
        items.push(ListItem::new(Line::from(Span::styled(
            format!(" ... +{}", failures.len() - MAX_FAILURE_ROWS + 1),
            Style::default().fg(Color::DarkGray),
        ))));
    }

    f.render_widget(List::new(items).block(block), area);
}

fn render_speakers(f: &mut Frame, app: &App, area: Rect) {
    let speakers = app.speakers();
    let title = format!(" Speakers ({}) [{}] ", speakers.len(), app.speaker_order);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(panel_style(app, Panel::Speakers));

    let selected = app.session.speaker_filter();
    let items: Vec<ListItem> = speakers
        .iter()
        .enumerate()
        .map(|(i, speaker)| {
            let mark = if selected.contains(*speaker) { "[x]" } else { "[ ]" };
            let mut style = if selected.contains(*speaker) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            if app.active_panel == Panel::Speakers && i == app.speaker_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            ListItem::new(Line::from(Span::styled(format!(" {mark} {speaker}"), style)))
        })
        .collect();

    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.speaker_cursor.saturating_sub(visible.saturating_sub(1));
    let list = List::new(items.into_iter().skip(skip).collect::<Vec<_>>()).block(block);
    f.render_widget(list, area);
}

fn render_transcript(f: &mut Frame, app: &App, area: Rect) {
    let view = app.session.filtered_view();
    let title = format!(" Transcript ({} lines) ", view.record_count());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(panel_style(app, Panel::Transcript));

    if !app.session.has_documents() {
        let hint = if app.is_loading() {
            " Loading..."
        } else {
            " No scripts loaded. Press 'a' to add JSON files."
        };
        let para = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(para, area);
        return;
    }

    if view.is_empty() {
        let para = Paragraph::new(" セリフがありません")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(para, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::with_capacity(app.transcript_len());
    for section in view.iter() {
        lines.push(Line::from(Span::styled(
            format!(" {} ", section.document.source_name),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));
        for record in &section.records {
            let speaker_style = if record.is_unattributed() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
                    .fg(speaker_color(&record.speaker))
                    .add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("   {}", record.speaker), speaker_style),
                Span::raw("  "),
                Span::raw(record.line.as_str()),
            ]));
        }
        lines.push(Line::from(""));
    }

    let scroll = u16::try_from(app.transcript_scroll).unwrap_or(u16::MAX);
    let para = Paragraph::new(lines).block(block).scroll((scroll, 0));
    f.render_widget(para, area);
}

fn render_prompt(f: &mut Frame, app: &App, area: Rect) {
    let buf = app.input.as_deref().unwrap_or("");
    let line = Line::from(vec![
        Span::styled(" Add files: ", Style::default().fg(Color::Yellow)),
        Span::raw(buf),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let panel_name = match app.active_panel {
        Panel::Speakers => "Speakers",
        Panel::Transcript => "Transcript",
    };
    let filter_indicator = if app.session.is_filtering() {
        " | フィルター適用中"
    } else {
        ""
    };
    let loading = if app.is_loading() { " | loading" } else { "" };
    let help = if app.input.is_some() {
        "Enter:load  Esc:cancel"
    } else {
        "Tab:switch  j/k:move  Space:toggle  c:clear  d:dismiss  o:order  a:add  q:quit"
    };
    let text = format!(" scriptview | {panel_name}{filter_indicator}{loading} | {help}");
    let para = Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::Gray));
    f.render_widget(para, area);
}

/// Stable color per speaker name.
fn speaker_color(speaker: &str) -> Color {
    const PALETTE: [Color; 6] = [
        Color::Green,
        Color::Magenta,
        Color::Blue,
        Color::Yellow,
        Color::LightRed,
        Color::LightCyan,
    ];
    let hash = speaker
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    PALETTE[hash % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_color_is_stable() {
        assert_eq!(speaker_color("Alice"), speaker_color("Alice"));
        assert_eq!(speaker_color(""), Color::Green);
    }
}
