//! Crystal Clicker rendering.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};

use super::actions;
use super::logic::{format_away_time, format_number};
use super::state::UpgradeKind;
use super::view::{ClickFeedback, CostLabel, UpgradeCard, ViewModel};

/// Crystal art, 4 rows.
const CRYSTAL_ART: &[&str] = &["   /\\   ", "  /◆◆\\  ", "  \\◆◆/  ", "   \\/   "];

/// Crystal art while a click is being shown.
const CRYSTAL_CLICK_ART: &[&str] = &["  \\ | /  ", " ─ /◆\\ ─ ", " ─ \\◆/ ─ ", "  / | \\  "];

/// Colors per luck tier (index = tier).
const LUCK_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::LightYellow,
    Color::LightMagenta,
    Color::Magenta,
    Color::LightRed,
];

pub fn render(
    view: &ViewModel,
    confirm_reset: bool,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let footer_height = 3;
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(footer_height)])
        .split(area);

    if is_narrow_layout(area.width) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // stats
                Constraint::Length(7), // crystal
                Constraint::Min(4),    // upgrades
            ])
            .split(outer[0]);
        render_stats(view, f, chunks[0]);
        render_crystal(view, f, chunks[1], click_state);
        render_upgrades(view, f, chunks[2], click_state);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(outer[0]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(7)])
            .split(columns[0]);
        render_stats(view, f, left[0]);
        render_crystal(view, f, left[1], click_state);
        render_upgrades(view, f, columns[1], click_state);
    }

    if confirm_reset {
        render_reset_confirm(f, outer[1], click_state);
    } else {
        render_footer(view, f, outer[1], click_state);
    }

    // 通知は最後に描画してクリック判定でも最前面にする
    if view.offline_notice.is_some() {
        render_offline_notice(view, f, area, click_state);
    }
}

fn render_stats(view: &ViewModel, f: &mut Frame, area: Rect) {
    let snap = &view.snapshot;
    let lines = vec![
        Line::from(vec![
            Span::styled("⚡ Energy: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format_number(snap.energy),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Per click: ", Style::default().fg(Color::Gray)),
            Span::styled(format_number(snap.per_click), Style::default().fg(Color::White)),
            Span::styled("   Per second: ", Style::default().fg(Color::Gray)),
            Span::styled(format_number(snap.per_second), Style::default().fg(Color::White)),
        ]),
    ];
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP | Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Crystal Clicker "),
    );
    f.render_widget(widget, area);
}

/// Label and style for click feedback.
fn feedback_span(feedback: &ClickFeedback) -> Span<'static> {
    let tier = feedback.tier() as usize;
    let amount = format_number(feedback.amount);
    let text = match tier {
        0 => format!("+{}", amount),
        5 => format!("+{} ✨ MAX LUCK x{} ✨", amount, feedback.luck_level),
        t => format!("+{} {}", amount, "✨".repeat(t)),
    };
    let mut style = Style::default().fg(LUCK_COLORS[tier]);
    if tier > 0 {
        style = style.add_modifier(Modifier::BOLD);
    }
    if tier == 5 {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(text, style)
}

fn render_crystal(
    view: &ViewModel,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let clicking = view.click.is_some();
    let art = if clicking { CRYSTAL_CLICK_ART } else { CRYSTAL_ART };
    let crystal_color = if clicking { Color::White } else { Color::Cyan };

    let mut lines: Vec<Line> = art
        .iter()
        .map(|row| Line::from(Span::styled(*row, Style::default().fg(crystal_color))))
        .collect();
    match &view.click {
        Some((feedback, _)) => lines.push(Line::from(feedback_span(feedback))),
        None => lines.push(Line::from(Span::styled(
            "[SPACE] tap the crystal",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(crystal_color)),
        );
    f.render_widget(widget, area);

    click_state
        .borrow_mut()
        .add_click_target(area, actions::CLICK_CRYSTAL);
}

fn card_lines(card: &UpgradeCard, flashing: bool) -> [Line<'static>; 2] {
    let kind = card.kind;
    let (cost_text, cost_style) = match card.cost {
        CostLabel::Max => ("MAX".to_string(), Style::default().fg(Color::Magenta)),
        CostLabel::Cost(c) if card.can_buy => {
            (format_number(c), Style::default().fg(Color::Green))
        }
        CostLabel::Cost(c) => (format_number(c), Style::default().fg(Color::DarkGray)),
    };
    let name_style = if flashing {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if card.can_buy {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    [
        Line::from(vec![
            Span::styled(
                format!(" [{}] ", kind.key()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(kind.name(), name_style),
            Span::styled(format!("  x{}", card.owned), Style::default().fg(Color::Cyan)),
            Span::styled("  ", Style::default()),
            Span::styled(cost_text, cost_style),
        ]),
        Line::from(Span::styled(
            format!("     {}", kind.description()),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn render_upgrades(
    view: &ViewModel,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Upgrades ");
    let inner = block.inner(area);

    let mut lines: Vec<Line> = Vec::new();
    let mut cs = click_state.borrow_mut();
    for card in &view.snapshot.upgrades {
        let action_id = actions::BUY_UPGRADE_BASE + card.kind.index() as u16;
        let first_row = inner.y + lines.len() as u16;
        for line in card_lines(card, view.is_flashing(card.kind)) {
            lines.push(line);
        }
        cs.add_row_target(inner, first_row, action_id);
        cs.add_row_target(inner, first_row + 1, action_id);
    }
    drop(cs);

    let widget = Paragraph::new(lines).block(block);
    f.render_widget(widget, area);
}

fn render_footer(
    view: &ViewModel,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let (save_label, save_color) = if view.saved_flash > 0 {
        ("💾 Saved!", Color::Green)
    } else {
        ("[S] 💾 Save", Color::White)
    };
    let save = Paragraph::new(Line::from(Span::styled(
        save_label,
        Style::default().fg(save_color),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(save_color)),
    );
    f.render_widget(save, halves[0]);

    let reset = Paragraph::new(Line::from(Span::styled(
        "[R] 🔄 Reset",
        Style::default().fg(Color::Red),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(reset, halves[1]);

    let mut cs = click_state.borrow_mut();
    cs.add_click_target(halves[0], actions::SAVE_GAME);
    cs.add_click_target(halves[1], actions::RESET_GAME);
}

fn render_reset_confirm(f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let block = |color: Color| {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(" Reset all progress? ")
    };
    let yes = Paragraph::new(Line::from(Span::styled(
        "[Y] Yes, reset",
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(block(Color::Red));
    let no = Paragraph::new(Line::from(Span::styled(
        "[N] Cancel",
        Style::default().fg(Color::White),
    )))
    .alignment(Alignment::Center)
    .block(block(Color::DarkGray));
    f.render_widget(yes, halves[0]);
    f.render_widget(no, halves[1]);

    let mut cs = click_state.borrow_mut();
    cs.add_click_target(halves[0], actions::CONFIRM_RESET);
    cs.add_click_target(halves[1], actions::CANCEL_RESET);
}

/// Centered rect of at most `width` x `height` inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

fn render_offline_notice(
    view: &ViewModel,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let Some(notice) = &view.offline_notice else {
        return;
    };
    let popup = centered(area, 44, 7);
    let lines = vec![
        Line::from(Span::styled(
            "Welcome back!",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "You were away for {} and earned {} energy!",
            format_away_time(notice.elapsed_seconds),
            format_number(notice.amount)
        )),
        Line::from(Span::styled(
            "(tap to continue)",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(Clear, popup);
    f.render_widget(widget, popup);

    click_state
        .borrow_mut()
        .add_click_target(popup, actions::DISMISS_NOTICE);
}
