//! Rendering for both screens and the toast overlay.

use crate::app::{ScreenView, SignInField, SignInView, TaskFocus, TasksView, ViewSnapshot};
use crate::toast::Toast;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use ratatui::Frame;
use taskdeck_core::NoticeLevel;

pub fn render(frame: &mut Frame, view: &ViewSnapshot) {
    match &view.screen {
        ScreenView::SignIn(form) => render_sign_in(frame, form),
        ScreenView::Tasks(tasks) => render_tasks(frame, tasks),
    }
    render_toasts(frame, &view.toasts);
}

fn render_sign_in(frame: &mut Frame, form: &SignInView) {
    let area = centered_rect(54, 9, frame.size());
    let block = Block::default()
        .title(" taskdeck - sign in ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(field_line(
            "Email",
            form.email.clone(),
            form.focus == SignInField::Email,
        )),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(field_line(
            "Password",
            form.password_masked.clone(),
            form.focus == SignInField::Password,
        )),
        rows[2],
    );

    if let Some(error) = &form.error {
        frame.render_widget(
            Paragraph::new(error.clone()).style(Style::default().fg(Color::Red)),
            rows[4],
        );
    } else if form.in_flight {
        frame.render_widget(
            Paragraph::new("Signing in...").style(Style::default().fg(Color::DarkGray)),
            rows[4],
        );
    }

    frame.render_widget(
        Paragraph::new("Enter sign in · Tab switch field · Esc quit")
            .style(Style::default().fg(Color::DarkGray)),
        rows[5],
    );
}

fn field_line(label: &str, value: String, focused: bool) -> Line<'_> {
    let marker = if focused { "> " } else { "  " };
    let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("{label:<10}"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ];
    if focused {
        spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

fn render_tasks(frame: &mut Frame, view: &TasksView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    frame.render_widget(header_line(view), rows[0]);
    render_input(frame, view, rows[1]);

    if view.loading {
        frame.render_widget(
            Paragraph::new("Loading tasks...").alignment(Alignment::Center),
            rows[2],
        );
    } else {
        render_list(frame, view, rows[2]);
    }

    frame.render_widget(
        Paragraph::new("Enter add · Tab focus · Space toggle · d delete · ^L sign out · Esc quit")
            .style(Style::default().fg(Color::DarkGray)),
        rows[3],
    );
}

fn header_line(view: &TasksView) -> Paragraph<'_> {
    let mut spans = vec![Span::styled(
        " taskdeck",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(email) = &view.email {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            email.as_str(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if view.live {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("● live", Style::default().fg(Color::Green)));
    }
    Paragraph::new(Line::from(spans))
}

fn render_input(frame: &mut Frame, view: &TasksView, area: Rect) {
    let focused = view.focus == TaskFocus::Input;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = Vec::new();
    if view.input.is_empty() {
        if !focused {
            spans.push(Span::styled(
                "Add a new task...",
                Style::default().fg(Color::DarkGray),
            ));
        }
    } else {
        spans.push(Span::raw(view.input.as_str()));
    }
    if focused {
        spans.push(Span::styled("▌", Style::default().fg(Color::Cyan)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title("New task")
                .borders(Borders::ALL)
                .border_style(border_style),
        ),
        area,
    );
}

fn render_list(frame: &mut Frame, view: &TasksView, area: Rect) {
    let items: Vec<ListItem> = view.tasks.iter().map(task_row).collect();

    let highlight = if view.focus == TaskFocus::List {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };

    let list = List::new(items)
        .highlight_style(highlight)
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !view.tasks.is_empty() {
        state.select(Some(view.selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn task_row(task: &taskdeck_core::Task) -> ListItem<'_> {
    let glyph = if task.is_complete {
        Span::styled("◉ ", Style::default().fg(Color::Green))
    } else {
        Span::raw("○ ")
    };
    let title_style = if task.is_complete {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    let date = task.created_at.format("%b %-d, %Y").to_string();

    ListItem::new(Line::from(vec![
        glyph,
        Span::styled(task.title.as_str(), title_style),
        Span::raw("  "),
        Span::styled(date, Style::default().fg(Color::DarkGray)),
    ]))
}

fn render_toasts(frame: &mut Frame, toasts: &[Toast]) {
    let area = frame.size();
    let mut y = area.y + 1;
    for toast in toasts {
        if y + 3 > area.y + area.height {
            break;
        }
        let width = (toast.text.len() as u16 + 4)
            .min(area.width.saturating_sub(2))
            .max(10);
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y,
            width,
            height: 3,
        };
        let style = match toast.level {
            NoticeLevel::Success => Style::default().fg(Color::Green),
            NoticeLevel::Error => Style::default().fg(Color::Red),
        };
        frame.render_widget(Clear, rect);
        frame.render_widget(
            Paragraph::new(toast.text.as_str())
                .alignment(Alignment::Center)
                .style(style)
                .block(Block::default().borders(Borders::ALL).border_style(style)),
            rect,
        );
        y += 3;
    }
}
