use crate::app::{AppScreen, AppState, AuthField, FormField, NewTaskForm};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use taskdeck_api::{Priority, Task};
use taskdeck_client::Filter;

pub fn draw(frame: &mut Frame, app: &mut AppState) {
    match app.screen {
        AppScreen::Login => draw_auth_screen(frame, app, false),
        AppScreen::Register => draw_auth_screen(frame, app, true),
        AppScreen::Dashboard => draw_dashboard(frame, app),
    }

    if let Some(form) = &app.form {
        draw_task_form(frame, form);
    }
    if let Some(id) = app.confirm_delete {
        draw_confirm_popup(frame, id);
    }
    if let Some(error) = app.tasks.last_error() {
        draw_error_popup(frame, error);
    }
}

fn draw_auth_screen(frame: &mut Frame, app: &AppState, register: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(frame.area());

    let title = if register { " Create account " } else { " Sign in " };
    let auth_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(auth_block.clone(), chunks[1]);

    let inner_area = auth_block.inner(chunks[1]);
    let field_count = if register { 3 } else { 2 };
    let mut constraints = vec![Constraint::Length(2); field_count];
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(0));
    let auth_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(inner_area);

    let masked: String = "•".repeat(app.auth_password.chars().count());
    let mut fields = vec![
        (AuthField::Email, format!("Email: {}", app.auth_email)),
        (AuthField::Password, format!("Password: {}", masked)),
    ];
    if register {
        fields.push((AuthField::Name, format!("Name: {}", app.auth_name)));
    }

    for (i, (field, text)) in fields.into_iter().enumerate() {
        let style = if app.auth_focus == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        frame.render_widget(Paragraph::new(text).style(style), auth_chunks[i]);
    }

    let instructions = if register {
        "Tab: next field · Enter: create and sign in · F2: back to sign in · Esc: quit"
    } else {
        "Tab: next field · Enter: sign in · F2: create account · Esc: quit"
    };
    let help = Paragraph::new(instructions)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(help, auth_chunks[field_count + 1]);

    if let Some(status) = &app.status {
        let status_line = Paragraph::new(status.as_str())
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(status_line, chunks[2]);
    }
}

fn draw_dashboard(frame: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_task_list(frame, app, chunks[1]);
    draw_footer(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![Span::styled(
        " My Tasks ",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(email) = &app.user_email {
        spans.push(Span::styled(
            format!("({email}) "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::raw("· "));
    for filter in Filter::ALL {
        let style = if app.tasks.filter() == filter {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", filter.label()), style));
        spans.push(Span::raw(" "));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    frame.render_widget(header, area);
}

fn draw_task_list(frame: &mut Frame, app: &mut AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Your Tasks ");

    if app.tasks.is_loading() {
        let loading = Paragraph::new("Loading tasks...")
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(loading, area);
        return;
    }

    let visible = app.tasks.visible();
    if visible.is_empty() {
        let empty = Paragraph::new("No tasks found. Press 'n' to create your first task.")
            .block(block)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible.iter().map(|task| task_line(task)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn task_line(task: &Task) -> ListItem<'_> {
    let checkbox = if task.completed { "[x] " } else { "[ ] " };
    let title_style = if task.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::raw(checkbox),
        Span::styled(task.title.clone(), title_style),
        Span::raw(" "),
        Span::styled(
            format!("({})", task.priority),
            Style::default().fg(priority_color(task.priority)),
        ),
    ];
    if let Some(due) = task.due_date {
        spans.push(Span::styled(
            format!("  due {}", due.format("%Y-%m-%d")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(description) = &task.description {
        spans.push(Span::styled(
            format!("  · {description}"),
            Style::default().fg(Color::Gray),
        ));
    }

    ListItem::new(Line::from(spans))
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn draw_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let text = match &app.status {
        Some(status) => Line::from(Span::styled(
            status.clone(),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(Span::styled(
            "n: new · space: toggle · d: delete · Tab: filter · r: reload · l: logout · q: quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

fn draw_task_form(frame: &mut Frame, form: &NewTaskForm) {
    let area = centered_rect(60, 40, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" New Task ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(block.clone(), area);

    let inner = block.inner(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let rows = [
        (FormField::Title, format!("Title*: {}", form.title)),
        (
            FormField::Description,
            format!("Description: {}", form.description),
        ),
        (
            FormField::DueDate,
            format!("Due date (YYYY-MM-DD): {}", form.due_date),
        ),
    ];
    for (i, (field, text)) in rows.into_iter().enumerate() {
        let style = if form.focus == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        frame.render_widget(Paragraph::new(text).style(style), chunks[i]);
    }

    let priority = Paragraph::new(Line::from(vec![
        Span::raw("Priority (↑/↓): "),
        Span::styled(
            form.priority.to_string(),
            Style::default().fg(priority_color(form.priority)),
        ),
    ]));
    frame.render_widget(priority, chunks[3]);

    let help = Paragraph::new("Tab: next field · Enter: add · Esc: cancel")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}

fn draw_confirm_popup(frame: &mut Frame, id: i64) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Yellow));
    let text = Paragraph::new(format!(
        "Are you sure you want to delete task #{id}?\n\ny: delete · n/Esc: keep"
    ))
    .block(block)
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    frame.render_widget(text, area);
}

fn draw_error_popup(frame: &mut Frame, error: &str) {
    let area = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .style(Style::default().fg(Color::Red));
    let text = Paragraph::new(format!("{error}\n\nEsc: dismiss"))
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(text, area);
}

/// Helper to build a centered rect using a percentage of the available area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
