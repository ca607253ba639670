use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use roster_terminal::config::AppConfig;
use roster_terminal::format::{self, SkillTier};
use roster_terminal::logging;
use roster_terminal::modals::EditKind;
use roster_terminal::provider::{Services, spawn_provider};
use roster_terminal::skills;
use roster_terminal::state::{self, AppState, LoginField, ProviderCommand, Screen, apply_delta};

struct App {
    state: AppState,
    should_quit: bool,
    help_overlay: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(config: &AppConfig, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        let mut state = AppState::new(config.download_dir.clone(), config.success_modal_duration);
        state.restore_session();
        Self {
            state,
            should_quit: false,
            help_overlay: false,
            cmd_tx,
        }
    }

    fn flush_commands(&mut self) {
        for cmd in self.state.take_outbox() {
            if self.cmd_tx.send(cmd).is_err() {
                self.state.push_log("[WARN] Provider thread is gone");
                break;
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.on_modal_key(key) {
            return;
        }
        if self.state.screen == Screen::Login {
            self.on_login_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('g') | KeyCode::F(5) => self.state.refresh_screen(),
            KeyCode::Char('L') => self.state.request_logout(),
            KeyCode::Char('1') => self.state.show_rosters(),
            KeyCode::Char('2') => self.state.show_templates(),
            _ => self.on_screen_key(key),
        }
    }

    /// Dialogs capture the keyboard while open.
    fn on_modal_key(&mut self, key: KeyEvent) -> bool {
        let state = &mut self.state;
        if state.modals.error.visible {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                state.modals.hide_error();
            }
            return true;
        }
        if state.modals.confirm.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => state.resolve_confirm(true),
                KeyCode::Char('n') | KeyCode::Esc => state.resolve_confirm(false),
                _ => {}
            }
            return true;
        }
        if state.modals.edit.visible {
            match key.code {
                KeyCode::Enter => state.confirm_edit(),
                KeyCode::Esc => state.cancel_edit(),
                KeyCode::Backspace => {
                    state.modals.edit.input.pop();
                }
                KeyCode::Char(c) => state.modals.edit.input.push(c),
                _ => {}
            }
            return true;
        }
        if state.modals.success.visible {
            state.modals.hide_success();
            return true;
        }
        false
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        let state = &mut self.state;
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
                state.login_focus = match state.login_focus {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            KeyCode::Backspace => {
                focused_input(state).pop();
            }
            KeyCode::Char(c) => focused_input(state).push(c),
            KeyCode::Enter if !state.auth.loading => state.submit_login(false),
            KeyCode::F(2) if !state.auth.loading => state.submit_login(true),
            _ => {}
        }
    }

    fn on_screen_key(&mut self, key: KeyEvent) {
        let state = &mut self.state;
        match (state.screen, key.code) {
            (Screen::Rosters, KeyCode::Enter | KeyCode::Char('d')) => {
                if let Some(id) = state.selected_roster().map(|r| r.roster_id.clone()) {
                    state.open_roster(&id);
                }
            }
            (Screen::Rosters, KeyCode::Char('t')) => state.show_templates(),
            (Screen::Rosters, KeyCode::Char('r')) => state.start_rename(),
            (Screen::Rosters, KeyCode::Char('x')) => state.start_delete(),
            (Screen::Rosters | Screen::RosterDetail, KeyCode::Char('w')) => {
                state.request_download()
            }
            (Screen::Templates, KeyCode::Enter | KeyCode::Char('c')) => state.start_create(),
            (Screen::Templates, KeyCode::Char('b') | KeyCode::Esc) => state.show_rosters(),
            (Screen::RosterDetail, KeyCode::Enter | KeyCode::Char('d')) => {
                if let Some(id) = state.selected_player().map(|p| p.id.clone()) {
                    state.open_player(&id);
                }
            }
            (Screen::RosterDetail, KeyCode::Char('b') | KeyCode::Esc) => {
                state.leave_roster_detail();
                state.request_rosters();
            }
            (Screen::PlayerDetail, KeyCode::Enter | KeyCode::Char('e')) => {
                state.start_player_edit()
            }
            (Screen::PlayerDetail, KeyCode::Char('b') | KeyCode::Esc) => state.leave_player(),
            _ => {}
        }
    }
}

fn focused_input(state: &mut AppState) -> &mut String {
    match state.login_focus {
        LoginField::Username => &mut state.login_username,
        LoginField::Password => &mut state.login_password,
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    if let Err(err) = logging::init(&config) {
        eprintln!("logging disabled: {err:#}");
    }
    tracing::info!(api = %config.api_base_url, "starting roster terminal");

    let services = Services::from_config(&config)?;
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(tx, cmd_rx, services, config.download_dir.clone())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(&config, cmd_tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.state.modals.tick(Instant::now());
        app.flush_commands();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
            app.flush_commands();
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let state = &app.state;
    match state.screen {
        Screen::Login => render_login(frame, chunks[1], state),
        Screen::Rosters => render_rosters(frame, chunks[1], state),
        Screen::Templates => render_templates(frame, chunks[1], state),
        Screen::RosterDetail => render_roster_detail(frame, chunks[1], state),
        Screen::PlayerDetail => render_player(frame, chunks[1], state),
    }

    let footer = Paragraph::new(footer_text(state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    render_modals(frame, frame.size(), state);
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Login => "LOGIN",
        Screen::Rosters => "MY ROSTERS",
        Screen::Templates => "TEMPLATES",
        Screen::RosterDetail => "ROSTER",
        Screen::PlayerDetail => "PLAYER",
    };
    let user = state
        .auth
        .user
        .as_ref()
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| "not signed in".to_string());
    format!(" ROSTER TERMINAL | {title} | {user}")
}

fn footer_text(state: &AppState) -> String {
    let keys = match state.screen {
        Screen::Login => "Tab Switch field | Enter Login | F2 Register | Esc Quit",
        Screen::Rosters => {
            "Enter Open | t Templates | r Rename | x Delete | w Download | g Refresh | L Logout | q Quit"
        }
        Screen::Templates => "Enter Create from template | b Back | g Refresh | q Quit",
        Screen::RosterDetail => "Enter Player | w Download | b Back | g Refresh | q Quit",
        Screen::PlayerDetail => "Enter Edit field | j/k Move | b Back | g Refresh | q Quit",
    };
    match state.logs.back() {
        Some(last) => format!("{keys}\n{last}"),
        None => keys.to_string(),
    }
}

fn selected_style(selected: bool) -> Style {
    if selected {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    }
}

fn render_status(frame: &mut Frame, area: Rect, loading: bool, error: Option<&str>, empty: &str) {
    let text = match (loading, error) {
        (true, _) => "Loading...".to_string(),
        (false, Some(err)) => format!("Error: {err}"),
        (false, None) => empty.to_string(),
    };
    let style = if error.is_some() && !loading {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_login(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(50, 40, area);
    let marker = |field: LoginField| if state.login_focus == field { ">" } else { " " };
    let mut lines = vec![
        Line::from(format!(
            "{} Username: {}",
            marker(LoginField::Username),
            state.login_username
        )),
        Line::from(format!(
            "{} Password: {}",
            marker(LoginField::Password),
            "*".repeat(state.login_password.chars().count())
        )),
        Line::from(""),
    ];
    if !state.session_checked {
        lines.push(Line::from("Checking session...").style(Style::default().fg(Color::DarkGray)));
    } else if state.auth.loading {
        lines.push(Line::from("Signing in...").style(Style::default().fg(Color::DarkGray)));
    } else if let Some(err) = &state.auth.error {
        lines.push(Line::from(err.as_str()).style(Style::default().fg(Color::Red)));
    }
    let form = Paragraph::new(lines).block(Block::default().title("Sign in").borders(Borders::ALL));
    frame.render_widget(form, popup);
}

fn render_rosters(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Rosters").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rosters = state.rosters.rosters();
    if rosters.is_empty() {
        render_status(
            frame,
            inner,
            state.rosters.loading(),
            state.rosters.error(),
            "No rosters yet. Press t to create one from a template.",
        );
        return;
    }
    let lines: Vec<Line> = rosters
        .iter()
        .enumerate()
        .map(|(idx, roster)| {
            Line::from(format!(
                "{:<32} {:>3} players",
                roster.display_name(),
                roster.players.len()
            ))
            .style(selected_style(idx == state.roster_selected))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_templates(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Templates").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let templates = state.templates.templates();
    if templates.is_empty() {
        render_status(
            frame,
            inner,
            state.templates.loading(),
            state.templates.error(),
            "No templates available.",
        );
        return;
    }
    let lines: Vec<Line> = templates
        .iter()
        .enumerate()
        .map(|(idx, template)| {
            Line::from(template.display_name().to_string())
                .style(selected_style(idx == state.template_selected))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_roster_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let detail = &state.roster_detail;
    let title = detail
        .roster()
        .map(|r| r.display_name().to_string())
        .unwrap_or_else(|| "Roster".to_string());
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(roster) = detail.roster() else {
        render_status(frame, inner, detail.loading(), detail.error(), "Roster not found.");
        return;
    };
    if roster.players.is_empty() {
        render_status(frame, inner, detail.loading(), detail.error(), "No players.");
        return;
    }
    let lines: Vec<Line> = roster
        .players
        .iter()
        .enumerate()
        .map(|(idx, player)| {
            Line::from(format!(
                "#{:<3} {:<5} {:<28} OVR {}",
                player.jersey_number,
                format::position_name(player.position),
                player.full_name(),
                player.overall_rating
            ))
            .style(selected_style(idx == state.player_selected))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn tier_color(value: i64) -> Color {
    match SkillTier::of(value) {
        SkillTier::Elite => Color::Green,
        SkillTier::Good => Color::Cyan,
        SkillTier::Average => Color::Yellow,
        SkillTier::Low => Color::Red,
    }
}

fn render_player(frame: &mut Frame, area: Rect, state: &AppState) {
    let store = &state.player;
    let block = Block::default().title("Player").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(player) = store.player() else {
        render_status(frame, inner, store.loading(), store.error(), "Player not found.");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(inner);

    let best = skills::best_three(player)
        .into_iter()
        .map(|(skill, value)| {
            format!("{} {value}", skills::skill_label(skill).unwrap_or(skill))
        })
        .collect::<Vec<_>>()
        .join(", ");
    let summary = vec![
        Line::from(player.full_name()).style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(format!(
            "{} | #{} | OVR {}",
            format::position_name(player.position),
            player.jersey_number,
            player.overall_rating
        )),
        Line::from(format!(
            "Age {} | {} | {}",
            player.age,
            format::format_height(player.height),
            format::format_weight(player.weight_pounds)
        )),
        Line::from(format!(
            "Dev trait: {}",
            format::format_dev_trait(
                player
                    .field_value("devTrait")
                    .map(|v| v.to_string())
                    .as_deref()
            )
        )),
        Line::from(format!("Best: {best}")),
        Line::from(""),
        Line::from(if state.updater.loading() { "Saving..." } else { "" }),
    ];
    frame.render_widget(Paragraph::new(summary).wrap(Wrap { trim: true }), chunks[0]);

    let fields = state.player_fields();
    let visible = chunks[1].height as usize;
    let start = state.field_selected.saturating_sub(visible.saturating_sub(1));
    let lines: Vec<Line> = fields
        .iter()
        .enumerate()
        .skip(start)
        .take(visible)
        .map(|(idx, &(field, kind))| {
            let value = player
                .field_value(field)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            let label = skills::skill_label(field).unwrap_or(field);
            let mut style = selected_style(idx == state.field_selected);
            if kind == EditKind::Skill
                && let Some(v) = player.skill(field)
            {
                style = style.fg(tier_color(v));
            }
            Line::from(format!("{label:<24} {value}")).style(style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), chunks[1]);
}

fn render_modals(frame: &mut Frame, area: Rect, state: &AppState) {
    let modals = &state.modals;
    if modals.edit.visible {
        let popup = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup);
        let label = skills::skill_label(&modals.edit.field).unwrap_or(modals.edit.field.as_str());
        let text = vec![
            Line::from(format!("Current: {}", modals.edit.current_value)),
            Line::from(format!("New: {}_", modals.edit.input)),
            Line::from(""),
            Line::from("Enter Save | Esc Cancel").style(Style::default().fg(Color::DarkGray)),
        ];
        let edit = Paragraph::new(text)
            .block(Block::default().title(format!("Edit {label}")).borders(Borders::ALL));
        frame.render_widget(edit, popup);
    }
    if let Some(confirm) = &modals.confirm {
        let popup = centered_rect(50, 25, area);
        frame.render_widget(Clear, popup);
        let title_style = if confirm.danger {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        let text = vec![
            Line::from(confirm.message.as_str()),
            Line::from(""),
            Line::from(format!(
                "y/Enter {} | n/Esc {}",
                confirm.confirm_label, confirm.cancel_label
            )),
        ];
        let dialog = Paragraph::new(text).wrap(Wrap { trim: true }).block(
            Block::default()
                .title(Span::styled(confirm.title.as_str(), title_style))
                .borders(Borders::ALL),
        );
        frame.render_widget(dialog, popup);
    }
    if modals.error.visible {
        let popup = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup);
        let dialog = Paragraph::new(modals.error.message.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("Error").borders(Borders::ALL));
        frame.render_widget(dialog, popup);
    } else if modals.success.visible {
        let popup = centered_rect(40, 15, area);
        frame.render_widget(Clear, popup);
        let dialog = Paragraph::new(modals.success.message.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Green))
            .block(Block::default().title("Success").borders(Borders::ALL));
        frame.render_widget(dialog, popup);
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Roster Terminal - Help",
        "",
        "Global:",
        "  1 / 2        Rosters / Templates",
        "  j/k or ↑/↓   Move",
        "  g / F5       Refresh",
        "  L            Log out",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Rosters:",
        "  Enter        Open roster",
        "  r / x        Rename / delete",
        "  w            Download export",
        "",
        "Player:",
        "  Enter / e    Edit selected field",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
