use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use event_planner::{Actor, MenuCategory, MenuItem, PriceHistoryEntry};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Menu,
    PriceHistory,
    Views,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Menu => Page::PriceHistory,
            Page::PriceHistory => Page::Views,
            Page::Views => Page::Menu,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Menu => Page::Views,
            Page::PriceHistory => Page::Menu,
            Page::Views => Page::PriceHistory,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Menu => "Menu",
            Page::PriceHistory => "Price History",
            Page::Views => "Views",
        }
    }
}

pub struct App {
    pub items: Vec<MenuItem>,
    pub filtered_items: Vec<MenuItem>,
    pub history: Vec<PriceHistoryEntry>,
    pub state: TableState,
    pub history_state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    pub category_filter: Option<MenuCategory>,
    pub actor: Option<Actor>,
}

impl App {
    pub fn new(items: Vec<MenuItem>, history: Vec<PriceHistoryEntry>) -> Self {
        let mut state = TableState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }

        let mut history_state = TableState::default();
        if !history.is_empty() {
            // Newest change is shown first
            history_state.select(Some(0));
        }

        let filtered_items = items.clone();

        Self {
            items,
            filtered_items,
            history,
            state,
            history_state,
            current_page: Page::Menu,
            show_detail: false,
            category_filter: None,
            actor: None,
        }
    }

    /// Logged-in actor shown in the header
    pub fn with_actor(mut self, actor: Option<Actor>) -> Self {
        self.actor = actor;
        self
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn selected_item(&self) -> Option<&MenuItem> {
        self.state.selected().and_then(|i| self.filtered_items.get(i))
    }

    pub fn apply_filter(&mut self, category: Option<MenuCategory>) {
        self.category_filter = category;

        self.filtered_items = match category {
            None => self.items.clone(),
            Some(category) => self
                .items
                .iter()
                .filter(|item| item.category == category)
                .cloned()
                .collect(),
        };

        // Reset selection to first item
        if !self.filtered_items.is_empty() {
            self.state.select(Some(0));
        } else {
            self.state.select(None);
        }
    }

    pub fn clear_filter(&mut self) {
        self.apply_filter(None);
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    /// History newest first, as displayed
    pub fn history_newest_first(&self) -> Vec<&PriceHistoryEntry> {
        self.history.iter().rev().collect()
    }

    pub fn changes_for(&self, item_id: &str) -> Vec<&PriceHistoryEntry> {
        self.history.iter().filter(|e| e.item_id == item_id).collect()
    }

    fn active_len(&self) -> usize {
        match self.current_page {
            Page::PriceHistory => self.history.len(),
            _ => self.filtered_items.len(),
        }
    }

    fn active_state(&mut self) -> &mut TableState {
        match self.current_page {
            Page::PriceHistory => &mut self.history_state,
            _ => &mut self.state,
        }
    }

    pub fn next(&mut self) {
        let len = self.active_len();
        if len == 0 {
            return;
        }
        let state = self.active_state();
        let i = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.active_len();
        if len == 0 {
            return;
        }
        let state = self.active_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    pub fn stats(&self) -> MenuStats {
        let mut stats = MenuStats::default();

        for item in &self.items {
            match item.category {
                MenuCategory::MainCourse => stats.main_count += 1,
                MenuCategory::Starter => stats.starter_count += 1,
                MenuCategory::Dessert => stats.dessert_count += 1,
                MenuCategory::Beverage => stats.beverage_count += 1,
            }
            stats.total_price += item.price;
        }

        stats.change_count = self.history.len();
        stats
    }
}

#[derive(Default)]
pub struct MenuStats {
    pub main_count: usize,
    pub starter_count: usize,
    pub dessert_count: usize,
    pub beverage_count: usize,
    pub total_price: f64,
    pub change_count: usize,
}

impl MenuStats {
    pub fn count_for(&self, category: MenuCategory) -> usize {
        match category {
            MenuCategory::MainCourse => self.main_count,
            MenuCategory::Starter => self.starter_count,
            MenuCategory::Dessert => self.dessert_count,
            MenuCategory::Beverage => self.beverage_count,
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('c') => {
                    app.clear_filter();
                    app.current_page = Page::Menu;
                }
                KeyCode::Char(c @ '1'..='5') if app.current_page == Page::Views => {
                    let category = match c {
                        '2' => Some(MenuCategory::MainCourse),
                        '3' => Some(MenuCategory::Starter),
                        '4' => Some(MenuCategory::Dessert),
                        '5' => Some(MenuCategory::Beverage),
                        _ => None,
                    };
                    app.apply_filter(category);
                    app.current_page = Page::Menu;
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.active_state().select(Some(0)),
                KeyCode::End => {
                    let len = app.active_len();
                    if len > 0 {
                        app.active_state().select(Some(len - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Menu {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_menu_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Menu => render_menu_table(f, chunks[1], app),
            Page::PriceHistory => render_history(f, chunks[1], app),
            Page::Views => render_views(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn category_color(category: MenuCategory) -> Color {
    match category {
        MenuCategory::MainCourse => Color::Yellow,
        MenuCategory::Starter => Color::Green,
        MenuCategory::Dessert => Color::Magenta,
        MenuCategory::Beverage => Color::Cyan,
    }
}

fn header_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();
    let pages = [Page::Menu, Page::PriceHistory, Page::Views];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Items: {}", app.items.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Changes: {}", stats.change_count),
        Style::default().fg(Color::Red),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(match &app.actor {
        Some(actor) => Span::styled(
            format!("👤 {} ({})", actor.initials(), actor.id),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled("👤 anonymous", Style::default().fg(Color::DarkGray)),
    });

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_menu_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Id", "Name", "Category", "Price"]
        .iter()
        .map(|h| Cell::from(*h).style(header_style()));
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.filtered_items.iter().map(|item| {
        let color = category_color(item.category);
        Row::new(vec![
            Cell::from(item.id.clone()),
            Cell::from(truncate(&item.name, 30)),
            Cell::from(item.category.label()).style(Style::default().fg(color)),
            Cell::from(format!("{:.2}", item.price)),
        ])
        .height(1)
    });

    let title = match app.category_filter {
        Some(category) => format!(" Menu - {} ", category.label()),
        None => " Menu ".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(32),
            Constraint::Length(14),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_history(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["When", "Item", "Old", "New", "By"]
        .iter()
        .map(|h| Cell::from(*h).style(header_style()));
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .history_newest_first()
        .into_iter()
        .map(|entry| {
            let color = if entry.new_price >= entry.old_price {
                Color::Green
            } else {
                Color::Red
            };
            Row::new(vec![
                Cell::from(entry.changed_at.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(entry.item_id.clone()),
                Cell::from(format!("{:.2}", entry.old_price)),
                Cell::from(format!("{:.2}", entry.new_price)).style(Style::default().fg(color)),
                Cell::from(entry.changed_by.clone()),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(18),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Price History - newest first "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.history_state);
}

fn render_views(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();

    let marker = |active: bool| {
        if active {
            Span::styled("→", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        } else {
            Span::raw(" ")
        }
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Quick Views & Filters",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::raw("  "),
            marker(app.category_filter.is_none()),
            Span::styled("1", Style::default().fg(Color::Yellow)),
            Span::raw(format!(". {:<22}", "All Items")),
            Span::styled(format!("{:>4} items", app.items.len()), Style::default().fg(Color::White)),
        ]),
    ];

    for (i, category) in MenuCategory::ALL.iter().enumerate() {
        content.push(Line::from(vec![
            Span::raw("  "),
            marker(app.category_filter == Some(*category)),
            Span::styled(format!("{}", i + 2), Style::default().fg(Color::Yellow)),
            Span::raw(format!(". {:<22}", category.label())),
            Span::styled(
                format!("{:>4} items", stats.count_for(*category)),
                Style::default().fg(category_color(*category)),
            ),
        ]));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![Span::styled(
        "  Hint: press 1-5 to filter, c to clear",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )]));

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Views - Categories "),
    );

    f.render_widget(paragraph, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Item Details ");

    let Some(item) = app.selected_item() else {
        f.render_widget(Paragraph::new("No item selected").block(block), area);
        return;
    };

    let label = |text: &'static str| {
        Span::styled(text, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![label("  Id: "), Span::raw(item.id.clone())]),
        Line::from(vec![label("  Name: "), Span::raw(item.name.clone())]),
        Line::from(vec![
            label("  Category: "),
            Span::styled(
                item.category.label(),
                Style::default().fg(category_color(item.category)),
            ),
        ]),
        Line::from(vec![label("  Price: "), Span::raw(format!("{:.2}", item.price))]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(vec![Span::styled(
            "  PRICE CHANGES",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )]),
        Line::from(""),
    ];

    let changes = app.changes_for(&item.id);
    if changes.is_empty() {
        content.push(Line::from("  (none)"));
    }
    for change in changes.iter().rev().take(8) {
        content.push(Line::from(format!(
            "  {}  {:.2} → {:.2}  by {}",
            change.changed_at.format("%Y-%m-%d"),
            change.old_price,
            change.new_price,
            change.changed_by
        )));
    }

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let (selected, total) = match app.current_page {
        Page::PriceHistory => (app.history_state.selected(), app.history.len()),
        _ => (app.state.selected(), app.filtered_items.len()),
    };
    let row = selected.map(|i| i + 1).unwrap_or(0);

    let mut status_spans = vec![Span::styled(
        format!(" Row: {}/{} ", row, total),
        Style::default().fg(Color::Cyan),
    )];

    if app.current_page == Page::Menu {
        if let Some(item) = app.selected_item() {
            status_spans.push(Span::raw(" | "));
            status_spans.push(Span::raw(truncate(&item.name, 24)));
        }
    }

    if let Some(category) = app.category_filter {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(
            format!("Filter: {}", category.label()),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear)"));
    }

    status_spans.push(Span::raw(" | "));
    match app.current_page {
        Page::Menu => {
            status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Details | "));
        }
        Page::Views => {
            status_spans.push(Span::styled("1-5", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Filter | "));
        }
        Page::PriceHistory => {}
    }
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Nav | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
