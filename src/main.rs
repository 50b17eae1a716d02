use std::{fs, io, path::Path, process};

use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    DefaultTerminal, Frame,
};
use serde::Deserialize;

use sitenav::{Behaviors, Document, Key, MenuState, NavConfig, PageEvent, SyntheticPage};

/// Explicit subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Print the section bindings and menu hooks resolved from a page layout
    Inspect {
        /// Path to the page layout JSON
        page: String,
    },
    /// Replay a gesture script against a page and print the state timeline
    Replay {
        /// Path to the page layout JSON
        page: String,
        /// Path to the gesture script JSON
        #[arg(long)]
        script: String,
        /// Optional config JSON overriding the behavior tunables
        #[arg(long)]
        config: Option<String>,
    },
    /// Interactively drive a page layout in the terminal
    View {
        /// Path to the page layout JSON
        page: String,
    },
}

/// Full CLI with explicit subcommands.
#[derive(Parser)]
#[command(
    name = "sitenav",
    version,
    about = "Headless page-navigation behaviors: scroll spy, mobile menu, smooth scrolling",
    after_help = "INVOCATION FORMS:\n  sitenav inspect <page.json>                     Show resolved bindings\n  sitenav replay <page.json> --script <ev.json>   Replay a gesture script\n  sitenav view <page.json>                        Interactive TUI driver"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// One scripted user gesture.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Gesture {
    /// Scroll the page to a vertical offset.
    Scroll { y: i64 },
    /// Click an element, addressed by id or by class.
    Click {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        class: Option<String>,
    },
    /// Press a key ("escape" is the only one behaviors react to).
    Key { key: String },
    /// Resize the viewport.
    Resize { width: u32 },
    /// Let the given number of milliseconds pass (fires due timers).
    Wait { ms: u64 },
}

fn main() -> io::Result<()> {
    match Cli::parse().command {
        Commands::Inspect { page } => {
            let page = load_page(&page);
            run_inspect(page);
            Ok(())
        }
        Commands::Replay {
            page,
            script,
            config,
        } => {
            let page = load_page(&page);
            let config = load_config(config.as_deref());
            let gestures = load_script(&script);
            run_replay(page, config, gestures);
            Ok(())
        }
        Commands::View { page } => {
            let page = load_page(&page);
            ratatui::run(|terminal| run_view(terminal, page))
        }
    }
}

// ---------------------------------------------------------------------------
// Input loading
// ---------------------------------------------------------------------------

fn read_or_exit(path: &str) -> String {
    fs::read_to_string(Path::new(path)).unwrap_or_else(|e| {
        match e.kind() {
            io::ErrorKind::NotFound => {
                eprintln!("Error: file not found: {path}");
            }
            io::ErrorKind::PermissionDenied => {
                eprintln!("Error: permission denied: {path}");
            }
            _ => {
                eprintln!("Error reading '{path}': {e}");
            }
        }
        process::exit(1);
    })
}

fn load_page(path: &str) -> SyntheticPage {
    let source = read_or_exit(path);
    SyntheticPage::from_json(&source).unwrap_or_else(|e| {
        eprintln!("Error: '{path}' is not a valid page layout: {e}");
        process::exit(1);
    })
}

fn load_config(path: Option<&str>) -> NavConfig {
    let Some(path) = path else {
        return NavConfig::default();
    };
    let source = read_or_exit(path);
    serde_json::from_str(&source).unwrap_or_else(|e| {
        eprintln!("Error: '{path}' is not a valid config: {e}");
        process::exit(1);
    })
}

fn load_script(path: &str) -> Vec<Gesture> {
    let source = read_or_exit(path);
    serde_json::from_str(&source).unwrap_or_else(|e| {
        eprintln!("Error: '{path}' is not a valid gesture script: {e}");
        process::exit(1);
    })
}

// ---------------------------------------------------------------------------
// Event cascade
// ---------------------------------------------------------------------------

/// Deliver a batch of events and run its cascade to quiescence.
///
/// After each delivery round the programmatic effects (animated scrolls) are
/// drained and the next animation frame, if requested, is ticked — the same
/// settling a browser performs between user gestures.
fn settle(behaviors: &mut Behaviors, page: &mut SyntheticPage, mut events: Vec<PageEvent>) {
    while !events.is_empty() {
        for event in &events {
            behaviors.handle(page, event);
        }
        events = page.drain_events();
        events.extend(page.tick_frame());
    }
}

/// The nav link currently carrying the active marker, if any.
fn active_href(page: &SyntheticPage) -> Option<String> {
    page.link_views()
        .into_iter()
        .find(|l| l.active)
        .and_then(|l| l.href)
}

fn menu_label(state: MenuState) -> &'static str {
    match state {
        MenuState::Closed => "closed",
        MenuState::Open => "open",
    }
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

fn run_inspect(mut page: SyntheticPage) {
    let config = NavConfig::default();
    let behaviors = Behaviors::attach(&config, &mut page);

    match page.first_by_class("hamburger") {
        Some(node) => println!("trigger: node={node} class=hamburger"),
        None => println!("trigger: absent (menu wiring skipped)"),
    }
    match page.nav_menu() {
        Some(node) => println!("menu: node={node} id=mobile-menu"),
        None => println!("menu: absent (menu wiring skipped)"),
    }

    let bound = behaviors.spy.bindings();
    println!("bindings: {}", bound.len());
    for (id, link) in &bound {
        let section = page.element_by_id(id).expect("bound ids resolve");
        println!(
            "  #{id} link={link} top={} height={}",
            page.offset_top(section),
            page.client_height(section),
        );
    }

    // Report nav links that did not produce a binding, with the reason.
    for view in page.link_views() {
        let reason = match view.href.as_deref() {
            None => "no-href",
            Some(href) => match href.strip_prefix('#') {
                None => "not-a-fragment",
                Some("") => "empty-fragment",
                Some(id) if page.element_by_id(id).is_none() => "missing-target",
                Some(_) => continue,
            },
        };
        println!(
            "excluded: link={} href={} reason={reason}",
            view.node,
            view.href.as_deref().unwrap_or("-"),
        );
    }
}

// ---------------------------------------------------------------------------
// replay
// ---------------------------------------------------------------------------

fn run_replay(mut page: SyntheticPage, config: NavConfig, gestures: Vec<Gesture>) {
    let mut behaviors = Behaviors::attach(&config, &mut page);
    let pending = page.drain_events();
    settle(&mut behaviors, &mut page, pending);

    for (step, gesture) in gestures.iter().enumerate() {
        let events = match gesture {
            Gesture::Scroll { y } => page.scroll(*y),
            Gesture::Click { id, class } => {
                let target = id
                    .as_deref()
                    .and_then(|id| page.element_by_id(id))
                    .or_else(|| class.as_deref().and_then(|c| page.first_by_class(c)));
                match target {
                    Some(node) => page.click(node),
                    None => {
                        eprintln!("[replay] step={step} skip reason=no-such-element");
                        Vec::new()
                    }
                }
            }
            Gesture::Key { key } => {
                let key = if key.eq_ignore_ascii_case("escape") {
                    Key::Escape
                } else {
                    Key::Other
                };
                page.key(key)
            }
            Gesture::Resize { width } => page.resize(*width),
            Gesture::Wait { ms } => page.advance_time(*ms),
        };
        settle(&mut behaviors, &mut page, events);

        println!(
            "step={step} scroll={} menu={} active={}",
            page.scroll_y(),
            menu_label(behaviors.menu_state()),
            active_href(&page).unwrap_or_else(|| "-".to_owned()),
        );
    }
}

// ---------------------------------------------------------------------------
// view (TUI)
// ---------------------------------------------------------------------------

const SCROLL_STEP: i64 = 40;
const PAGE_STEP: i64 = 400;
const WIDTH_STEP: u32 = 100;

fn run_view(terminal: &mut DefaultTerminal, mut page: SyntheticPage) -> io::Result<()> {
    let config = NavConfig::default();
    let mut behaviors = Behaviors::attach(&config, &mut page);
    let pending = page.drain_events();
    settle(&mut behaviors, &mut page, pending);

    let max_scroll = page
        .section_views()
        .iter()
        .map(|s| s.offset_top + s.height)
        .max()
        .unwrap_or(0);

    loop {
        terminal.draw(|frame| ui(frame, &page, &behaviors))?;

        let event = event::read()?;
        let Event::Key(key) = event else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let gesture = match key.code {
            KeyCode::Char('q') => return Ok(()),

            // Scrolling
            KeyCode::Char('j') | KeyCode::Down => page.scroll(page.scroll_y() + SCROLL_STEP),
            KeyCode::Char('k') | KeyCode::Up => {
                page.scroll((page.scroll_y() - SCROLL_STEP).max(0))
            }
            KeyCode::PageDown => page.scroll(page.scroll_y() + PAGE_STEP),
            KeyCode::PageUp => page.scroll((page.scroll_y() - PAGE_STEP).max(0)),
            KeyCode::Char('g') | KeyCode::Home => page.scroll(0),
            KeyCode::Char('G') | KeyCode::End => page.scroll(max_scroll),

            // Menu
            KeyCode::Char('m') => match behaviors.menu.trigger() {
                Some(trigger) => page.click(trigger),
                None => Vec::new(),
            },
            KeyCode::Char('o') => match behaviors.menu.overlay() {
                Some(overlay) => page.click(overlay),
                None => Vec::new(),
            },
            KeyCode::Esc => page.key(Key::Escape),

            // Viewport width (breakpoint demo)
            KeyCode::Char('+') | KeyCode::Char('=') => {
                page.resize(page.viewport_width() + WIDTH_STEP)
            }
            KeyCode::Char('-') => {
                page.resize(page.viewport_width().saturating_sub(WIDTH_STEP))
            }

            // Activate the nth nav link
            KeyCode::Char(c @ '1'..='9') => {
                let idx = (c as usize) - ('1' as usize);
                match page.link_views().get(idx) {
                    Some(link) => page.click(link.node),
                    None => Vec::new(),
                }
            }

            _ => continue,
        };
        settle(&mut behaviors, &mut page, gesture);
    }
}

fn ui(frame: &mut Frame, page: &SyntheticPage, behaviors: &Behaviors) {
    let area = frame.area();
    let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
    let panes =
        Layout::horizontal([Constraint::Length(34), Constraint::Min(1)]).split(chunks[0]);

    render_nav_pane(frame, page, behaviors, panes[0]);
    render_section_pane(frame, page, panes[1]);

    let status = format!(
        " scroll={} width={} menu={} active={}  q quit  j/k scroll  m menu  o overlay  esc close  +/- width  1-9 links",
        page.scroll_y(),
        page.viewport_width(),
        menu_label(behaviors.menu_state()),
        active_href(page).unwrap_or_else(|| "-".to_owned()),
    );
    let status_bar = Paragraph::new(Span::styled(
        status,
        Style::default().fg(Color::Black).bg(Color::White),
    ))
    .style(Style::default().bg(Color::White));
    frame.render_widget(status_bar, chunks[1]);
}

fn render_nav_pane(frame: &mut Frame, page: &SyntheticPage, behaviors: &Behaviors, area: Rect) {
    let mut lines: Vec<Line<'static>> = Vec::new();

    let open = behaviors.menu_state() == MenuState::Open;
    let state_style = if open {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(Span::styled(
        format!(" menu: {}", menu_label(behaviors.menu_state())),
        state_style,
    )));
    if let Some(trigger) = behaviors.menu.trigger() {
        lines.push(Line::from(Span::raw(format!(
            " aria-expanded: {}",
            page.attr(trigger, "aria-expanded").unwrap_or_default(),
        ))));
    }
    lines.push(Line::from(""));

    for (i, link) in page.link_views().into_iter().enumerate() {
        let href = link.href.unwrap_or_else(|| "-".to_owned());
        let (marker, style) = if link.active {
            (
                "●",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )
        } else {
            ("·", Style::default().fg(Color::Gray))
        };
        lines.push(Line::from(Span::styled(
            format!(" {} [{}] {href}", marker, i + 1),
            style,
        )));
    }

    let block = Block::bordered().title(" Nav ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_section_pane(frame: &mut Frame, page: &SyntheticPage, area: Rect) {
    let active = active_href(page);
    let y = page.scroll_y();
    let mut lines: Vec<Line<'static>> = Vec::new();

    for section in page.section_views() {
        let bottom = section.offset_top + section.height;
        let in_view = y >= section.offset_top && y < bottom;
        let fragment = format!("#{}", section.id);
        let current = active.as_deref() == Some(fragment.as_str());
        let style = if current {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if in_view {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let marker = if current { "▶" } else { " " };
        lines.push(Line::from(Span::styled(
            format!(
                " {marker} #{:<16} {:>6}..{:<6} h={}",
                section.id, section.offset_top, bottom, section.height,
            ),
            style,
        )));
    }

    if let Some(fragment) = page.fragment() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" url: #{fragment}"),
            Style::default().fg(Color::Yellow),
        )));
    }

    let block = Block::bordered().title(" Sections ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
