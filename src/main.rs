use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use unicode_width::UnicodeWidthStr;

use pacman_game::{
    Cell as Tile, Config, Direction, HighScores, NameEntry, PursuerState, Round, Snapshot, TilePos,
};

const CELL_W: usize = 2;
const FLASH_FRAMES: u32 = 120;
const FLASH_PERIOD: u32 = 15;
const PURSUER_COLORS: [Color; 4] = [
    Color::Rgb { r: 255, g: 0, b: 0 },
    Color::Rgb { r: 255, g: 184, b: 222 },
    Color::Rgb { r: 0, g: 255, b: 222 },
    Color::Rgb { r: 255, g: 184, b: 82 },
];

enum Screen {
    Menu,
    Playing,
    GameOver,
    NameEntry(NameEntry),
    HighScores,
}

impl Screen {
    fn id(&self) -> u8 {
        match self {
            Screen::Menu => 0,
            Screen::Playing => 1,
            Screen::GameOver => 2,
            Screen::NameEntry(_) => 3,
            Screen::HighScores => 4,
        }
    }
}

enum Flow {
    Continue,
    Intent(Direction),
    Quit,
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    PlayerClosed,
    Ghost,
    Frightened,
    Eyes,
    Wall,
    Empty,
    Pellet,
    Power,
    Door,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    last_text: Vec<String>,
    last_screen: Option<u8>,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![
                Cell {
                    glyph: Glyph::Empty,
                    color: Color::Reset,
                };
                width * height
            ],
            last_hud: String::new(),
            last_text: Vec::new(),
            last_screen: None,
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

fn main() -> Result<()> {
    let config = Config::from_env();
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &config);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout, config: &Config) -> Result<()> {
    let mut scores = HighScores::open(&config.scores_path, config.max_scores);
    let mut round = Round::new(config)?;
    let mut screen = Screen::Menu;
    let mut renderer = Renderer::new(
        round.grid().width() as usize,
        round.grid().height() as usize,
    );
    let frame_time = Duration::from_micros(1_000_000 / config.fps.max(1));

    loop {
        let frame_start = Instant::now();
        let mut intent = Direction::None;
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            match handle_key(key.code, &mut screen, &mut round, &mut scores, config)? {
                Flow::Quit => return Ok(()),
                Flow::Intent(dir) => intent = dir,
                Flow::Continue => {}
            }
        }

        if matches!(screen, Screen::Playing) {
            round.step(intent);
            if round.is_over() {
                screen = Screen::GameOver;
            }
        }

        draw(stdout, &screen, &round, &scores, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn handle_key<'a>(
    code: KeyCode,
    screen: &mut Screen,
    round: &mut Round<'a>,
    scores: &mut HighScores,
    config: &'a Config,
) -> Result<Flow> {
    match screen {
        Screen::Menu => match code {
            KeyCode::Enter => {
                *round = Round::new(config)?;
                *screen = Screen::Playing;
            }
            KeyCode::Char('h') => *screen = Screen::HighScores,
            KeyCode::Char('q') => return Ok(Flow::Quit),
            _ => {}
        },
        Screen::Playing => match code {
            KeyCode::Esc => *screen = Screen::Menu,
            KeyCode::Char('q') => return Ok(Flow::Quit),
            code => {
                if let Some(dir) = dir_for_key(code) {
                    return Ok(Flow::Intent(dir));
                }
            }
        },
        Screen::GameOver => match code {
            KeyCode::Enter => {
                *screen = if scores.is_high_score(round.score()) {
                    Screen::NameEntry(NameEntry::default())
                } else {
                    Screen::Menu
                };
            }
            KeyCode::Char('r') => {
                *round = Round::new(config)?;
                *screen = Screen::Playing;
            }
            KeyCode::Char('q') => return Ok(Flow::Quit),
            _ => {}
        },
        Screen::NameEntry(name) => match code {
            KeyCode::Enter if !name.is_empty() => {
                scores.add_score(name.as_str(), round.score());
                *screen = Screen::HighScores;
            }
            KeyCode::Backspace => name.pop(),
            KeyCode::Esc => *screen = Screen::Menu,
            KeyCode::Char(ch) => {
                name.push(ch);
            }
            _ => {}
        },
        Screen::HighScores => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter) {
                *screen = Screen::Menu;
            }
        }
    }
    Ok(Flow::Continue)
}

fn dir_for_key(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Some(Direction::Right),
        _ => None,
    }
}

fn draw(
    stdout: &mut Stdout,
    screen: &Screen,
    round: &Round<'_>,
    scores: &HighScores,
    renderer: &mut Renderer,
) -> io::Result<()> {
    if renderer.last_screen != Some(screen.id()) {
        renderer.last_screen = Some(screen.id());
        renderer.needs_full = true;
        renderer.last_text.clear();
        stdout.queue(Clear(ClearType::All))?;
    }

    match screen {
        Screen::Playing => render(stdout, &round.snapshot(), renderer),
        Screen::GameOver => {
            render(stdout, &round.snapshot(), renderer)?;
            render_game_over(stdout, round, scores, renderer)
        }
        Screen::Menu => render_text(
            stdout,
            renderer,
            vec![
                "PACMAN".to_string(),
                String::new(),
                "ENTER - Start".to_string(),
                "H - High Scores".to_string(),
                "Q - Quit".to_string(),
                String::new(),
                "Move with arrows, WASD or hjkl".to_string(),
            ],
        ),
        Screen::NameEntry(name) => render_text(
            stdout,
            renderer,
            vec![
                "NEW HIGH SCORE!".to_string(),
                format!("Score: {}", round.score()),
                String::new(),
                "Enter name:".to_string(),
                format!("[ {:<10} ]", format!("{}_", name.as_str())),
                String::new(),
                "ENTER save, ESC skip".to_string(),
            ],
        ),
        Screen::HighScores => {
            let mut lines = vec!["HIGH SCORES".to_string(), String::new()];
            let entries = scores.load_scores();
            if entries.is_empty() {
                lines.push("No scores yet!".to_string());
            }
            for (i, entry) in entries.iter().enumerate() {
                lines.push(format!("{:>2}. {:<10} {:>7}", i + 1, entry.name, entry.score));
            }
            lines.push(String::new());
            lines.push("ESC to go back".to_string());
            render_text(stdout, renderer, lines)
        }
    }
}

fn render(stdout: &mut Stdout, snap: &Snapshot<'_>, renderer: &mut Renderer) -> io::Result<()> {
    let width = snap.grid.width() as usize;
    let height = snap.grid.height() as usize;
    let needed_h = (height + 2) as u16;
    let needed_w = (width * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let hud = format!(
        "Score: {}  Lives: {}  Level: {}  Pellets: {}  (esc menu, q quit)",
        snap.score,
        snap.lives,
        snap.level,
        snap.pellets.remaining()
    );
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    for y in 0..height {
        for x in 0..width {
            let pos = TilePos::new(x as i32, y as i32);
            let cell = cell_for(snap, pos);
            let idx = y * width + x;
            if renderer.needs_full || cell != renderer.last[idx] {
                renderer.last[idx] = cell;
                draw_cell(stdout, renderer, x, y, cell)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn cell_for(snap: &Snapshot<'_>, pos: TilePos) -> Cell {
    if snap.grid.tile_at(snap.player.pixel) == pos {
        let glyph = if snap.player.mouth_open {
            Glyph::Player
        } else {
            Glyph::PlayerClosed
        };
        return Cell {
            glyph,
            color: Color::Yellow,
        };
    }
    for (idx, pursuer) in snap.pursuers.iter().enumerate() {
        if snap.grid.tile_at(pursuer.pixel) != pos {
            continue;
        }
        return match pursuer.state {
            PursuerState::Eaten => Cell {
                glyph: Glyph::Eyes,
                color: Color::White,
            },
            PursuerState::Vulnerable { remaining } => {
                let flash = remaining < FLASH_FRAMES && (remaining / FLASH_PERIOD) % 2 == 0;
                Cell {
                    glyph: Glyph::Frightened,
                    color: if flash { Color::White } else { Color::Blue },
                }
            }
            _ => Cell {
                glyph: Glyph::Ghost,
                color: PURSUER_COLORS[idx % PURSUER_COLORS.len()],
            },
        };
    }
    match snap.grid.cell(pos) {
        Tile::Wall => Cell {
            glyph: Glyph::Wall,
            color: Color::Blue,
        },
        Tile::GhostDoor => Cell {
            glyph: Glyph::Door,
            color: Color::Cyan,
        },
        _ if snap.pellets.has_pellet(pos) => Cell {
            glyph: Glyph::Pellet,
            color: Color::White,
        },
        _ if snap.pellets.has_power(pos) => Cell {
            glyph: Glyph::Power,
            color: Color::Magenta,
        },
        _ => Cell {
            glyph: Glyph::Empty,
            color: Color::Reset,
        },
    }
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, cell: Cell) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Player => "😃",
        Glyph::PlayerClosed => "😐",
        Glyph::Ghost => "👻",
        Glyph::Frightened => "😱",
        Glyph::Eyes => "👀",
        Glyph::Wall => "██",
        Glyph::Empty => "  ",
        Glyph::Pellet => "· ",
        Glyph::Power => "● ",
        Glyph::Door => "==",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

fn render_game_over(
    stdout: &mut Stdout,
    round: &Round<'_>,
    scores: &HighScores,
    renderer: &Renderer,
) -> io::Result<()> {
    let prompt = if scores.is_high_score(round.score()) {
        "NEW HIGH SCORE! ENTER to save"
    } else {
        "ENTER menu, R retry"
    };
    let msg = format!("GAME OVER - Final Score: {}  {}", round.score(), prompt);
    let y = renderer.origin_y + round.grid().height() as u16;
    stdout.queue(MoveTo(renderer.origin_x, y))?;
    stdout.queue(SetForegroundColor(Color::Red))?;
    stdout.queue(Print(msg))?;
    stdout.queue(ResetColor)?;
    stdout.flush()?;
    Ok(())
}

fn render_text(stdout: &mut Stdout, renderer: &mut Renderer, lines: Vec<String>) -> io::Result<()> {
    if lines == renderer.last_text {
        return Ok(());
    }
    let (term_w, term_h) = terminal::size()?;
    stdout.queue(Clear(ClearType::All))?;
    let top = term_h.saturating_sub(lines.len() as u16) / 2;
    for (i, line) in lines.iter().enumerate() {
        let w = UnicodeWidthStr::width(line.as_str()) as u16;
        stdout.queue(MoveTo(term_w.saturating_sub(w) / 2, top + i as u16))?;
        stdout.queue(SetForegroundColor(if i == 0 { Color::Yellow } else { Color::White }))?;
        stdout.queue(Print(line))?;
    }
    stdout.queue(ResetColor)?;
    stdout.flush()?;
    renderer.last_text = lines;
    Ok(())
}
