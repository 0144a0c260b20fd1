//! Damage dialog TUI for game masters.
//!
//! Presents a modal form over the tokens of a scene: enter a damage roll
//! and type, optionally a saving throw, check the targets, and apply. Each
//! affected token gets a chat message and, with the animation add-ons
//! active, a visual effect.
//!
//! # Headless Mode
//!
//! Run with `--headless` to apply one submission straight from flags:
//!
//! ```bash
//! smite --headless --roll 2d6+4 --damage-type fire --target all
//! ```

mod app;
mod events;
mod headless;
mod ui;

use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use clap::Parser;
use crossterm::{
    event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use smite_core::animation::{animations_enabled, EffectRecorder, ANIMATION_ENGINE, EFFECTS_PACK};
use smite_core::dice::RngRoller;
use smite_core::{preflight, HostContext, Scene, SceneFeed};

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;
use ui::theme::DialogTheme;

#[derive(Parser, Debug)]
#[command(name = "smite", about = "Apply rolled damage to the tokens of a scene")]
struct Cli {
    /// Scene JSON file; a built-in sample scene is used when omitted.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Seed for deterministic rolls.
    #[arg(long)]
    seed: Option<u64>,

    /// Activate the animation add-ons so effects play on hit.
    #[arg(long)]
    animate: bool,

    /// Run without the TUI, applying one submission from the flags below.
    #[arg(long)]
    headless: bool,

    /// Damage roll, e.g. "2d6+4" (headless).
    #[arg(long)]
    roll: Option<String>,

    /// Damage type key, e.g. "fire" (headless).
    #[arg(long)]
    damage_type: Option<String>,

    /// Saving throw DC (headless).
    #[arg(long)]
    save_dc: Option<String>,

    /// Saving throw ability key, e.g. "dex" (headless).
    #[arg(long)]
    save_ability: Option<String>,

    /// Target token name; repeatable, "all" selects every token (headless).
    #[arg(long)]
    target: Vec<String>,

    /// Write the damaged scene back to the scene file (headless).
    #[arg(long)]
    write: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.headless)?;

    let scene = match &cli.scene {
        Some(path) => Scene::load(path).await?,
        None => Scene::sample(),
    };
    tracing::info!(scene = %scene.name, tokens = scene.len(), "scene loaded");

    let mut context = HostContext::gamemaster("Gamemaster");
    if cli.animate {
        context.modules.activate(ANIMATION_ENGINE);
        context.modules.activate(EFFECTS_PACK);
    }

    // Entry preconditions: abort with the warning, nothing else runs.
    if let Err(warning) = preflight(&context, &scene) {
        eprintln!("{warning}");
        std::process::exit(1);
    }

    let roller = match cli.seed {
        Some(seed) => RngRoller::seeded(seed),
        None => RngRoller::new(),
    };

    if cli.headless {
        let submission = headless::Submission {
            roll: cli.roll.unwrap_or_default(),
            damage_type: cli.damage_type,
            save_dc: cli.save_dc,
            save_ability: cli.save_ability,
            targets: cli.target,
            write: cli.write,
        };
        return headless::run_headless(scene, cli.scene, &context, roller, submission).await;
    }

    // An open dialog is tied to the scene it was built from: watch the
    // scene file and force-close on any change.
    let feed = SceneFeed::new();
    if let Some(path) = cli.scene.clone() {
        spawn_scene_watcher(path, feed.clone());
    }

    let effects = animations_enabled(&context.modules).then(EffectRecorder::new);
    let app = App::new(scene, feed.open_dialog(), roller, effects);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    match result {
        Ok(Some(reason)) => println!("{reason}"),
        Ok(None) => {}
        Err(e) => eprintln!("Error: {e}"),
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<Option<String>> {
    let theme = DialogTheme::default();

    loop {
        app.tick();
        terminal.draw(|f| render(f, &app, &theme))?;

        // Run a submitted form on the async side of the loop.
        if app.pending_submit {
            app.pending_submit = false;
            app.set_status("Applying damage...");
            terminal.draw(|f| render(f, &app, &theme))?;
            app.submit().await;
        }

        if app.should_quit {
            return Ok(app.close_reason.take());
        }

        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            match handle_event(&mut app, ev) {
                EventResult::Quit => return Ok(app.close_reason.take()),
                EventResult::Submit => app.pending_submit = true,
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        }
    }
}

fn init_tracing(headless: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if headless {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        // The terminal belongs to the dialog; logs go to a file.
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("smite.log")?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Arc::new(file))
            .init();
    }
    Ok(())
}

/// Poll the scene file's mtime and announce changes on the feed.
fn spawn_scene_watcher(path: PathBuf, feed: SceneFeed) {
    tokio::spawn(async move {
        let mut last = modified_at(&path).await;
        loop {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let current = modified_at(&path).await;
            if current != last {
                feed.scene_changed(path.display().to_string());
                last = current;
            }
        }
    });
}

async fn modified_at(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path)
        .await
        .ok()
        .and_then(|m| m.modified().ok())
}
