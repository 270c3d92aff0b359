//! fastterm demo: an animated scene drawn through the triple-buffered pipeline.
//!
//! Press `q`, `Esc` or `Ctrl+C` to quit. Logs go to a file because the
//! terminal itself is busy showing frames.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fastterm::fastterm_terminal::terminal_size;
use fastterm::prelude::{
    Alignment, Cell, Color, CrosstermInput, DrawContext, ExecutionMode, FramePacer, InputHandler,
    KeyCode, Point, Rect, RenderConfig, Size, TerminalSession, Writer,
};

/// Animated fastterm demo
#[derive(Parser)]
#[command(name = "fastterm-demo")]
#[command(version)]
struct Args {
    /// Render configuration file (TOML)
    #[arg(short, long, env = "FASTTERM_CONFIG")]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long, default_value = "fastterm-demo.log")]
    log_file: PathBuf,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Quit after this many frames
    #[arg(long)]
    frames: Option<u64>,
}

fn setup_logging(path: &Path, level: &str) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Ok(guard)
}

fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    RenderConfig::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Draws one frame. Things drawn first end up on top.
fn draw_scene(ctx: &mut DrawContext, frame: u64, fps: f32) {
    let size = ctx.size();
    let bounds = Rect::from_size(size);
    ctx.push_rectangle(bounds, Alignment::TopLeft);

    // Status line.
    let status = format!(" fastterm {size} | frame {frame} | {fps:.1} fps | q to quit ");
    let glyphs: Vec<char> = status.chars().collect();
    ctx.push_rectangle(Rect::new(0, 0, glyphs.len() as u16, 1), Alignment::BottomLeft);
    ctx.draw_cells(ExecutionMode::Sequential, |p| {
        let glyph = glyphs.get(p.x as usize).copied().unwrap_or(' ');
        Cell::styled(glyph, Color::BLACK, Color::rgb(200, 200, 200))
    });
    ctx.pop_rectangle();

    // A bouncing block above a translucent panel.
    let span = i32::from(size.width.saturating_sub(8)).max(1);
    let phase = (frame % (span as u64 * 2)) as i32;
    let x = if phase < span { phase } else { span * 2 - phase };
    ctx.push_rectangle(Rect::new(x, i32::from(size.height / 2), 8, 2), Alignment::TopLeft);
    ctx.draw_cells(ExecutionMode::Sequential, |_| Cell::filled(Color::argb(255, 230, 120, 30)));
    ctx.pop_rectangle();

    ctx.push_rectangle(
        Rect::new(0, 0, size.width.saturating_mul(2) / 3, size.height / 2),
        Alignment::Center,
    );
    ctx.draw_cells(ExecutionMode::Sequential, |_| Cell::filled(Color::argb(96, 255, 255, 255)));
    ctx.pop_rectangle();

    // Background gradient.
    let height = f32::from(size.height.max(1));
    let mode = ctx.config().draw_mode;
    ctx.draw_cells(mode, move |p: Point| {
        let t = p.y as f32 / height;
        Cell::filled(Color::interpolate(Color::rgb(10, 20, 60), Color::rgb(60, 10, 40), t))
    });
    ctx.pop_rectangle();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = setup_logging(&args.log_file, &args.log_level)?;
    let config = load_config(args.config.as_deref())?;
    info!(?config, "starting demo");

    let mut session = TerminalSession::start().context("failed to prepare terminal")?;
    let mut ctx = DrawContext::with_config(terminal_size()?, config.clone());
    let writer = Writer::console().shared();
    let mut pacer = FramePacer::from_config(&config);

    let quit = Arc::new(AtomicBool::new(false));
    let mut input = InputHandler::new(CrosstermInput::new());
    let flag = Arc::clone(&quit);
    input.on_key(move |key| {
        let ctrl_c = key.ctrl() && key.code == KeyCode::Char('c');
        if key.is_char('q') || key.code == KeyCode::Esc || ctrl_c {
            flag.store(true, Ordering::Relaxed);
        }
    });

    let mut frame = 0u64;
    pacer.request_live();
    while !quit.load(Ordering::Relaxed) && args.frames.is_none_or(|limit| frame < limit) {
        let started = Instant::now();
        pacer.tick();
        input.process_events()?;

        let size: Size = terminal_size()?;
        ctx.resize(size, config.resize_alignment, config.resize_mode);

        if ctx.is_flush_in_flight() {
            pacer.record_publish(false);
        } else {
            draw_scene(&mut ctx, frame, pacer.measured_fps());
            let published = ctx.publish(&writer);
            pacer.record_publish(published);
            frame += u64::from(published);
        }

        pacer.wait(started.elapsed()).await;
    }
    pacer.drop_live();

    if let Err(e) = ctx.close().await {
        warn!(error = %e, "last frame failed to flush");
    }
    session.leave()?;
    info!(
        published = pacer.published_frames(),
        dropped = pacer.dropped_frames(),
        "demo finished"
    );
    Ok(())
}
