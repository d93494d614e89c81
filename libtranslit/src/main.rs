use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use libtranslit::{
    create_lookup, create_widget, language_name, resolve_lang, KeyEvent, KeyResult,
    SuggestionLookup, TextBuffer, TranslitConfig, Widget,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Simulated time between two typed characters.
const KEYSTROKE: Duration = Duration::from_millis(20);

#[derive(Parser)]
#[command(name = "translit", version, about = "Phonetic transliteration input")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target language (short code like `te` or a full input-tool tag)
    #[arg(long)]
    lang: Option<String>,

    /// Maximum number of suggestions
    #[arg(long)]
    limit: Option<usize>,

    /// Custom suggestion endpoint instead of Google Input Tools
    #[arg(long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up one word and print its suggestions
    Lookup {
        word: String,
    },
    /// Type lines into a widget and pick suggestions
    Interactive,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<TranslitConfig> {
    let mut config = match &args.config {
        Some(path) => TranslitConfig::load_toml(path)
            .map_err(|e| anyhow::anyhow!("failed to load config from {}: {e}", path.display()))?,
        None => TranslitConfig::default(),
    };

    if let Some(lang) = &args.lang {
        config.base_mut().lang = lang.clone();
    }
    if let Some(limit) = args.limit {
        config.base_mut().limit = limit;
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    let lang = resolve_lang(&config.base().lang);
    config.base_mut().lang = lang;
    Ok(config)
}

fn run_lookup(config: &TranslitConfig, word: &str) -> Result<()> {
    let word = word.trim();
    if word.is_empty() || word.chars().any(char::is_whitespace) {
        bail!("expected a single word, got {word:?}");
    }

    let lookup = create_lookup(config);
    let base = config.base();
    let raw = lookup
        .lookup(word, &base.lang, base.limit)
        .with_context(|| format!("lookup failed for {word:?}"))?;
    let suggestions = libtranslit_core::normalize_suggestions(&raw, base.limit);

    if suggestions.is_empty() {
        println!("  → (no suggestions)");
    } else {
        for (i, s) in suggestions.iter().enumerate() {
            println!("  {}. {}", i + 1, s);
        }
    }
    Ok(())
}

/// Simulated host: owns the clock and forwards edits and keys.
struct Session {
    widget: Widget,
    now: Instant,
    debounce: Duration,
}

impl Session {
    fn new(config: &TranslitConfig) -> Self {
        Self {
            widget: create_widget(config),
            now: Instant::now(),
            debounce: Duration::from_millis(config.base().debounce_ms),
        }
    }

    /// Type `line` at the caret, one character at a time.
    fn type_text(&mut self, line: &str) {
        for ch in line.chars() {
            self.now += KEYSTROKE;
            let key = if ch == ' ' {
                KeyEvent::Space
            } else {
                KeyEvent::Char(ch)
            };
            if self.widget.process_key(key) == KeyResult::Handled {
                self.finish_accept();
                continue;
            }

            let mut buffer = TextBuffer::from_text(self.widget.text());
            buffer.set_cursor(self.widget.cursor());
            buffer.insert_str(ch.encode_utf8(&mut [0u8; 4]));
            self.widget
                .handle_change(buffer.text(), buffer.cursor(), self.now);
            self.echo_change();
            self.widget.tick(self.now);
        }
        self.settle();
    }

    /// Let the debounce timer fire.
    fn settle(&mut self) {
        self.now += self.debounce;
        self.widget.tick(self.now);
    }

    fn key(&mut self, key: KeyEvent) {
        if self.widget.process_key(key) == KeyResult::Handled {
            self.finish_accept();
        } else {
            println!("  (no suggestions shown)");
        }
    }

    fn pick(&mut self, row: usize) {
        if row == 0 {
            println!("  (rows start at 1)");
            return;
        }
        if self.widget.press(row - 1) == KeyResult::Handled {
            self.finish_accept();
        } else {
            println!("  (no row {row})");
        }
    }

    fn clear(&mut self) {
        self.now += KEYSTROKE;
        self.widget.handle_change("", 0, self.now);
        self.echo_change();
        self.settle();
    }

    fn finish_accept(&mut self) {
        self.echo_change();
        self.widget.frame();
    }

    /// Play the owning page: persist the change and pass it back as the prop.
    fn echo_change(&mut self) {
        if let Some(value) = self.widget.take_change() {
            self.widget.set_value(&value);
        }
    }

    fn render(&self) {
        let ctx = self.widget.context();
        if ctx.shows_placeholder() {
            println!("  [{}]", ctx.placeholder);
        } else {
            println!("  text: {:?} (cursor {})", ctx.value, ctx.cursor);
        }
        if let Some(pos) = ctx.overlay.filter(|_| ctx.has_overlay()) {
            println!("  overlay at top={:.1} left={:.1}", pos.top, pos.left);
            for (i, s) in ctx.suggestions.iter().enumerate() {
                let marker = if ctx.selected == Some(i) { '>' } else { ' ' };
                println!("  {marker}{}. {}", i + 1, s);
            }
        }
    }
}

fn run_interactive(config: &TranslitConfig) -> Result<()> {
    let lang = &config.base().lang;
    println!("═══════════════════════════════════════════════════");
    println!(
        "  translit - {} ({})",
        language_name(lang).unwrap_or("custom"),
        lang
    );
    println!("═══════════════════════════════════════════════════");
    println!("Type text and press Enter. Commands:");
    println!("  :down :up :enter   move / accept highlighted suggestion");
    println!("  :pick N            accept row N");
    println!("  :clear             empty the text");
    println!("  :quit              exit");
    println!();

    let mut session = Session::new(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    session.render();

    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match line.trim_end().split_once(' ').unwrap_or((line.trim_end(), "")) {
            (":quit", _) | (":q", _) => break,
            (":down", _) => session.key(KeyEvent::Down),
            (":up", _) => session.key(KeyEvent::Up),
            (":enter", _) => session.key(KeyEvent::Enter),
            (":clear", _) => session.clear(),
            (":pick", n) => match n.trim().parse::<usize>() {
                Ok(row) => session.pick(row),
                Err(_) => println!("  usage: :pick N"),
            },
            (cmd, _) if cmd.starts_with(':') => println!("  unknown command {cmd}"),
            _ => session.type_text(&line),
        }
        session.render();
        stdout.flush().context("failed to flush stdout")?;
    }

    session.widget.unmount();
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(&args)?;

    match &args.command {
        Command::Lookup { word } => run_lookup(&config, word),
        Command::Interactive => run_interactive(&config),
    }
}
