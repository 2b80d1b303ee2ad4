//! BuzzBlast command line
//!
//! Drives a Chrome/Chromium tab over CDP: finds comment composers on a feed
//! page, reads the post each one belongs to and fills it with a Gemini-written
//! comment in the chosen mood.

use anyhow::{Context, anyhow, bail};
use buzzblast::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use buzzblast::composer::{ComposeOutcome, ComposerOptions};
use buzzblast::observer::{DEFAULT_POLL_INTERVAL, watch_document};
use buzzblast::settings::is_valid_key_format;
use buzzblast::{
    CommentInputWatcher, CommentSession, DocumentEvents, DocumentObserver, DomTree, FeedSelectors, GeminiClient,
    GeminiConfig, LengthPreference, Mood, PageHandle, PostLocator, Settings, SettingsStore, build_prompt,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "buzzblast")]
#[command(version)]
#[command(about = "Mood-aware AI comments for LinkedIn composers", long_about = None)]
struct Cli {
    /// Settings file (default: <config dir>/buzzblast/settings.json)
    #[arg(long, global = true, value_name = "PATH")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store the Gemini API key and comment length
    Configure {
        /// Gemini API key
        #[arg(long)]
        api_key: Option<String>,

        /// short, medium or long
        #[arg(long)]
        length: Option<String>,

        /// Save the key without checking it against the API
        #[arg(long)]
        skip_check: bool,
    },
    /// List the available moods
    Moods,
    /// Print the instruction that would be sent for a post
    Prompt {
        /// Post text
        #[arg(long)]
        post: String,

        /// Mood by emoji, name or id
        #[arg(long, value_parser = parse_mood)]
        mood: Option<Mood>,

        /// short, medium or long (default: the stored preference)
        #[arg(long)]
        length: Option<String>,

        /// Instruction typed into the composer
        #[arg(long)]
        instruction: Option<String>,
    },
    /// Show the post text found for every comment composer on a page
    Extract {
        #[command(flatten)]
        browser: BrowserArgs,

        /// Print the discovered composers as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Write a generated comment into one composer
    Compose {
        #[command(flatten)]
        browser: BrowserArgs,

        /// Mood by emoji, name or id
        #[arg(long, value_parser = parse_mood)]
        mood: Option<Mood>,

        /// Which composer, in discovery order
        #[arg(long, default_value = "0")]
        input: usize,

        /// Pause after expanding the post, in milliseconds
        #[arg(long, default_value = "200")]
        settle_ms: u64,
    },
    /// Report comment composers as they appear until interrupted
    Watch {
        #[command(flatten)]
        browser: BrowserArgs,

        /// Polling interval in milliseconds
        #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
        interval_ms: u64,
    },
}

#[derive(Args)]
struct BrowserArgs {
    /// Page to open
    #[arg(long)]
    url: Option<String>,

    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// WebSocket endpoint URL for remote browser connection
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,
}

fn parse_mood(value: &str) -> Result<Mood, String> {
    Mood::parse(value).ok_or_else(|| format!("unknown mood '{}', see `buzzblast moods`", value))
}

fn open_browser(args: &BrowserArgs) -> anyhow::Result<BrowserSession> {
    let session = match &args.ws_endpoint {
        Some(endpoint) => {
            eprintln!("WebSocket endpoint: {}", endpoint);
            BrowserSession::connect(ConnectionOptions::new(endpoint.clone()))?
        }
        None => {
            let mut options = LaunchOptions::new().headless(!args.headed);
            if let Some(path) = &args.executable_path {
                options = options.chrome_path(path);
            }
            if let Some(dir) = &args.user_data_dir {
                options = options.user_data_dir(dir);
            }
            eprintln!("Browser mode: {}", if options.headless { "headless" } else { "headed" });
            BrowserSession::launch(options)?
        }
    };

    if let Some(url) = &args.url {
        session.navigate(url)?;
        session.wait_for_navigation()?;
    }
    Ok(session)
}

async fn open_settings(path: Option<PathBuf>) -> anyhow::Result<SettingsStore> {
    let path = match path {
        Some(path) => path,
        None => SettingsStore::default_path()?,
    };
    SettingsStore::open(&path)
        .await
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

fn discover_inputs(tree: &DomTree) -> anyhow::Result<CommentInputWatcher> {
    let mut watcher = CommentInputWatcher::new(FeedSelectors::linkedin()?);
    watcher.document_changed(tree);
    Ok(watcher)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let store = open_settings(cli.settings).await?;

    match cli.command {
        Command::Configure {
            api_key,
            length,
            skip_check,
        } => {
            let length = length
                .as_deref()
                .map(LengthPreference::from_setting)
                .unwrap_or(store.current().comment_length);
            match api_key {
                Some(key) if skip_check => {
                    let key = key.trim();
                    if !is_valid_key_format(key) {
                        bail!("Invalid API key format");
                    }
                    store
                        .save(Settings {
                            gemini_api_key: Some(key.to_string()),
                            comment_length: length,
                        })
                        .await?;
                }
                Some(key) => {
                    eprintln!("Testing API key...");
                    store.save_api_key(&key, length, &GeminiClient::default()).await?;
                }
                None => store.set_comment_length(length).await?,
            }
            println!("Settings saved to {}", store.path().display());
        }
        Command::Moods => {
            for mood in Mood::ALL {
                println!("{}  {:<14} {:<14} {}", mood.emoji(), mood.id(), mood.name(), mood.tone());
            }
        }
        Command::Prompt {
            post,
            mood,
            length,
            instruction,
        } => {
            let length = length
                .as_deref()
                .map(LengthPreference::from_setting)
                .unwrap_or(store.current().comment_length);
            let tone = mood.map_or(buzzblast::mood::DEFAULT_TONE, Mood::tone);
            println!("{}", build_prompt(instruction.as_deref(), &post, tone, length));
        }
        Command::Extract { browser, json } => {
            let browser = open_browser(&browser)?;
            let tree = browser.page()?.snapshot()?;
            let mut watcher = discover_inputs(&tree)?;
            if json {
                println!("{}", watcher.registry().to_json()?);
                return Ok(());
            }

            let locator = PostLocator::new(FeedSelectors::linkedin()?);
            let inputs = watcher.take_discovered();
            if inputs.is_empty() {
                eprintln!("No comment inputs found");
            }
            for (index, input) in inputs.iter().enumerate() {
                let node = tree
                    .find_by_handle(input.handle)
                    .ok_or_else(|| anyhow!("comment input {} vanished", input.handle))?;
                let located = locator.locate(&tree, node);
                println!("[{}] {:?} via {:?}", index, input.placeholder.as_deref().unwrap_or(""), located.strategy);
                println!("{}\n", if located.is_empty() { "(no post content found)" } else { located.text.as_str() });
            }
        }
        Command::Compose {
            browser,
            mood,
            input,
            settle_ms,
        } => {
            let session = CommentSession::new(GeminiClient::new(GeminiConfig::default()), store.subscribe())?
                .options(ComposerOptions::default().settle_delay(Duration::from_millis(settle_ms)));
            if let Some(mood) = mood {
                session.toggle_mood(mood);
            }

            let browser = open_browser(&browser)?;
            let page = browser.page()?;
            let inputs = discover_inputs(&page.snapshot()?)?.take_discovered();
            let target = inputs
                .get(input)
                .ok_or_else(|| anyhow!("No comment input #{} ({} found)", input, inputs.len()))?;

            match session.compose(&page, target.handle).await? {
                ComposeOutcome::Applied(comment) => println!("{}", comment),
                ComposeOutcome::Skipped => eprintln!("A comment is already being generated"),
            }
        }
        Command::Watch { browser, interval_ms } => {
            let browser = open_browser(&browser)?;
            let page = browser.page()?;
            let locator = PostLocator::new(FeedSelectors::linkedin()?);
            let mut watcher = CommentInputWatcher::new(FeedSelectors::linkedin()?);

            let mut events = DocumentEvents::new();
            events.subscribe(|tree: &DomTree| {
                watcher.document_changed(tree);
                for input in watcher.take_discovered() {
                    let preview = tree
                        .find_by_handle(input.handle)
                        .map(|el| locator.extract_post_content(tree, el))
                        .unwrap_or_default();
                    println!("comment input {} -> {}", input.handle, buzzblast::text::truncate_chars(&preview, 80));
                }
            });

            eprintln!("Watching for comment inputs, press Ctrl+C to stop");
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::error!("Failed to listen for Ctrl+C: {}", e);
                }
            };
            watch_document(&page, &mut events, Duration::from_millis(interval_ms), shutdown).await;
            browser.close()?;
        }
    }

    Ok(())
}
