use broadcast_review::amplitude::generate_amplitudes;
use broadcast_review::audio::filename_from_url;
use broadcast_review::color::{ColorMode, Palette, deterministic_hex, random_hex};
use broadcast_review::config::ReviewConfig;
use broadcast_review::normalizer::normalize;
use broadcast_review::region::RegionSet;
use broadcast_review::session::ReviewSession;
use broadcast_review::timecode::format_hhmmss;
use broadcast_review::upload::{LoftyProbe, PendingUploads, UploadForm};
use broadcast_review::view::MemoryView;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "broadcast-review", about = "Broadcast review toolkit")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// API base URL (overrides config)
    #[arg(long, global = true)]
    api_base: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize detection results into full-coverage regions
    Normalize {
        /// JSON file with {"broadcast_id": .., "data": [..]}
        file: PathBuf,
        /// Broadcast duration in whole seconds
        #[arg(short, long)]
        duration: u64,
    },
    /// Print the deterministic amplitude sequence for a seed
    Amplitudes {
        seed: String,
        /// Duration in seconds
        duration: f64,
        /// Only print the first N values
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Generate a category color
    Color {
        category: Category,
        /// Derive the color from this identity key instead of at random
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Summarize the waveform a reviewer would see
    Render {
        /// JSON file with {"broadcast_id": .., "data": [..]}
        file: PathBuf,
        /// Broadcast duration in whole seconds
        #[arg(short, long)]
        duration: u64,
        /// Amplitude seed (defaults to the file name)
        #[arg(short, long)]
        seed: Option<String>,
    },
    /// Download a broadcast's audio from the API
    Fetch {
        /// Broadcast audio file name on the server, or a link to it
        filename: String,
        /// Where to write the audio
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Validate an upload and print the handoff it would produce
    Upload {
        /// Audio file
        file: PathBuf,
        #[arg(long)]
        station: String,
        #[arg(long)]
        recording: String,
    },
    /// Configuration
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Show current configuration
    Show,
    /// Set the API base URL
    ApiBase { url: String },
    /// Choose random or identity-derived colors
    Colors { mode: CliColorMode },
}

#[derive(Clone, Copy, ValueEnum)]
enum Category {
    Ad,
    Song,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliColorMode {
    Random,
    Deterministic,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().or_else(ReviewConfig::default_path);
    let mut config = match &config_path {
        Some(path) => ReviewConfig::load(path),
        None => ReviewConfig::default(),
    };
    if let Some(base) = &cli.api_base {
        if let Err(e) = config.set_api_base(base) {
            fail(e);
        }
    }

    match cli.command {
        Commands::Normalize { file, duration } => {
            let set = read_region_set(&file);
            match normalize(duration, &set.data) {
                Ok(regions) => print_json(&regions),
                Err(e) => fail(e),
            }
        }
        Commands::Amplitudes { seed, duration, limit } => {
            let amps = generate_amplitudes(&seed, duration);
            println!("{} amplitude(s) for seed '{}'", amps.len(), seed);
            for (i, a) in amps.iter().take(limit.unwrap_or(amps.len())).enumerate() {
                println!("{:>6}  {:.6}", i, a);
            }
        }
        Commands::Color { category, key } => {
            let palette = match category {
                Category::Ad => Palette::Orange,
                Category::Song => Palette::Green,
            };
            let hex = match key {
                Some(k) => deterministic_hex(palette, &k),
                None => random_hex(palette),
            };
            println!("{}", hex);
        }
        Commands::Render { file, duration, seed } => {
            let set = read_region_set(&file);
            let seed = seed.unwrap_or_else(|| {
                file.file_name()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default()
            });
            let mut session = ReviewSession::new(config, MemoryView::new());
            let waveform = match session.load_broadcast(&set, duration, &seed) {
                Ok(w) => w,
                Err(e) => fail(e),
            };
            println!(
                "Broadcast {} | {} | {} bar(s) | {} region(s)",
                waveform.broadcast_id(),
                format_hhmmss(waveform.duration_secs()),
                waveform.bar_count(),
                waveform.regions().len()
            );
            let bars = waveform.bars();
            for (i, r) in waveform.regions().iter().enumerate() {
                let bar_total = bars.iter().filter(|b| b.region_index == i).count();
                println!(
                    "  [{:>3}] {:<7} {:<9} {:>5} bar(s)  {}",
                    i,
                    r.clip_type,
                    waveform.colors().color_for(r),
                    bar_total,
                    r.tooltip()
                );
            }
            let markers = waveform.gap_markers();
            if !markers.is_empty() {
                println!("Open slots:");
                for m in markers {
                    println!("  region {} at {:.1}px", m.region_index, m.left_px);
                }
            }
        }
        Commands::Fetch { filename, out } => {
            let filename = if filename.contains("://") {
                match filename_from_url(&filename) {
                    Some(name) => name,
                    None => fail(format!("No file name in '{}'", filename)),
                }
            } else {
                filename
            };
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => fail(e),
            };
            let mut session = ReviewSession::new(config, MemoryView::new());
            if let Err(e) = runtime.block_on(session.fetch_audio(&filename)) {
                fail(e);
            }
            let bytes = session
                .audio_handle()
                .and_then(|h| session.view().get(h))
                .unwrap_or_default();
            if let Err(e) = fs::write(&out, bytes) {
                fail(e);
            }
            println!("Wrote {} byte(s) to {}", bytes.len(), out.display());
        }
        Commands::Upload { file, station, recording } => {
            let mut session = ReviewSession::new(config, MemoryView::new());
            let mut form = UploadForm::new(&station, &recording, Some(file));
            let mut pending = PendingUploads::default();
            match session.submit_upload(&mut form, &LoftyProbe, &mut pending) {
                Ok(request) => print_json(&request),
                Err(e) => fail(e),
            }
        }
        Commands::Config { action } => {
            match action {
                ConfigCmd::Show => {
                    print_json(&config);
                    return;
                }
                ConfigCmd::ApiBase { url } => {
                    if let Err(e) = config.set_api_base(&url) {
                        fail(e);
                    }
                }
                ConfigCmd::Colors { mode } => {
                    config.color_mode = match mode {
                        CliColorMode::Random => ColorMode::Random,
                        CliColorMode::Deterministic => ColorMode::Deterministic,
                    };
                }
            }
            let Some(path) = config_path else {
                fail("no config directory on this platform; pass --config");
            };
            if let Err(e) = config.save(&path) {
                fail(e);
            }
            println!("Saved {}", path.display());
        }
    }
}

fn read_region_set(path: &Path) -> RegionSet {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) => fail(format!("Cannot read '{}': {}", path.display(), e)),
    };
    match serde_json::from_str(&data) {
        Ok(set) => set,
        Err(e) => fail(format!("Cannot parse '{}': {}", path.display(), e)),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", err);
    std::process::exit(1);
}
