use clap::{Args as ClapArgs, Parser, Subcommand};
use fsb_core::{BackupStore, FileFailure, Game, StoreConfig};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::exit;

// exit codes
const EXIT_ERROR: i32 = 2;
const EXIT_PARTIAL: i32 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "fsb",
    about = "Create, list and restore FromSoftware save backups",
    version
)]
struct Cli {
    /// Backup root (defaults to <roaming app data>/FSBackup)
    #[arg(long, global = true, env = "FSB_BACKUP_ROOT")]
    backup_root: Option<PathBuf>,
    /// Folder holding the games' save folders (defaults to roaming app data)
    #[arg(long, global = true, env = "FSB_SAVES_DIR")]
    saves_dir: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List supported games and whether they were detected
    Games,
    /// List detected games
    Detected,
    /// List backups of a game
    List(GameArgs),
    /// Back up the current saves of a game
    Create(CreateArgs),
    /// Rename a backup
    Rename(RenameArgs),
    /// Delete a backup
    Delete(DeleteArgs),
    /// Restore a backup into the game's save folder
    Load(BackupArgs),
}

#[derive(ClapArgs, Debug)]
struct GameArgs {
    /// Game name, e.g. EldenRing
    game: Game,
}

#[derive(ClapArgs, Debug)]
struct BackupArgs {
    game: Game,
    /// Backup name
    name: String,
}

#[derive(ClapArgs, Debug)]
struct CreateArgs {
    game: Game,
    /// Backup name (defaults to backup_<timestamp>)
    name: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct RenameArgs {
    game: Game,
    old: String,
    new: String,
}

#[derive(ClapArgs, Debug)]
struct DeleteArgs {
    game: Game,
    name: String,
    /// Do not ask for confirmation
    #[arg(long, short = 'y', default_value_t = false)]
    yes: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = StoreConfig::from_user_dirs()
        .map(|c| apply_overrides(c, &cli))
        .or_else(|e| match (&cli.backup_root, &cli.saves_dir) {
            (Some(root), Some(saves)) => Ok(StoreConfig::new(root, saves)),
            _ => Err(e),
        })
        .unwrap_or_else(|e| fail(e));
    let store = BackupStore::new(config);
    let setup = store.setup();
    print_failures(&setup.failed);

    match cli.cmd.unwrap_or(Cmd::Detected) {
        Cmd::Games => cmd_games(&store, cli.json),
        Cmd::Detected => cmd_detected(&store, cli.json),
        Cmd::List(a) => cmd_list(&store, a, cli.json),
        Cmd::Create(a) => cmd_create(&store, a, cli.json),
        Cmd::Rename(a) => cmd_rename(&store, a, cli.json),
        Cmd::Delete(a) => cmd_delete(&store, a, cli.json),
        Cmd::Load(a) => cmd_load(&store, a, cli.json),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .init();
}

fn apply_overrides(mut config: StoreConfig, cli: &Cli) -> StoreConfig {
    if let Some(saves) = &cli.saves_dir {
        config = config.with_saves_base(saves);
    }
    if let Some(root) = &cli.backup_root {
        config = config.with_backup_root(root);
    }
    config
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", e);
    exit(EXIT_ERROR);
}

fn print_failures(failed: &[FileFailure]) {
    for f in failed {
        eprintln!("warning: {}: {}", f.path.display(), f.error);
    }
}

fn print_json(v: &serde_json::Value) {
    match serde_json::to_string_pretty(v) {
        Ok(s) => println!("{}", s),
        Err(e) => fail(e),
    }
}

fn finish(failed: &[FileFailure]) {
    print_failures(failed);
    if !failed.is_empty() {
        exit(EXIT_PARTIAL);
    }
}

fn cmd_games(store: &BackupStore, as_json: bool) {
    let detected = store.get_all_detected_games();
    if as_json {
        let games: Vec<_> = store
            .list_games()
            .map(|g| {
                json!({
                    "game": g,
                    "detected": detected.contains(&g),
                    "source": store.config().source_path(g),
                })
            })
            .collect();
        print_json(&json!(games));
        return;
    }
    for g in store.list_games() {
        let mark = if detected.contains(&g) { "*" } else { " " };
        println!("{} {}\t{}", mark, g, store.config().source_path(g).display());
    }
}

fn cmd_detected(store: &BackupStore, as_json: bool) {
    let games = store.get_all_detected_games();
    if as_json {
        print_json(&json!(games));
    } else if games.is_empty() {
        println!("No supported games found");
    } else {
        for g in games {
            println!("{}", g);
        }
    }
}

fn cmd_list(store: &BackupStore, args: GameArgs, as_json: bool) {
    let names = store.get_all_backups(args.game).unwrap_or_else(|e| fail(e));
    if as_json {
        print_json(&json!(names));
    } else {
        for n in names {
            println!("{}", n);
        }
    }
}

fn cmd_create(store: &BackupStore, args: CreateArgs, as_json: bool) {
    let name = args.name.unwrap_or_else(fsb_core::default_snapshot_name);
    let report = store
        .create_backup(args.game, &name)
        .unwrap_or_else(|e| fail(e));
    if as_json {
        print_json(&json!({ "name": name, "report": report }));
    } else {
        println!(
            "New {} backup created! ('{}', {} file(s))",
            args.game,
            name,
            report.copied.len()
        );
    }
    finish(&report.failed);
}

fn cmd_rename(store: &BackupStore, args: RenameArgs, as_json: bool) {
    let report = store
        .rename_backup(args.game, &args.old, &args.new)
        .unwrap_or_else(|e| fail(e));
    if as_json {
        print_json(&json!(report));
    }
    let Some(report) = report else {
        if !as_json {
            println!("Nothing renamed: no {} backup '{}'", args.game, args.old);
        }
        return;
    };
    match &report.delete {
        Some(_) if !as_json => println!("{} backup renamed!", args.game),
        None if !as_json => println!(
            "{} backup copied to '{}', but '{}' was kept",
            args.game, args.new, args.old
        ),
        _ => {}
    }
    let mut failed = report.copy.failed.clone();
    if let Some(d) = &report.delete {
        failed.extend(d.failed.iter().cloned());
    }
    finish(&failed);
}

fn cmd_delete(store: &BackupStore, args: DeleteArgs, as_json: bool) {
    if !args.yes && !confirm(&format!("Delete {} backup '{}'", args.game, args.name)) {
        println!("Cancelled");
        return;
    }
    let report = store
        .delete_backup(args.game, &args.name)
        .unwrap_or_else(|e| fail(e));
    if as_json {
        print_json(&json!(report));
    } else {
        println!("'{}' backup deleted!", args.game);
    }
    finish(&report.failed);
}

fn cmd_load(store: &BackupStore, args: BackupArgs, as_json: bool) {
    let report = store
        .load_backup(args.game, &args.name)
        .unwrap_or_else(|e| fail(e));
    if as_json {
        print_json(&json!(report));
    } else {
        println!(
            "{} backup '{}' loaded! ({})",
            args.game,
            args.name,
            report.target.display()
        );
    }
    finish(&report.copy.failed);
}

fn confirm(header: &str) -> bool {
    print!("{}\nAre you sure? [y/N] ", header);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
