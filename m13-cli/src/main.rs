use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use m13_core::{
    CipherEngine, GameLogicValidator, IntegrityChecker, KeyProvider, LoadSource, SaveCodec,
    SaveError, SavePersistence, locator,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "m13-cli")]
#[command(about = "Mickey13 save (de|en)crypt and integrity – CLI tool", long_about = None)]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decrypt cipher to plaintext JSON
    Decrypt {
        /// Path to the encrypted save file
        cipher: PathBuf,

        /// Path to write the decrypted JSON
        out_plain: PathBuf,
    },

    /// Encrypt plaintext JSON to cipher
    Encrypt {
        /// Path to the plaintext JSON file
        plain: PathBuf,

        /// Path to write the encrypted cipher file
        out_cipher: PathBuf,
    },

    /// Print the salted checksum of a file's contents
    Checksum {
        /// Path to the serialized save data
        file: PathBuf,
    },

    /// Check a plaintext save against the game-logic bounds
    Validate {
        /// Path to the plaintext JSON file
        file: PathBuf,

        /// Also verify this checksum
        #[arg(long)]
        checksum: Option<String>,
    },

    /// Load a save the way the game does and summarize it
    Inspect {
        /// Save file (defaults to the game's user.json)
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:?}", e);
        if let Some(hint) = recovery_hint(&e) {
            eprintln!("{hint}");
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

/// Tell the operator whether retrying can help
fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    let save_err = err.downcast_ref::<SaveError>()?;
    Some(if save_err.is_recoverable() {
        "[hint] fix the environment (file path, MICKEY13_* variables) and retry"
    } else {
        "[hint] the save data itself is bad; retrying will not help"
    })
}

fn run(cli: Cli) -> Result<()> {
    let keys = Arc::new(KeyProvider::from_env());
    keys.preload();

    match cli.command {
        Commands::Decrypt { cipher, out_plain } => {
            cmd_decrypt(&keys, &cipher, &out_plain)?;
        }
        Commands::Encrypt { plain, out_cipher } => {
            cmd_encrypt(&keys, &plain, &out_cipher)?;
        }
        Commands::Checksum { file } => {
            cmd_checksum(keys, &file)?;
        }
        Commands::Validate { file, checksum } => {
            cmd_validate(keys, &file, checksum.as_deref())?;
        }
        Commands::Inspect { file } => {
            cmd_inspect(keys, file)?;
        }
    }

    Ok(())
}

fn read_text(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file: {}", path.display()))
}

fn cmd_decrypt(keys: &KeyProvider, cipher_path: &Path, out_plain_path: &Path) -> Result<()> {
    let enc = read_text(cipher_path, "cipher")?;
    log::info!("len(enc)={}", enc.len());

    let key = keys.key_material()?;
    let json = CipherEngine::new().decrypt(&enc, &key)?;

    match SaveCodec::new().deserialize(&json) {
        Ok(_) => log::info!("decrypted content parses as a save record"),
        Err(e) => log::warn!("decrypted content is not a save record: {e}"),
    }

    fs::write(out_plain_path, &json).with_context(|| {
        format!("Failed to write plaintext file: {}", out_plain_path.display())
    })?;

    println!("[ok] wrote plaintext -> {}", out_plain_path.display());

    Ok(())
}

fn cmd_encrypt(keys: &KeyProvider, plain_path: &Path, out_cipher_path: &Path) -> Result<()> {
    let json = read_text(plain_path, "plaintext")?;

    // Refuse to produce a save the game would throw away on load
    SaveCodec::new()
        .deserialize(&json)
        .context("Plaintext is not a valid save record")?;

    let key = keys.key_material()?;
    let enc = CipherEngine::new().encrypt(&json, &key)?;

    fs::write(out_cipher_path, &enc).with_context(|| {
        format!("Failed to write cipher file: {}", out_cipher_path.display())
    })?;

    println!("[ok] wrote encrypted save -> {}", out_cipher_path.display());

    Ok(())
}

fn cmd_checksum(keys: Arc<KeyProvider>, path: &Path) -> Result<()> {
    let data = read_text(path, "save")?;
    let checksum = IntegrityChecker::new(keys).generate_checksum(&data);
    if checksum.is_empty() {
        bail!("{} is empty, nothing to checksum", path.display());
    }

    println!("{checksum}");
    Ok(())
}

fn cmd_validate(keys: Arc<KeyProvider>, path: &Path, checksum: Option<&str>) -> Result<()> {
    let data = read_text(path, "save")?;
    let checker = IntegrityChecker::new(keys);

    if let Some(expected) = checksum {
        checker.check_checksum(&data, expected)?;
        println!("[ok] checksum matches");
    }

    let record = SaveCodec::new().deserialize(&data)?;
    GameLogicValidator::new().validate(&record)?;

    println!("[ok] game logic valid: {}", record.snapshot());
    Ok(())
}

fn cmd_inspect(keys: Arc<KeyProvider>, file: Option<PathBuf>) -> Result<()> {
    let path = match file {
        Some(path) => path,
        None => locator::default_save_path()
            .context("Could not determine the default save location (HOME not set?)")?,
    };

    let outcome = SavePersistence::new(&path, keys).load_detailed();
    let source = match &outcome.source {
        LoadSource::Missing => "missing (fresh record)".to_string(),
        LoadSource::Plaintext => "plaintext".to_string(),
        LoadSource::Decrypted => "encrypted".to_string(),
        LoadSource::Recovered { reason } => format!("unreadable, fresh record ({reason})"),
    };

    println!("[info] file:   {}", path.display());
    println!("[info] source: {source}");
    println!("[info] record: {}", outcome.record.snapshot());

    match GameLogicValidator::new().validate(&outcome.record) {
        Ok(()) => println!("[info] game logic: OK"),
        Err(e) => println!("[info] game logic: REJECTED ({e})"),
    }

    Ok(())
}
