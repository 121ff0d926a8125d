use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
mod auth;
use pwseal::{Config, Format, Pepper, ScryptParams, cipher, config, envelope, random};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, clap::Args)]
struct ScryptArgs {
    /// scrypt cost N, a power of two (default: 16384)
    #[arg(long = "scrypt-n")]
    n: Option<u32>,

    /// scrypt block size r (default: 8)
    #[arg(long = "scrypt-r")]
    r: Option<u32>,

    /// scrypt parallelism p (default: 1)
    #[arg(long = "scrypt-p")]
    p: Option<u32>,
}

impl ScryptArgs {
    fn apply(&self, base: &ScryptParams) -> Result<ScryptParams> {
        Ok(ScryptParams::new(
            self.n.unwrap_or(base.n()),
            self.r.unwrap_or(base.r()),
            self.p.unwrap_or(base.p()),
        )?)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Legacy {
    /// key | salt | N | r | p | sha256
    Tagged,
    /// key | salt | N | r | p
    Plain,
}

fn format_of(legacy: Option<Legacy>) -> Format {
    match legacy {
        None => Format::V1,
        Some(Legacy::Tagged) => Format::LegacyTagged,
        Some(Legacy::Plain) => Format::LegacyPlain,
    }
}

#[derive(Debug, Parser)]
#[command(name = "pwseal")]
#[command(
    version,
    about = "Password-derived key envelopes and password-keyed encryption."
)]
struct Cli {
    /// Path to a JSON config file (pepper, scrypt parameters)
    #[arg(long, global = true, value_name = "PATH", env = "PWSEAL_CONFIG")]
    config: Option<PathBuf>,

    /// Deployment-wide pepper appended to passwords
    #[arg(long, global = true, env = "PWSEAL_PEPPER", hide_env_values = true)]
    pepper: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints random bytes as hex
    Random {
        #[arg(long, default_value_t = 32)]
        len: usize,
    },

    /// Derives a key from a password and prints the envelope as hex
    Create {
        #[arg(long, default_value_t = 32)]
        key_len: usize,

        #[command(flatten)]
        scrypt: ScryptArgs,

        /// Write an unversioned legacy layout
        #[arg(long, value_enum)]
        legacy: Option<Legacy>,
    },

    /// Checks a password against a hex envelope
    #[command(arg_required_else_help = true)]
    Verify {
        envelope: String,

        #[arg(long, value_enum)]
        legacy: Option<Legacy>,
    },

    /// Shows the structure of a hex envelope
    #[command(arg_required_else_help = true)]
    Info {
        envelope: String,

        #[arg(long, value_enum)]
        legacy: Option<Legacy>,
    },

    /// Encrypts a file under a password
    Seal {
        /// Input file, `-` for stdin
        #[arg(long = "in", value_name = "PATH")]
        input: PathBuf,

        /// Output file, `-` for stdout
        #[arg(long = "out", value_name = "PATH")]
        output: PathBuf,

        /// Associated data, authenticated but not stored
        #[arg(long, default_value = "")]
        aad: String,

        #[command(flatten)]
        scrypt: ScryptArgs,
    },

    /// Decrypts a file sealed with `seal`
    Open {
        #[arg(long = "in", value_name = "PATH")]
        input: PathBuf,

        #[arg(long = "out", value_name = "PATH")]
        output: PathBuf,

        #[arg(long, default_value = "")]
        aad: String,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn resolve_config(path: Option<&Path>, pepper: Option<String>) -> Result<Config> {
    let mut config = match path {
        Some(p) => Config::load(p).with_context(|| format!("failed to load {}", p.display()))?,
        None => match config::default_path() {
            Some(p) => Config::load_or_default(&p)?,
            None => Config::default(),
        },
    };

    if let Some(pepper) = pepper {
        config = config.with_pepper(Pepper::parse(pepper)?);
    }

    Ok(config)
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if is_stdio(path) {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if is_stdio(path) {
        let mut out = io::stdout().lock();
        out.write_all(data)?;
        out.flush()?;
        return Ok(());
    }
    std::fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))
}

fn decode_hex(envelope: &str) -> Result<Vec<u8>> {
    hex::decode(envelope.trim()).context("envelope is not valid hex")
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    init_logging(&args.log_level);

    let config = resolve_config(args.config.as_deref(), args.pepper)?;

    match args.command {
        Commands::Random { len } => {
            let bytes = random::generate(len)?;
            println!("{}", hex::encode(bytes));
        }
        Commands::Create {
            key_len,
            scrypt,
            legacy,
        } => {
            let params = scrypt.apply(config.params())?;
            let config = config.with_params(params);
            let password = auth::read_new_password(true)?;
            let sealed =
                envelope::create_as(password.as_bytes(), key_len, format_of(legacy), &config)?;
            println!("{}", hex::encode(sealed));
        }
        Commands::Verify {
            envelope: hex_envelope,
            legacy,
        } => {
            let bytes = decode_hex(&hex_envelope)?;
            let password = auth::read_password(true)?;
            if envelope::verify_as(password.as_bytes(), &bytes, format_of(legacy), &config)? {
                println!("match");
            } else {
                println!("no match");
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Info {
            envelope: hex_envelope,
            legacy,
        } => {
            let bytes = decode_hex(&hex_envelope)?;
            let info = envelope::inspect(&bytes, format_of(legacy))?;
            println!("format:     {}", info.format);
            println!("key length: {}", info.key_len);
            println!(
                "scrypt:     N={} r={} p={}",
                info.params.n(),
                info.params.r(),
                info.params.p()
            );
        }
        Commands::Seal {
            input,
            output,
            aad,
            scrypt,
        } => {
            let params = scrypt.apply(config.params())?;
            let config = config.with_params(params);
            let password = auth::read_new_password(!is_stdio(&input))?;
            let plaintext = zeroize::Zeroizing::new(read_input(&input)?);
            let sealed =
                cipher::encrypt_with(password.as_bytes(), &plaintext, aad.as_bytes(), &config)?;
            write_output(&output, &sealed)?;
        }
        Commands::Open { input, output, aad } => {
            let password = auth::read_password(!is_stdio(&input))?;
            let sealed = read_input(&input)?;
            let plaintext =
                cipher::decrypt_with(password.as_bytes(), &sealed, aad.as_bytes(), &config)?;
            write_output(&output, &plaintext)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
