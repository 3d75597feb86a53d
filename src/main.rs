use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
mod auth;
use ironseal::{
    Algorithm, Password, RawPassword, SealOptions, SealParams, Secret, UnsealPassword,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Args)]
struct SealArgs {
    /// Seal lifetime in milliseconds, 0 never expires
    #[arg(long, global = true, env = "IRONSEAL_TTL", default_value_t = 0)]
    ttl: u64,

    /// Allowed clock skew in seconds (-1 disables)
    #[arg(
        long,
        global = true,
        env = "IRONSEAL_SKEW",
        default_value_t = 60,
        allow_negative_numbers = true
    )]
    skew: i64,

    /// Milliseconds added to the local clock
    #[arg(
        long,
        global = true,
        env = "IRONSEAL_OFFSET",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    offset: i64,

    /// aes-256-cbc or aes-128-ctr
    #[arg(long, global = true, env = "IRONSEAL_ENCRYPTION", default_value_t = Algorithm::Aes256Cbc)]
    encryption_algorithm: Algorithm,

    /// Integrity algorithm (sha256)
    #[arg(long, global = true, env = "IRONSEAL_INTEGRITY", default_value_t = Algorithm::Sha256)]
    integrity_algorithm: Algorithm,

    /// PBKDF2 iterations for both keys
    #[arg(long, global = true, env = "IRONSEAL_ITERATIONS", default_value_t = 1)]
    iterations: u32,

    /// Minimum password length
    #[arg(long, global = true, default_value_t = 32)]
    min_password_length: usize,

    /// Bits of random salt per key
    #[arg(long, global = true, default_value_t = 256)]
    salt_bits: usize,
}

impl SealArgs {
    fn to_seal_options(&self) -> SealOptions {
        let params = |algorithm| SealParams {
            algorithm,
            iterations: self.iterations,
            min_password_length: self.min_password_length,
            salt_bits: self.salt_bits,
        };

        SealOptions {
            encryption: params(self.encryption_algorithm),
            integrity: params(self.integrity_algorithm),
            ttl: self.ttl,
            timestamp_skew_sec: self.skew,
            local_time_offset_ms: self.offset,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ironseal")]
#[command(
    version,
    about = "Seal JSON values into tamper-evident, encrypted Fe26.2 tokens."
)]
struct Cli {
    #[command(flatten)]
    seal: SealArgs,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "IRONSEAL_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Seals a JSON value
    #[command(arg_required_else_help = true)]
    Seal {
        /// Password id recorded in the seal (letters only)
        #[arg(long)]
        id: Option<String>,
        value: String,
    },

    /// Unseals a seal and prints its JSON value
    #[command(arg_required_else_help = true)]
    Unseal { seal: String },
}

fn init_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise tracing subscriber: {e}"))
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    init_logging(&args.log_level)?;

    let options = args.seal.to_seal_options();
    let password = auth::read_password()?;
    let password = Password::from(password.as_str());

    match args.command {
        Commands::Seal { id, value } => {
            let value: serde_json::Value =
                serde_json::from_str(&value).context("value is not valid JSON")?;
            let raw = match id {
                Some(id) => RawPassword::Secret(Secret {
                    id,
                    secret: password,
                }),
                None => RawPassword::Bare(password),
            };
            let sealed = ironseal::seal(&value, &raw, &options).context("failed to seal value")?;
            println!("{sealed}");
        }
        Commands::Unseal { seal } => {
            let value: serde_json::Value =
                ironseal::unseal(seal.trim(), &UnsealPassword::Bare(password), &options)
                    .context("failed to unseal value")?;
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
