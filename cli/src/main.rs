use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::error;

use ocr_core::{ClientConfig, OcrClient, OcrError, WireFormat};

const DEFAULT_URL: &str = "https://dm-51.data.aliyun.com/rest/160601/ocr/ocr_idcard.json";

/// Which face of the ID card the image shows.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Side {
    Face,
    Back,
}

impl Side {
    fn as_str(self) -> &'static str {
        match self {
            Side::Face => "face",
            Side::Back => "back",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ocr-post")]
#[command(about = "Send an image to an APPCODE-authenticated OCR endpoint")]
#[command(version)]
struct Cli {
    /// OCR endpoint URL
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,

    /// APPCODE credential sent in the Authorization header
    #[arg(long, env = "APPCODE", hide_env_values = true)]
    appcode: String,

    /// Image file to recognize
    #[arg(long)]
    image: PathBuf,

    /// Use the legacy `inputs` request schema
    #[arg(long)]
    legacy_format: bool,

    /// Card side, sent as `{"side": ...}` unless --configure is given
    #[arg(long, value_enum, default_value_t = Side::Face)]
    side: Side,

    /// Raw configure JSON; an empty string sends no configure field
    #[arg(long)]
    configure: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn configure(&self) -> String {
        match &self.configure {
            Some(raw) => raw.clone(),
            None => serde_json::json!({ "side": self.side.as_str() }).to_string(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = OcrClient::new(ClientConfig::default().verify_tls(!cli.insecure));
    let format = WireFormat::from_flag(!cli.legacy_format);

    match client.recognize(&cli.url, &cli.appcode, &cli.image, &cli.configure(), format) {
        Ok(body) => {
            println!("{body}");
            ExitCode::SUCCESS
        }
        Err(OcrError::HttpStatus(e)) => {
            println!("http code: {}", e.status);
            println!("{}", e.headers);
            println!("{}", e.body);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "OCR request failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
