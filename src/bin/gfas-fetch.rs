use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use gfas_fetch::{
    ApiClient, Archive, BatchConfig, ClientOptions, DryRun, Error, ErrorPolicy, Overrides,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Download monthly GFAS v1.2 files, one per year, month and parameter.\n\
                  Credentials are read from CDSAPI_URL/CDSAPI_KEY or ~/.cdsapirc (cds) and\n\
                  ECMWF_API_KEY/ECMWF_API_EMAIL or ~/.ecmwfapirc (mars)."
)]
struct Args {
    /// JSON config file; command line flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    archive: Option<Archive>,

    /// Root directory, files land in <root>/<year>/
    #[arg(short, long, value_name = "DIR")]
    output_root: Option<PathBuf>,

    #[arg(long)]
    start_year: Option<i32>,

    #[arg(long)]
    end_year: Option<i32>,

    #[arg(long)]
    start_month: Option<u32>,

    #[arg(long)]
    end_month: Option<u32>,

    /// Parameter codes, e.g. `-p CO -p BC` or `-p CO,BC`
    #[arg(short, long = "param", value_name = "CODE", value_delimiter = ',')]
    params: Vec<String>,

    #[arg(long, value_enum)]
    on_error: Option<ErrorPolicy>,

    /// Log the requests instead of submitting them
    #[arg(long)]
    dry_run: bool,

    /// Print the parameter catalog of the selected archive and exit
    #[arg(long)]
    list_params: bool,

    /// Seconds between task status polls
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    insecure: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            archive: self.archive,
            output_root: self.output_root.clone(),
            years: [self.start_year, self.end_year],
            months: [self.start_month, self.end_month],
            parameters: (!self.params.is_empty()).then(|| self.params.clone()),
            on_error: self.on_error,
        }
    }

    fn resolve_config(&self) -> gfas_fetch::Result<BatchConfig> {
        let file = match &self.config {
            Some(path) => Overrides::from_file(path)?,
            None => Overrides::default(),
        };
        file.merge(self.overrides()).resolve()
    }

    fn client_options(&self) -> ClientOptions {
        ClientOptions {
            poll_interval: self.poll_interval.map(Duration::from_secs),
            verify_tls: !self.insecure,
            ..ClientOptions::default()
        }
    }
}

fn list_params(archive: Archive) {
    println!("{archive} parameters ({}):", archive.dataset());
    for p in archive.catalog().iter() {
        println!("  {:<10} {:<45} {} [{}]", p.code, p.identifier, p.description, p.unit);
    }
}

fn exit_code_for(e: &Error) -> ExitCode {
    if e.is_config() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return exit_code_for(&e);
        }
    };

    if args.list_params {
        list_params(config.archive);
        return ExitCode::SUCCESS;
    }

    let result = if args.dry_run {
        gfas_fetch::run(&config, &DryRun)
    } else {
        ApiClient::from_env(config.archive, args.client_options())
            .and_then(|client| gfas_fetch::run(&config, &client))
    };

    match result {
        Ok(report) => {
            print!("{report}");
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("{e}");
            exit_code_for(&e)
        }
    }
}
