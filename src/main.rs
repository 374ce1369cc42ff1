mod cli;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "costreport",
    about = "Generate OpenAI and Claude billing reports",
    version
)]
struct Cli {
    /// First day of the billing period (YYYY-MM-DD, inclusive)
    start_date: String,

    /// Day after the last billed day (YYYY-MM-DD, exclusive)
    end_date: String,

    /// Provider to report on: openai or claude
    #[arg(short, long)]
    provider: Option<String>,

    /// POST the JSON report to this URL after writing files
    #[arg(long)]
    post_url: Option<String>,

    /// Directory reports are written under
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output_opts = cli::output::OutputOptions {
        use_color: cli::output::detect_color(!cli.no_color),
        verbose: cli.verbose,
    };

    let args = cli::report_cmd::ReportArgs {
        start_date: cli.start_date,
        end_date: cli.end_date,
        provider: cli.provider,
        post_url: cli.post_url,
        output_dir: cli.output_dir,
    };

    if let Err(e) = cli::report_cmd::run(args, &output_opts).await {
        eprintln!("{}", cli::hints::format_error(&e, output_opts.use_color));
        std::process::exit(1);
    }
}
