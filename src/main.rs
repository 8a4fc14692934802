use clap::{value_parser, Arg, ArgAction, ArgMatches, Command, Parser, Subcommand};
use slg::config::POOL_FIELDS;
use slg::configure::{configure, ConfigureOptions, FieldRequest};
use slg::core::rate::parse_rate;
use slg::generate::{generate, GenerateOptions};
use slg::sinks::{KafkaOptions, Output};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "slg", version)]
#[command(about = "Special log generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Emit log or consent records to stdout, a file or a Kafka topic.
    #[command(alias = "g")]
    Generate(GenerateArgs),
    /// Write a synthetic configuration document.
    #[command(alias = "c")]
    Configure(ConfigureArgs),
}

#[derive(Debug, clap::Args)]
struct GenerateArgs {
    /// Pause after each record, e.g. 500ms, 1s, 1m30s.
    #[arg(long, env = "SLG_RATE", default_value = "0s")]
    rate: String,
    /// Records to emit; zero or less streams forever.
    #[arg(long, env = "SLG_NUM", default_value_t = 10, allow_negative_numbers = true)]
    num: i64,
    #[arg(short, long, env = "SLG_CONFIG")]
    config: Option<PathBuf>,
    /// Output file, or `kafka`; stdout when omitted.
    #[arg(short, long, env = "SLG_OUTPUT")]
    output: Option<String>,
    /// json or ttl.
    #[arg(short, long, env = "SLG_FORMAT", default_value = "json")]
    format: String,
    /// log or consent.
    #[arg(short = 't', long = "type", env = "SLG_TYPE", default_value = "log")]
    kind: String,
    #[arg(long, env = "SLG_SEED")]
    seed: Option<u64>,
    #[arg(long, env = "SLG_BROKER_LIST", value_delimiter = ',')]
    broker_list: Vec<String>,
    #[arg(long, env = "SLG_TOPIC", default_value = "")]
    topic: String,
    #[arg(long, env = "SLG_CERT_FILE")]
    cert_file: Option<PathBuf>,
    #[arg(long, env = "SLG_KEY_FILE")]
    key_file: Option<PathBuf>,
    #[arg(long, env = "SLG_CA_FILE")]
    ca_file: Option<PathBuf>,
    /// Verify the broker certificate when TLS is enabled.
    #[arg(long, env = "SLG_VERIFY_SSL", default_value_t = true, action = ArgAction::Set)]
    verify_ssl: bool,
    /// Interval between throughput log lines.
    #[arg(long, env = "SLG_METRICS_INTERVAL_MS", default_value_t = 1000)]
    metrics_interval_ms: u64,
}

impl GenerateArgs {
    fn into_options(self) -> slg::Result<GenerateOptions> {
        Ok(GenerateOptions {
            rate: parse_rate(&self.rate)?,
            num: self.num,
            config: self.config,
            output: Output::parse(self.output.as_deref()),
            format: self.format.parse()?,
            kind: self.kind.parse()?,
            seed: self.seed,
            kafka: KafkaOptions {
                brokers: self.broker_list,
                topic: self.topic,
                cert_file: self.cert_file,
                key_file: self.key_file,
                ca_file: self.ca_file,
                verify_ssl: self.verify_ssl,
            },
            progress_interval: Duration::from_millis(self.metrics_interval_ms),
        })
    }
}

/// Configure flags are derived from the pool table, so they are registered by hand.
#[derive(Debug, Clone)]
struct ConfigureArgs {
    options: ConfigureOptions,
}

const MAX_POLICY_SIZE_FLAG: &str = "maxPolicySize";
const OUTPUT_FLAG: &str = "output";

impl clap::FromArgMatches for ConfigureArgs {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut options = ConfigureOptions::default();
        for entry in &POOL_FIELDS {
            let num = matches.get_one::<usize>(entry.num_flag).copied().unwrap_or(0);
            let prefix = matches
                .get_one::<String>(entry.prefix_flag)
                .cloned()
                .unwrap_or_else(|| entry.default_prefix.to_string());
            options.fields.insert(entry.field, FieldRequest { num, prefix });
        }
        options.max_policy_size = matches.get_one::<usize>(MAX_POLICY_SIZE_FLAG).copied();
        options.output = matches.get_one::<PathBuf>(OUTPUT_FLAG).cloned();
        Ok(Self { options })
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        *self = Self::from_arg_matches(matches)?;
        Ok(())
    }
}

impl clap::Args for ConfigureArgs {
    fn augment_args(cmd: Command) -> Command {
        let cmd = POOL_FIELDS.iter().fold(cmd, |cmd, entry| {
            cmd.arg(
                Arg::new(entry.num_flag)
                    .long(entry.num_flag)
                    .value_name("INT")
                    .value_parser(value_parser!(usize))
                    .default_value("0")
                    .help(format!("Number of {} values", entry.name)),
            )
            .arg(
                Arg::new(entry.prefix_flag)
                    .long(entry.prefix_flag)
                    .value_name("PREFIX")
                    .default_value(entry.default_prefix)
                    .help(format!("Prefix for {} values", entry.name)),
            )
        });
        cmd.arg(
            Arg::new(MAX_POLICY_SIZE_FLAG)
                .long(MAX_POLICY_SIZE_FLAG)
                .value_name("INT")
                .value_parser(value_parser!(usize))
                .help("Upper bound on simple policies per consent record"),
        )
        .arg(
            Arg::new(OUTPUT_FLAG)
                .short('o')
                .long(OUTPUT_FLAG)
                .value_parser(value_parser!(PathBuf))
                .help("Output file; .toml writes TOML, anything else JSON"),
        )
    }

    fn augment_args_for_update(cmd: Command) -> Command {
        Self::augment_args(cmd)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> slg::Result<()> {
    match cli.command {
        Commands::Generate(args) => {
            generate(&args.into_options()?)?;
        }
        Commands::Configure(args) => {
            configure(&args.options)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slg::config::Field;
    use slg::formats::Format;
    use slg::sources::RecordKind;

    #[test]
    fn generate_flags_resolve() {
        let cli = Cli::try_parse_from([
            "slg", "g", "--rate", "250ms", "--num", "-1", "-f", "ttl", "-t", "consent", "-o",
            "kafka", "--broker-list", "a:9092,b:9092", "--topic", "events", "--verify-ssl",
            "false",
        ])
        .expect("parse");
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let options = args.into_options().expect("options");
        assert_eq!(options.rate, Duration::from_millis(250));
        assert_eq!(options.num, -1);
        assert_eq!(options.format, Format::Ttl);
        assert_eq!(options.kind, RecordKind::Consent);
        assert_eq!(options.output, Output::Kafka);
        assert_eq!(options.kafka.brokers, vec!["a:9092", "b:9092"]);
        assert!(!options.kafka.verify_ssl);
    }

    #[test]
    fn unknown_format_is_a_usage_error() {
        let cli = Cli::try_parse_from(["slg", "generate", "-f", "xml"]).expect("parse");
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert!(matches!(args.into_options(), Err(slg::Error::Usage(_))));
    }

    #[test]
    fn configure_flags_come_from_the_pool_table() {
        let cli = Cli::try_parse_from([
            "slg",
            "c",
            "--purposeNum",
            "3",
            "--purposePrefix",
            "foo",
            "--maxPolicySize",
            "2",
        ])
        .expect("parse");
        let Commands::Configure(args) = cli.command else {
            panic!("expected configure");
        };
        let purpose = &args.options.fields[&Field::Purpose];
        assert_eq!(purpose.num, 3);
        assert_eq!(purpose.prefix, "foo");
        assert_eq!(args.options.fields[&Field::Storage].num, 0);
        assert_eq!(args.options.fields[&Field::UserId].prefix, "UserId");
        assert_eq!(args.options.max_policy_size, Some(2));
    }

    #[test]
    fn every_generate_flag_reads_the_environment() {
        use clap::CommandFactory;
        let cli = Cli::command();
        let generate = cli.find_subcommand("generate").expect("generate subcommand");
        for arg in generate.get_arguments() {
            if arg.get_long().is_none() || arg.get_id() == "help" {
                continue;
            }
            let env = arg.get_env().and_then(|env| env.to_str());
            assert!(
                env.is_some_and(|env| env.starts_with("SLG_")),
                "--{} has no SLG_ variable",
                arg.get_id()
            );
        }
    }

    #[test]
    fn reports_version() {
        let err = Cli::try_parse_from(["slg", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(err.to_string().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
