use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
#[derive(Debug, Default)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub bind: Option<String>,
    pub journal_out: Option<PathBuf>,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    parse_args_from(env::args().skip(1).collect())
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --preset (expected a preset name)",
                )?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--bind" => {
                i += 1;
                let addr = args.next_or_err(
                    i,
                    "missing value for --bind (expected host:port)",
                )?;
                if opts.bind.replace(addr.to_string()).is_some() {
                    return Err("--bind provided more than once".to_string());
                }
            }
            "--journal-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --journal-out (expected a file path)",
                )?;
                if opts.journal_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--journal-out provided more than once".to_string());
                }
            }
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("device-sim — mock device APIs for end-to-end tests");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  device-sim [--config <path> | --preset <name>] [--bind <addr>] [--journal-out <path>]"
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>        Load configuration from a TOML file");
    eprintln!("  --preset <name>        Use a built-in preset (baseline, daytime)");
    eprintln!("  --bind <addr>          Listen address (default: 127.0.0.1:7070)");
    eprintln!("  --journal-out <path>   Write the request journal as CSV on exit");
    eprintln!("  --help                 Show this help message");
    eprintln!();
    eprintln!("If neither --config nor --preset is given, the baseline preset is used.");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn supports_config_cli() {
        let opts = parse_args_from(args(&["--config", "waterheater.toml"]))
            .expect("parse should succeed");
        assert_eq!(
            opts.config.as_deref().and_then(|p| p.to_str()),
            Some("waterheater.toml")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn supports_overrides() {
        let opts = parse_args_from(args(&[
            "--preset",
            "daytime",
            "--bind",
            "127.0.0.1:0",
            "--journal-out",
            "out.csv",
        ]))
        .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("daytime"));
        assert_eq!(opts.bind.as_deref(), Some("127.0.0.1:0"));
        assert!(opts.journal_out.is_some());
    }

    #[test]
    fn empty_args_use_defaults() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert!(opts.config.is_none() && opts.preset.is_none() && !opts.help);
    }

    #[test]
    fn rejects_config_with_preset() {
        let err = parse_args_from(args(&["--config", "a.toml", "--preset", "baseline"]))
            .unwrap_err();
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn rejects_missing_value_and_unknown_flag() {
        assert!(parse_args_from(args(&["--bind"])).is_err());
        assert!(parse_args_from(args(&["--port", "1"])).is_err());
        assert!(parse_args_from(args(&["--preset", "a", "--preset", "b"])).is_err());
    }
}
