//! Command-line argument definitions (clap).

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "fan-manager")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Closed-loop fan controller for a dual-socket IPMI board", long_about = None)]
pub struct Args {
    // === Configuration ===
    /// Path to the JSON config file
    #[arg(short = 'c', long, value_name = "PATH", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Set log level (TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL)
    #[arg(long = "log-level", help_heading = "Configuration")]
    pub log_level: Option<String>,

    /// Log fan writes instead of sending them to the BMC
    #[arg(long = "dry-run", help_heading = "Configuration")]
    pub dry_run: bool,

    // === Control ===
    /// Run a single control tick and exit
    #[arg(long, help_heading = "Control")]
    pub once: bool,

    /// Hand fan control back to the BMC (auto mode) and exit
    #[arg(long = "restore-auto", help_heading = "Control")]
    pub restore_auto: bool,

    // === Diagnostics ===
    /// Read temperatures and print the computed duties without writing them
    #[arg(long, help_heading = "Diagnostics")]
    pub test: bool,

    /// Print the fan mode and duties currently held by the BMC
    #[arg(long = "show-fans", help_heading = "Diagnostics")]
    pub show_fans: bool,

    /// Print the effective configuration as JSON
    #[arg(long = "print-config", help_heading = "Diagnostics")]
    pub print_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_means_run_the_loop() {
        let args = Args::try_parse_from(["fan-manager"]).unwrap();
        assert!(!args.once && !args.test && !args.show_fans && !args.restore_auto);
        assert_eq!(args.config, None);
    }

    #[test]
    fn parses_config_and_level() {
        let args = Args::try_parse_from([
            "fan-manager",
            "--config",
            "/tmp/fm.json",
            "--log-level",
            "DEBUG",
            "--dry-run",
            "--once",
        ])
        .unwrap();
        assert_eq!(args.config.as_deref(), Some("/tmp/fm.json"));
        assert_eq!(args.log_level.as_deref(), Some("DEBUG"));
        assert!(args.dry_run && args.once);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Args::try_parse_from(["fan-manager", "--turbo"]).is_err());
    }
}
