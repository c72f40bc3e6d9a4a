use std::path::PathBuf;

use clap::Parser;

/// Tags flow log records from a lookup table and writes a summary report.
#[derive(Debug, Parser)]
#[command(name = "flowtag", version, about)]
pub struct Opts {
    /// Path to the lookup table CSV (`dstport,protocol,tag` with a header
    /// row).
    pub lookup_file: PathBuf,

    /// Path to the flow log, one `dstport protocol` record per line.
    pub flow_log_file: PathBuf,

    /// Path the report is written to. An existing file is overwritten.
    pub output_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[test]
    fn requires_all_three_paths() {
        assert!(Opts::try_parse_from(["flowtag", "lookup.csv", "flow.log"]).is_err());

        let opts =
            Opts::try_parse_from(["flowtag", "lookup.csv", "flow.log", "report.txt"]).unwrap();
        assert_eq!(opts.lookup_file, PathBuf::from("lookup.csv"));
        assert_eq!(opts.flow_log_file, PathBuf::from("flow.log"));
        assert_eq!(opts.output_file, PathBuf::from("report.txt"));
    }
}
