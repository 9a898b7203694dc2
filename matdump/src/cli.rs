//! Command-line argument definitions using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

/// Inspect the variables stored in MATLAB .mat files.
///
/// With only an input file, matdump lists the variables it contains.
/// Naming one or more variables prints their contents: numeric arrays,
/// text, and cell and struct arrays recursively.
#[derive(Parser, Debug)]
#[command(name = "matdump")]
#[command(author, version, about, long_about = None)]
#[command(after_help = EXAMPLES)]
pub struct Args {
    /// Input .mat file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Variables to print (omit to list all variables)
    #[arg(value_name = "VAR")]
    pub variables: Vec<String>,

    // ========================================================================
    // Display
    // ========================================================================
    /// How many levels of nested cells and structs to expand
    #[arg(long, value_name = "N", default_value = "3")]
    pub depth: usize,

    /// Maximum number of numeric elements printed per array
    #[arg(long, value_name = "N", default_value = "100")]
    pub max_elements: usize,

    // ========================================================================
    // Output Control
    // ========================================================================
    /// Show debug logging from the MAT reader
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output except variable contents
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Validate argument combinations.
    pub fn validate(&self) -> Result<(), String> {
        if !self.input.exists() {
            return Err(format!("Input file not found: {}", self.input.display()));
        }

        // Quiet and verbose are mutually exclusive
        if self.quiet && self.verbose {
            return Err("Cannot use both --quiet and --verbose".to_string());
        }

        Ok(())
    }

    /// Whether to list variables rather than print them.
    pub fn is_list(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Example usage shown in --help.
const EXAMPLES: &str = r#"
EXAMPLES:
    # List variables in a MAT file
    matdump results.mat

    # Print two variables
    matdump results.mat greeting weights

    # Expand nested cells and structs further
    matdump --depth 6 results.mat config

    # Show the reader's debug log
    matdump -v results.mat
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn args(variables: &[&str]) -> Args {
        Args {
            input: PathBuf::from("test.mat"),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            depth: 3,
            max_elements: 100,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_list_mode() {
        assert!(args(&[]).is_list());
        assert!(!args(&["x"]).is_list());
    }

    #[test]
    fn test_quiet_and_verbose_conflict() {
        let mut a = args(&[]);
        a.input = std::env::temp_dir();
        a.quiet = true;
        a.verbose = true;
        assert!(a.validate().unwrap_err().contains("--quiet"));
    }

    #[test]
    fn test_parse() {
        let a = Args::parse_from(["matdump", "--depth", "5", "in.mat", "a", "b"]);
        assert_eq!(a.depth, 5);
        assert_eq!(a.variables, ["a", "b"]);
    }
}
