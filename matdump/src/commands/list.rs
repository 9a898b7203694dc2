//! List variables command (default mode).

use anyhow::{Context, Result};
use colored::Colorize;

use matvar::Reader;

use crate::cli::Args;
use crate::output;

/// Run the list command.
pub fn run(args: &Args) -> Result<()> {
    let reader = Reader::open(&args.input)
        .with_context(|| format!("Failed to open MAT file: {}", args.input.display()))?;

    let vars = reader.variables();
    if vars.is_empty() {
        output::print_warning("No readable variables found in MAT file");
        return Ok(());
    }

    if !args.quiet {
        println!("{}", format!("Variables in '{}':", args.input.display()).bold());
        if !reader.header().is_empty() {
            println!("{}", reader.header().dimmed());
        }
        println!();
    }

    // Calculate column widths
    let max_name = vars.iter().map(|v| v.name.len()).max().unwrap_or(4).max(4);

    // Print header row
    println!(
        "  {:<width$}  {:>12}  {:>8}  {}",
        "Name", "Shape", "Class", "Notes",
        width = max_name
    );
    println!(
        "  {:-<width$}  {:->12}  {:->8}  -----",
        "", "", "",
        width = max_name
    );

    for var in &vars {
        let mut notes = Vec::new();
        if var.complex {
            notes.push("complex".yellow().to_string());
        }
        if var.logical {
            notes.push("logical".to_string());
        }
        if var.compressed {
            notes.push("compressed".dimmed().to_string());
        }

        println!(
            "  {:<width$}  {:>12}  {:>8}  {}",
            var.name,
            output::format_dims(&var.dims),
            var.class.to_string(),
            notes.join(", "),
            width = max_name
        );
    }

    println!();
    output::print_info(
        &format!("{} variables found", output::format_number(vars.len())),
        args.quiet,
    );

    Ok(())
}
