//! Print variable contents.

use std::fmt::{self, Write};

use anyhow::{Context, Result};
use colored::Colorize;

use matvar::{ClassType, Reader, VarRef};

use crate::cli::Args;
use crate::output::{format_dims, format_value};

/// Run the show command.
pub fn run(args: &Args) -> Result<()> {
    let reader = Reader::open(&args.input)
        .with_context(|| format!("Failed to open MAT file: {}", args.input.display()))?;

    for name in &args.variables {
        let var = reader
            .read(name)
            .with_context(|| format!("Cannot read variable '{}'", name))?;
        let view = var
            .as_var_ref()
            .with_context(|| format!("Variable '{}' is empty", name))?;

        let mut out = String::new();
        render(&mut out, name, view, 0, args)?;
        print!("{}", out);
    }

    Ok(())
}

fn render(out: &mut String, label: &str, var: VarRef<'_>, level: usize, args: &Args) -> fmt::Result {
    let indent = "  ".repeat(level);
    let record = var.record();

    write!(
        out,
        "{}{}: {} [{}]",
        indent,
        label.bold(),
        record.class().to_string().cyan(),
        format_dims(record.dims())
    )?;
    if record.is_complex() {
        write!(out, " {}", "complex".yellow())?;
    }
    if record.is_logical() {
        write!(out, " logical")?;
    }
    writeln!(out)?;

    match record.class() {
        ClassType::Char => render_text(out, &indent, var),
        ClassType::Cell | ClassType::Struct if level >= args.depth => {
            writeln!(out, "{}  {}", indent, "...".dimmed())
        }
        ClassType::Cell => {
            let slots = record.cell_slots().unwrap_or(&[]);
            for (index, slot) in slots.iter().enumerate() {
                let label = format!("{{{}}}", index);
                match slot {
                    Some(child) => render(out, &label, VarRef::from(child), level + 1, args)?,
                    None => writeln!(out, "{}  {}: {}", indent, label, "<unset>".dimmed())?,
                }
            }
            Ok(())
        }
        ClassType::Struct => {
            let fields = record.field_names().unwrap_or(&[]);
            let numel = if fields.is_empty() { 0 } else { record.numel() };
            for index in 0..numel {
                for field in fields {
                    let label = if numel == 1 {
                        field.clone()
                    } else {
                        format!("({}).{}", index, field)
                    };
                    match record.field_get(field, index) {
                        Ok(Some(child)) => render(out, &label, VarRef::from(child), level + 1, args)?,
                        _ => writeln!(out, "{}  {}: {}", indent, label, "<unset>".dimmed())?,
                    }
                }
            }
            Ok(())
        }
        _ => render_numeric(out, &indent, var, args.max_elements),
    }
}

fn render_text(out: &mut String, indent: &str, var: VarRef<'_>) -> fmt::Result {
    match var.to_text() {
        Ok(text) => writeln!(out, "{}  {:?}", indent, text),
        Err(_) => writeln!(out, "{}  {}", indent, "<text not printable>".dimmed()),
    }
}

fn render_numeric(out: &mut String, indent: &str, var: VarRef<'_>, max_elements: usize) -> fmt::Result {
    let Some((real, imag)) = var.record().numeric_data() else {
        return writeln!(out, "{}  {}", indent, "<unsupported>".dimmed());
    };
    let real = real.to_f64_vec();
    let imag = imag.map(|imag| imag.to_f64_vec());
    let cell = |index: usize| match &imag {
        Some(imag) if imag[index] < 0.0 => {
            format!("{}-{}i", format_value(real[index]), format_value(-imag[index]))
        }
        Some(imag) => format!("{}+{}i", format_value(real[index]), format_value(imag[index])),
        None => format_value(real[index]),
    };

    let dims = var.dims();
    let shown = real.len().min(max_elements);

    if dims.len() == 2 && dims[0] > 0 {
        // Column-major storage: element (r, c) sits at r + c * rows.
        let (rows, cols) = (dims[0], dims[1]);
        let mut printed = 0;
        for r in 0..rows {
            if printed >= shown {
                break;
            }
            let row: Vec<String> = (0..cols)
                .take(shown - printed)
                .map(|c| cell(r + c * rows))
                .collect();
            printed += row.len();
            writeln!(out, "{}  {}", indent, row.join("  "))?;
        }
    } else if shown > 0 {
        let flat: Vec<String> = (0..shown).map(cell).collect();
        writeln!(out, "{}  {}", indent, flat.join("  "))?;
    }

    if shown < real.len() {
        writeln!(
            out,
            "{}  {}",
            indent,
            format!("... {} more elements", real.len() - shown).dimmed()
        )?;
    }
    Ok(())
}
