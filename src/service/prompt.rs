use std::io::{self, BufRead, Write};

use crate::common::Plan;

/// Writes the plan in the order it will be applied.
pub fn describe_plan(plan: &Plan, out: &mut impl Write) -> io::Result<()> {
    if !plan.delete.is_empty() {
        writeln!(out, "Records to delete:")?;
        for rec in &plan.delete {
            writeln!(out, "{rec}")?;
        }
        writeln!(out)?;
    }

    if !plan.create.is_empty() {
        writeln!(out, "Records to add:")?;
        for rec in &plan.create {
            writeln!(out, "{rec}")?;
        }
        writeln!(out)?;
    }

    if !plan.update.is_empty() {
        writeln!(out, "Records to update:")?;
        for edit in &plan.update {
            writeln!(out, "{} -> {}", edit.from, edit.to)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// Shows the plan and asks once for confirmation. Only `y` or `Y` accepts.
/// An empty plan needs no confirmation.
pub fn confirm(plan: &Plan, input: &mut impl BufRead, out: &mut impl Write) -> io::Result<bool> {
    describe_plan(plan, out)?;

    if plan.is_empty() {
        return Ok(true);
    }

    write!(out, "{} change(s). Continue (y/N)? ", plan.len())?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim_end_matches(&['\r', '\n'][..]), "y" | "Y"))
}
