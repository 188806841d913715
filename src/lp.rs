//! CPLEX LP text format export, for inspecting a model or handing it to
//! another solver.

use std::fmt::Write;

use crate::model::{Cmp, Direction, Domain, LinExpr, Model};

const TERMS_PER_LINE :usize = 8;

fn write_expr(out :&mut String, model :&Model, expr :&LinExpr) -> std::fmt::Result {
    if expr.terms().is_empty() {
        return write!(out, " 0");
    }
    for (k, (v, c)) in expr.terms().iter().enumerate() {
        if k > 0 && k % TERMS_PER_LINE == 0 {
            write!(out, "\n  ")?;
        }
        let sign = if *c < 0 { "-" } else if k > 0 { "+" } else { "" };
        let coef = c.abs();
        let name = &model.var(*v).name;
        match (sign, coef) {
            ("", 1) => write!(out, " {}", name)?,
            ("", _) => write!(out, " {} {}", coef, name)?,
            (_, 1) => write!(out, " {} {}", sign, name)?,
            (_, _) => write!(out, " {} {} {}", sign, coef, name)?,
        }
    }
    Ok(())
}

fn lp_text(model :&Model) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "\\ {} variables, {} constraints", model.num_vars(), model.num_constraints())?;

    match model.objective() {
        Some(o) => {
            writeln!(out, "{}", match o.direction { Direction::Maximize => "Maximize", Direction::Minimize => "Minimize" })?;
            write!(out, " obj:")?;
            write_expr(&mut out, model, &o.expr)?;
            writeln!(out)?;
        }
        None => {
            writeln!(out, "Minimize")?;
            writeln!(out, " obj:")?;
        }
    }

    writeln!(out, "Subject To")?;
    for c in model.constraints() {
        write!(out, " {}:", c.name)?;
        write_expr(&mut out, model, &c.lhs)?;
        let cmp = match c.cmp {
            Cmp::Le => "<=",
            Cmp::Ge => ">=",
            Cmp::Eq => "=",
        };
        writeln!(out, " {} {}", cmp, c.rhs)?;
    }

    writeln!(out, "Bounds")?;
    for def in model.vars() {
        if let Domain::Integer { min, max } = def.domain {
            writeln!(out, " {} <= {} <= {}", min, def.name, max)?;
        }
    }

    let generals = model.vars().iter().filter(|d| matches!(d.domain, Domain::Integer { .. })).collect::<Vec<_>>();
    if !generals.is_empty() {
        writeln!(out, "General")?;
        for d in generals {
            writeln!(out, " {}", d.name)?;
        }
    }

    let binaries = model.vars().iter().filter(|d| d.domain == Domain::Binary).collect::<Vec<_>>();
    if !binaries.is_empty() {
        writeln!(out, "Binary")?;
        for d in binaries {
            writeln!(out, " {}", d.name)?;
        }
    }

    writeln!(out, "End")?;
    Ok(out)
}

/// The model in LP format.
pub fn write_lp(model :&Model) -> String {
    // Formatting into a String only fails if a Display impl does.
    lp_text(model).unwrap_or_default()
}
