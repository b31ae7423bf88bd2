use std::io::Write;

use crate::{
    ast::{Comparator, Operator, OperatorKind, Scope, FLAG_TRUE},
    emitter::{DataBlock, Payload, Unit},
};

/// Renders `units` in order. A blank line separates scripts, data blocks and
/// any label that can only be reached by a jump.
pub fn write_units(w: &mut impl Write, units: &[Unit]) -> std::io::Result<()> {
    let mut previous: Option<&Unit> = None;
    for unit in units {
        if previous.is_some_and(|previous| starts_section(previous, unit)) {
            writeln!(w)?;
        }
        write_unit(w, unit)?;
        previous = Some(unit);
    }
    Ok(())
}

fn starts_section(previous: &Unit, unit: &Unit) -> bool {
    match unit {
        Unit::Data(_) | Unit::Raw { .. } => true,
        Unit::Label {
            scope: Scope::Global,
            ..
        } => true,
        Unit::Label { .. } => match previous {
            Unit::Goto { .. } | Unit::Data(_) | Unit::Raw { .. } => true,
            Unit::Command { name, .. } => matches!(&**name, "end" | "return" | "goto"),
            _ => false,
        },
        _ => false,
    }
}

pub fn write_unit(w: &mut impl Write, unit: &Unit) -> std::io::Result<()> {
    match unit {
        Unit::Label { name, scope } => write_label(w, name, *scope),
        Unit::Command { name, args } => {
            if args.is_empty() {
                writeln!(w, "\t{name}")
            } else {
                writeln!(w, "\t{name} {}", args.join(", "))
            }
        }
        Unit::Goto { target } => writeln!(w, "\tgoto {target}"),
        Unit::Branch { condition, target } => write_branch(w, condition, target),
        Unit::Raw { text, .. } => writeln!(w, "{text}"),
        Unit::Data(block) => write_data(w, block),
    }
}

fn write_label(w: &mut impl Write, name: &str, scope: Scope) -> std::io::Result<()> {
    match scope {
        Scope::Global => writeln!(w, "{name}::"),
        Scope::Local => writeln!(w, "{name}:"),
    }
}

fn write_branch(w: &mut impl Write, condition: &Operator, target: &str) -> std::io::Result<()> {
    let Operator {
        kind,
        operand,
        comparator,
        value,
    } = condition;
    match kind {
        OperatorKind::Flag => {
            let jump = if &**value == FLAG_TRUE {
                "goto_if_set"
            } else {
                "goto_if_unset"
            };
            writeln!(w, "\t{jump} {operand}, {target}")
        }
        OperatorKind::Var => {
            let jump = match comparator {
                Comparator::Eq => "goto_if_eq",
                Comparator::Ne => "goto_if_ne",
                Comparator::Lt => "goto_if_lt",
                Comparator::Le => "goto_if_le",
                Comparator::Gt => "goto_if_gt",
                Comparator::Ge => "goto_if_ge",
            };
            writeln!(w, "\tcompare {operand}, {value}")?;
            writeln!(w, "\t{jump} {target}")
        }
    }
}

fn write_data(w: &mut impl Write, block: &DataBlock) -> std::io::Result<()> {
    let DataBlock {
        name,
        scope,
        payload,
    } = block;
    if let Payload::Mart(_) = payload {
        // Mart item lists are read as halfwords.
        writeln!(w, "\t.align 2")?;
    }
    write_label(w, name, *scope)?;

    match payload {
        Payload::Text { value, kind } => {
            let directive = kind.as_deref().unwrap_or("string");
            writeln!(w, "\t.{directive} \"{value}$\"")?;
        }
        Payload::Movement(steps) => {
            for step in steps {
                writeln!(w, "\t{step}")?;
            }
            writeln!(w, "\tstep_end")?;
        }
        Payload::Mart(items) => {
            for item in items {
                writeln!(w, "\t.2byte {item}")?;
            }
            writeln!(w, "\t.2byte ITEM_NONE")?;
        }
        Payload::MapScripts(rows) => {
            for row in rows {
                writeln!(w, "\tmap_script {}, {}", row.trigger, row.target)?;
            }
            writeln!(w, "\t.byte 0")?;
        }
        Payload::MapScriptTable(rows) => {
            for row in rows {
                let (condition, value, target) = (&row.condition, &row.value, &row.target);
                writeln!(w, "\tmap_script_2 {condition}, {value}, {target}")?;
            }
            writeln!(w, "\t.2byte 0")?;
        }
    }
    Ok(())
}
