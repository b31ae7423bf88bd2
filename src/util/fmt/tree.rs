use std::io::Write;

use crate::ast::*;

const INDENT_WIDTH: usize = 2;

pub fn print_program_string(program: &Program) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_program(w: &mut impl Write, program: &Program) -> std::io::Result<()> {
    for statement in &program.statements {
        print_statement(w, 0, statement)?;
    }
    if !program.texts.is_empty() {
        writeln!(w, "texts")?;
        for text in &program.texts {
            sp(w, 1)?;
            write!(w, "{} ({})", text.name, text.scope)?;
            if let Some(kind) = &text.kind {
                write!(w, " {kind}")?;
            }
            writeln!(w, " {:?}", text.value)?;
        }
    }
    Ok(())
}

pub fn print_statement(w: &mut impl Write, i: usize, statement: &Statement) -> std::io::Result<()> {
    sp(w, i)?;
    match statement {
        Statement::Script(Script { name, body, scope }) => {
            writeln!(w, "script {name} ({scope})")?;
            print_block(w, i + 1, body)?;
        }
        Statement::Block(block) => {
            writeln!(w, "block")?;
            print_block(w, i + 1, block)?;
        }
        Statement::Command(command) => {
            write!(w, "command ")?;
            print_command(w, command)?;
            writeln!(w)?;
        }
        Statement::Raw(Raw { value, scope, .. }) => {
            writeln!(w, "raw ({scope}) {value:?}")?;
        }
        Statement::Text(TextDecl {
            name,
            value,
            kind,
            scope,
        }) => {
            write!(w, "text {name} ({scope})")?;
            if let Some(kind) = kind {
                write!(w, " {kind}")?;
            }
            writeln!(w, " {value:?}")?;
        }
        Statement::Movement(Movement { name, steps, scope }) => {
            writeln!(w, "movement {name} ({scope})")?;
            print_words(w, i + 1, steps)?;
        }
        Statement::Mart(Mart { name, items, scope }) => {
            writeln!(w, "mart {name} ({scope})")?;
            print_words(w, i + 1, items)?;
        }
        Statement::If(If {
            consequence,
            elifs,
            alternative,
            ..
        }) => {
            writeln!(w, "if")?;
            print_condition(w, i + 1, consequence)?;
            for elif in elifs {
                print_condition(w, i + 1, elif)?;
            }
            if let Some(alternative) = alternative {
                sp(w, i + 1)?;
                writeln!(w, "else")?;
                print_block(w, i + 2, alternative)?;
            }
        }
        Statement::While(Loop { id, condition, .. }) => {
            writeln!(w, "while {id}")?;
            print_condition(w, i + 1, condition)?;
        }
        Statement::DoWhile(Loop { id, condition, .. }) => {
            writeln!(w, "do-while {id}")?;
            print_condition(w, i + 1, condition)?;
        }
        Statement::Break(jump) => {
            write!(w, "break -> ")?;
            print_jump_target(w, jump)?;
        }
        Statement::Continue(jump) => {
            write!(w, "continue -> ")?;
            print_jump_target(w, jump)?;
        }
        Statement::Switch(Switch {
            id, operand, cases, ..
        }) => {
            writeln!(w, "switch {id} var({operand})")?;
            for case in cases {
                sp(w, i + 1)?;
                match &case.label {
                    CaseLabel::Value(value) => writeln!(w, "case {value}")?,
                    CaseLabel::Default => writeln!(w, "default")?,
                }
                print_block(w, i + 2, &case.body)?;
            }
        }
        Statement::MapScripts(MapScripts {
            name,
            entries,
            tables,
            scope,
        }) => {
            writeln!(w, "mapscripts {name} ({scope})")?;
            for entry in entries {
                sp(w, i + 1)?;
                write!(w, "{}", entry.trigger)?;
                print_mapscript_target(w, i + 2, &entry.target)?;
            }
            for table in tables {
                sp(w, i + 1)?;
                writeln!(w, "table {}", table.trigger)?;
                for row in &table.entries {
                    sp(w, i + 2)?;
                    write!(w, "{}, {}", row.condition, row.value)?;
                    print_mapscript_target(w, i + 3, &row.target)?;
                }
            }
        }
    }
    Ok(())
}

fn print_block(w: &mut impl Write, i: usize, block: &Block) -> std::io::Result<()> {
    for statement in &block.statements {
        print_statement(w, i, statement)?;
    }
    Ok(())
}

fn print_condition(w: &mut impl Write, i: usize, condition: &Condition) -> std::io::Result<()> {
    sp(w, i)?;
    writeln!(w, "condition {}", condition.expr)?;
    print_block(w, i + 1, &condition.body)
}

fn print_command(w: &mut impl Write, Command { name, args }: &Command) -> std::io::Result<()> {
    write!(w, "{name}")?;
    if !args.is_empty() {
        write!(w, "({})", args.join(", "))?;
    }
    Ok(())
}

fn print_jump_target(w: &mut impl Write, jump: &Jump) -> std::io::Result<()> {
    match jump.target {
        Some(id) => writeln!(w, "{id}"),
        None => writeln!(w, "?"),
    }
}

fn print_mapscript_target(
    w: &mut impl Write,
    i: usize,
    target: &MapScriptTarget,
) -> std::io::Result<()> {
    match target {
        MapScriptTarget::Symbol(symbol) => writeln!(w, " -> {symbol}"),
        MapScriptTarget::Inline(body) => {
            writeln!(w)?;
            print_block(w, i, body)
        }
    }
}

fn print_words(w: &mut impl Write, i: usize, words: &[Box<str>]) -> std::io::Result<()> {
    for word in words {
        sp(w, i)?;
        writeln!(w, "{word}")?;
    }
    Ok(())
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}
