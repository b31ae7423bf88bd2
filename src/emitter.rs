use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::{
    ast::{
        Block, BoolExpr, CaseLabel, Comparator, ConstructId, If, Jump, LogicalOperator, Loop,
        MapScriptTarget, MapScripts, Operator, OperatorKind, Program, Scope, Statement, Switch,
        TextDecl,
    },
    session::Session,
    token::{Span, Spanned},
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// One element of the flat output sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unit {
    Label {
        name: Box<str>,
        scope: Scope,
    },
    Command {
        name: Box<str>,
        args: Vec<Box<str>>,
    },
    Goto {
        target: Box<str>,
    },
    /// Jumps to `target` when `condition` holds, falls through otherwise.
    Branch {
        condition: Operator,
        target: Box<str>,
    },
    Raw {
        text: Box<str>,
        scope: Scope,
    },
    Data(DataBlock),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataBlock {
    pub name: Box<str>,
    pub scope: Scope,
    pub payload: Payload,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    Text {
        value: Box<str>,
        kind: Option<Box<str>>,
    },
    Movement(Vec<Box<str>>),
    Mart(Vec<Box<str>>),
    MapScripts(Vec<MapScriptRow>),
    MapScriptTable(Vec<TableRow>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapScriptRow {
    pub trigger: Box<str>,
    pub target: Box<str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub condition: Box<str>,
    pub value: Box<str>,
    pub target: Box<str>,
}

/// Lowers a resolved program into a flat sequence of units.
///
/// Top-level statements are emitted in source order, followed by the text
/// pool (explicit texts as declared, then implicit ones in discovery order).
/// Generated labels are drawn from `session`, so they never repeat within it.
/// Any name defined twice in the output, generated or declared, is an error.
pub fn emit(program: &Program, session: &mut Session) -> Result<Vec<Unit>> {
    let mut emitter = Emitter {
        session,
        units: Vec::with_capacity(256),
        targets: HashMap::new(),
        defined: HashSet::new(),
        script: "".into(),
        origin: Span::default(),
    };

    let mut texts = Vec::new();
    for statement in &program.statements {
        match statement {
            Statement::Text(text) => texts.push(text),
            Statement::MapScripts(mapscripts) => emitter.mapscripts(mapscripts)?,
            other => emitter.statement(other)?,
        }
    }
    emitter.text_pool(&texts, program)?;

    debug!("emitted {} units", emitter.units.len());
    Ok(emitter.units)
}

/// Where `break` and `continue` go for a given loop or switch.
struct Targets {
    on_break: Box<str>,
    /// `None` for switches, which never capture `continue`.
    on_continue: Option<Box<str>>,
}

struct Emitter<'ses> {
    session: &'ses mut Session,
    units: Vec<Unit>,
    targets: HashMap<ConstructId, Targets>,
    /// Every label and data block name emitted so far.
    defined: HashSet<Box<str>>,
    /// Name of the script being lowered; prefix of its generated labels.
    script: Box<str>,
    /// Declaration that the names currently being defined are reported against.
    origin: Span,
}

impl Emitter<'_> {
    fn script(&mut self, name: &str, scope: Scope, body: &Block, origin: Span) -> Result<()> {
        self.script = name.into();
        self.origin = origin;
        self.define(name)?;
        self.units.push(Unit::Label {
            name: name.into(),
            scope,
        });
        self.block(body)?;
        if !self.leaves_script() {
            self.command("end");
        }
        Ok(())
    }

    /// Whether the last emitted unit transfers control out of the script.
    fn leaves_script(&self) -> bool {
        match self.units.last() {
            Some(Unit::Goto { .. }) => true,
            Some(Unit::Command { name, .. }) => matches!(&**name, "end" | "return" | "goto"),
            _ => false,
        }
    }

    fn block(&mut self, block: &Block) -> Result<()> {
        for statement in &block.statements {
            self.statement(statement)?;
        }
        Ok(())
    }

    fn statement(&mut self, statement: &Statement) -> Result<()> {
        match statement {
            Statement::Script(script) => {
                let name = &script.name;
                self.script(&name.name, script.scope, &script.body, name.span)?;
            }
            Statement::Block(block) => self.block(block)?,
            Statement::Command(command) => self.units.push(Unit::Command {
                name: command.name.name.clone(),
                args: command.args.clone(),
            }),
            Statement::Raw(raw) => self.units.push(Unit::Raw {
                text: raw.value.clone(),
                scope: raw.scope,
            }),
            Statement::Movement(movement) => {
                self.origin = movement.name.span;
                let payload = Payload::Movement(movement.steps.clone());
                self.data(&movement.name.name, movement.scope, payload)?;
            }
            Statement::Mart(mart) => {
                self.origin = mart.name.span;
                self.data(&mart.name.name, mart.scope, Payload::Mart(mart.items.clone()))?;
            }
            Statement::If(stmt) => self.if_chain(stmt)?,
            Statement::While(stmt) => self.while_loop(stmt)?,
            Statement::DoWhile(stmt) => self.do_while_loop(stmt)?,
            Statement::Switch(stmt) => self.switch(stmt)?,
            Statement::Break(jump) => {
                let target = self.jump_target(jump, "break", |t| Some(&*t.on_break))?;
                self.goto(&target);
            }
            Statement::Continue(jump) => {
                let target = self.jump_target(jump, "continue", |t| t.on_continue.as_deref())?;
                self.goto(&target);
            }
            Statement::Text(_) | Statement::MapScripts(_) => {
                unreachable!("only allowed at the top level")
            }
        }
        Ok(())
    }

    fn if_chain(&mut self, stmt: &If) -> Result<()> {
        let end = self.new_label();
        let conditions: Vec<_> = std::iter::once(&stmt.consequence)
            .chain(&stmt.elifs)
            .collect();

        for (i, condition) in conditions.iter().enumerate() {
            let is_last = i + 1 == conditions.len() && stmt.alternative.is_none();
            let next = if is_last {
                end.clone()
            } else {
                self.new_label()
            };
            self.branch(&condition.expr, false, &next)?;
            self.block(&condition.body)?;
            if !is_last {
                self.goto(&end);
                self.label(&next)?;
            }
        }
        if let Some(alternative) = &stmt.alternative {
            self.block(alternative)?;
        }
        self.label(&end)?;
        Ok(())
    }

    fn while_loop(&mut self, stmt: &Loop) -> Result<()> {
        let test = self.new_label();
        let end = self.new_label();
        self.targets.insert(
            stmt.id,
            Targets {
                on_break: end.clone(),
                on_continue: Some(test.clone()),
            },
        );

        self.label(&test)?;
        self.branch(&stmt.condition.expr, false, &end)?;
        self.block(&stmt.condition.body)?;
        self.goto(&test);
        self.label(&end)?;
        Ok(())
    }

    /// The condition is only evaluated after the body. `continue` goes to the
    /// test rather than the body start.
    fn do_while_loop(&mut self, stmt: &Loop) -> Result<()> {
        let body = self.new_label();
        let test = self.new_label();
        let end = self.new_label();
        self.targets.insert(
            stmt.id,
            Targets {
                on_break: end.clone(),
                on_continue: Some(test.clone()),
            },
        );

        self.label(&body)?;
        self.block(&stmt.condition.body)?;
        self.label(&test)?;
        self.branch(&stmt.condition.expr, true, &body)?;
        self.label(&end)?;
        Ok(())
    }

    fn switch(&mut self, stmt: &Switch) -> Result<()> {
        let labels: Vec<_> = stmt.cases.iter().map(|_| self.new_label()).collect();
        let end = self.new_label();
        self.targets.insert(
            stmt.id,
            Targets {
                on_break: end.clone(),
                on_continue: None,
            },
        );

        let mut fallback = &end;
        for (case, label) in stmt.cases.iter().zip(&labels) {
            match &case.label {
                CaseLabel::Value(value) => {
                    let condition = Operator {
                        kind: OperatorKind::Var,
                        operand: stmt.operand.clone(),
                        comparator: Comparator::Eq,
                        value: value.clone(),
                    };
                    self.units.push(Unit::Branch {
                        condition,
                        target: label.clone(),
                    });
                }
                CaseLabel::Default => fallback = label,
            }
        }
        self.goto(fallback);

        for (case, label) in stmt.cases.iter().zip(&labels) {
            self.label(label)?;
            self.block(&case.body)?;
            self.goto(&end);
        }
        self.label(&end)?;
        Ok(())
    }

    /// Lowers `expr` so that control reaches `target` exactly when the
    /// expression evaluates to `jump_when`, and falls through otherwise.
    /// Operands are tested left to right and stop as soon as the outcome is
    /// known.
    fn branch(&mut self, expr: &BoolExpr, jump_when: bool, target: &str) -> Result<()> {
        match expr {
            BoolExpr::Operator(operator) => {
                let condition = if jump_when {
                    operator.clone()
                } else {
                    operator.negated()
                };
                self.units.push(Unit::Branch {
                    condition,
                    target: target.into(),
                });
            }
            BoolExpr::Binary { lhs, op, rhs } => {
                // `&&` jumps out on the first false operand, `||` on the
                // first true one.
                let short_circuits_on = *op == LogicalOperator::Or;
                if jump_when == short_circuits_on {
                    self.branch(lhs, jump_when, target)?;
                    self.branch(rhs, jump_when, target)?;
                } else {
                    let skip = self.new_label();
                    self.branch(lhs, short_circuits_on, &skip)?;
                    self.branch(rhs, jump_when, target)?;
                    self.label(&skip)?;
                }
            }
        }
        Ok(())
    }

    fn jump_target(
        &self,
        jump: &Jump,
        keyword: &'static str,
        select: impl Fn(&Targets) -> Option<&str>,
    ) -> Result<Box<str>> {
        jump.target
            .and_then(|id| self.targets.get(&id))
            .and_then(select)
            .map(Box::from)
            .ok_or_else(|| jump.span.wrap(Error::UnresolvedTarget(keyword)))
    }

    fn mapscripts(&mut self, mapscripts: &MapScripts) -> Result<()> {
        let MapScripts {
            name,
            entries,
            tables,
            scope,
        } = mapscripts;
        let mut promoted = Vec::new();

        let mut rows = Vec::with_capacity(entries.len() + tables.len());
        for entry in entries {
            let target = match &entry.target {
                MapScriptTarget::Symbol(symbol) => symbol.name.clone(),
                MapScriptTarget::Inline(body) => {
                    let script: Box<str> = format!("{name}_{}", entry.trigger).into();
                    promoted.push((script.clone(), body, entry.trigger.span));
                    script
                }
            };
            rows.push(MapScriptRow {
                trigger: entry.trigger.name.clone(),
                target,
            });
        }

        let mut table_blocks = Vec::with_capacity(tables.len());
        for table in tables {
            let table_label: Box<str> = format!("{name}_{}", table.trigger).into();
            let mut table_rows = Vec::with_capacity(table.entries.len());
            for (index, row) in table.entries.iter().enumerate() {
                let target = match &row.target {
                    MapScriptTarget::Symbol(symbol) => symbol.name.clone(),
                    MapScriptTarget::Inline(body) => {
                        let script: Box<str> = format!("{table_label}_{index}").into();
                        promoted.push((script.clone(), body, table.trigger.span));
                        script
                    }
                };
                table_rows.push(TableRow {
                    condition: row.condition.clone(),
                    value: row.value.clone(),
                    target,
                });
            }
            rows.push(MapScriptRow {
                trigger: table.trigger.name.clone(),
                target: table_label.clone(),
            });
            table_blocks.push((table_label, table.trigger.span, table_rows));
        }

        self.origin = name.span;
        self.data(&name.name, *scope, Payload::MapScripts(rows))?;
        for (table_label, origin, table_rows) in table_blocks {
            self.origin = origin;
            self.data(&table_label, Scope::Local, Payload::MapScriptTable(table_rows))?;
        }
        for (script, body, origin) in promoted {
            trace!("promoting inline map script {script}");
            self.script(&script, Scope::Local, body, origin)?;
        }
        Ok(())
    }

    fn text_pool(&mut self, explicit: &[&TextDecl], program: &Program) -> Result<()> {
        let mut declared: HashMap<&str, Span> = HashMap::with_capacity(explicit.len());
        for text in explicit {
            let name = &text.name;
            if declared.insert(&*name.name, name.span).is_some() {
                return Err(name.span.wrap(Error::DuplicateText(name.name.clone())));
            }
            let payload = Payload::Text {
                value: text.value.clone(),
                kind: text.kind.clone(),
            };
            self.origin = name.span;
            self.data(&name.name, text.scope, payload)?;
        }

        for text in &program.texts {
            if let Some(span) = declared.get(&*text.name) {
                return Err(span.wrap(Error::DuplicateText(text.name.clone())));
            }
            let payload = Payload::Text {
                value: text.value.clone(),
                kind: text.kind.clone(),
            };
            self.origin = text.span;
            self.data(&text.name, text.scope, payload)?;
        }
        Ok(())
    }
}

impl Emitter<'_> {
    fn new_label(&mut self) -> Box<str> {
        let label = format!("{}_{}", self.script, self.session.next_label_index());
        trace!("allocated label {label}");
        label.into_boxed_str()
    }

    fn define(&mut self, name: &str) -> Result<()> {
        if self.defined.insert(name.into()) {
            Ok(())
        } else {
            Err(self.origin.wrap(Error::DuplicateLabel(name.into())))
        }
    }

    fn label(&mut self, name: &str) -> Result<()> {
        self.define(name)?;
        self.units.push(Unit::Label {
            name: name.into(),
            scope: Scope::Local,
        });
        Ok(())
    }

    fn goto(&mut self, target: &str) {
        self.units.push(Unit::Goto {
            target: target.into(),
        });
    }

    fn command(&mut self, name: &str) {
        self.units.push(Unit::Command {
            name: name.into(),
            args: Vec::new(),
        });
    }

    fn data(&mut self, name: &str, scope: Scope, payload: Payload) -> Result<()> {
        self.define(name)?;
        self.units.push(Unit::Data(DataBlock {
            name: name.into(),
            scope,
            payload,
        }));
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("`{0}` has no resolved target")]
    UnresolvedTarget(&'static str),
    #[error("text '{0}' is defined more than once")]
    DuplicateText(Box<str>),
    #[error("label '{0}' is defined more than once")]
    DuplicateLabel(Box<str>),
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{compile, parser::test_utils::parse_program, Diagnostic};

    fn compile_ok(src: &str) -> Vec<Unit> {
        compile(src, &mut Session::new()).expect("failed to compile")
    }

    /// A tiny interpreter for emitted units. Commands it doesn't know are
    /// recorded in `trace`; every evaluated branch records its operand in
    /// `tests`.
    #[derive(Default)]
    struct Machine {
        flags: HashMap<String, bool>,
        vars: HashMap<String, i64>,
        tests: Vec<String>,
        trace: Vec<String>,
    }

    impl Machine {
        fn with_flags(flags: &[(&str, bool)]) -> Machine {
            let flags = flags.iter().map(|(k, v)| (k.to_string(), *v)).collect();
            Machine {
                flags,
                ..Machine::default()
            }
        }

        fn run(&mut self, units: &[Unit], entry: &str) {
            let labels: HashMap<&str, usize> = (units.iter().enumerate())
                .filter_map(|(i, unit)| match unit {
                    Unit::Label { name, .. } => Some((&**name, i)),
                    _ => None,
                })
                .collect();

            let mut pc = labels[entry] + 1;
            for _ in 0..10_000 {
                match &units[pc] {
                    Unit::Command { name, args } => match &**name {
                        "end" | "return" => return,
                        "setvar" => {
                            let value = args[1].parse().unwrap();
                            self.vars.insert(args[0].to_string(), value);
                        }
                        "addvar" => {
                            let value: i64 = args[1].parse().unwrap();
                            *self.vars.entry(args[0].to_string()).or_default() += value;
                        }
                        _ => self.trace.push(name.to_string()),
                    },
                    Unit::Goto { target } => {
                        pc = labels[&**target];
                        continue;
                    }
                    Unit::Branch { condition, target } => {
                        self.tests.push(condition.operand.to_string());
                        if self.holds(condition) {
                            pc = labels[&**target];
                            continue;
                        }
                    }
                    Unit::Label { scope: Scope::Global, .. } => panic!("ran into another script"),
                    _ => (),
                }
                pc += 1;
            }
            panic!("script did not terminate");
        }

        fn holds(&self, op: &Operator) -> bool {
            match op.kind {
                OperatorKind::Flag => {
                    let set = self.flags.get(&*op.operand).copied().unwrap_or(false);
                    set == (&*op.value == "TRUE")
                }
                OperatorKind::Var => {
                    let lhs = self.vars.get(&*op.operand).copied().unwrap_or(0);
                    let rhs: i64 = op.value.parse().unwrap();
                    match op.comparator {
                        Comparator::Eq => lhs == rhs,
                        Comparator::Ne => lhs != rhs,
                        Comparator::Lt => lhs < rhs,
                        Comparator::Le => lhs <= rhs,
                        Comparator::Gt => lhs > rhs,
                        Comparator::Ge => lhs >= rhs,
                    }
                }
            }
        }
    }

    fn label(name: &str) -> Unit {
        Unit::Label {
            name: name.into(),
            scope: Scope::Local,
        }
    }

    fn goto(target: &str) -> Unit {
        Unit::Goto {
            target: target.into(),
        }
    }

    fn command(name: &str) -> Unit {
        Unit::Command {
            name: name.into(),
            args: vec![],
        }
    }

    fn var_branch(operand: &str, comparator: Comparator, value: &str, target: &str) -> Unit {
        Unit::Branch {
            condition: Operator {
                kind: OperatorKind::Var,
                operand: operand.into(),
                comparator,
                value: value.into(),
            },
            target: target.into(),
        }
    }

    fn flag_branch(operand: &str, value: &str, target: &str) -> Unit {
        Unit::Branch {
            condition: Operator {
                kind: OperatorKind::Flag,
                operand: operand.into(),
                comparator: Comparator::Eq,
                value: value.into(),
            },
            target: target.into(),
        }
    }

    #[test]
    fn and_skips_right_operand_when_left_is_false() {
        let units = compile_ok(
            "script Main { if (flag(A) == TRUE && var(B) == 1) { yes } else { no } }",
        );

        let mut m = Machine::with_flags(&[("A", false)]);
        m.run(&units, "Main");
        assert_eq!(m.tests, ["A"]);
        assert_eq!(m.trace, ["no"]);

        let mut m = Machine::with_flags(&[("A", true)]);
        m.vars.insert("B".into(), 1);
        m.run(&units, "Main");
        assert_eq!(m.tests, ["A", "B"]);
        assert_eq!(m.trace, ["yes"]);
    }

    #[test]
    fn or_skips_right_operand_when_left_is_true() {
        let units = compile_ok(
            "script Main { if (flag(A) == TRUE || var(B) == 1) { yes } else { no } }",
        );

        let mut m = Machine::with_flags(&[("A", true)]);
        m.run(&units, "Main");
        assert_eq!(m.tests, ["A"]);
        assert_eq!(m.trace, ["yes"]);

        let mut m = Machine::with_flags(&[("A", false)]);
        m.run(&units, "Main");
        assert_eq!(m.tests, ["A", "B"]);
        assert_eq!(m.trace, ["no"]);
    }

    #[test]
    fn nested_conditions_match_truth_table() {
        let cond = "(flag(A) == TRUE || flag(B) == TRUE) && (flag(C) == TRUE || flag(D) == FALSE)";
        let if_units = compile_ok(&format!("script Main {{ if ({cond}) {{ yes }} else {{ no }} }}"));
        let while_units = compile_ok(&format!(
            "script Main {{ while ({cond}) {{ yes break }} no }}"
        ));
        // The counter bounds the loop, so the body runs twice exactly when
        // the rest of the condition holds.
        let do_units = compile_ok(&format!(
            "script Main {{ do {{ addvar(N, 1) tick }} while (var(N) < 2 && ({cond})) }}"
        ));

        for bits in 0..16 {
            let [a, b, c, d] = [0, 1, 2, 3].map(|i| bits & (1 << i) != 0);
            let flags = [("A", a), ("B", b), ("C", c), ("D", d)];
            let expected = (a || b) && (c || !d);

            for units in [&if_units, &while_units] {
                let mut m = Machine::with_flags(&flags);
                m.run(units, "Main");
                let want = if expected { "yes" } else { "no" };
                assert_eq!(m.trace.first().map(String::as_str), Some(want), "{flags:?}");
            }

            let mut m = Machine::with_flags(&flags);
            m.run(&do_units, "Main");
            let ticks = if expected { 2 } else { 1 };
            assert_eq!(m.trace.len(), ticks, "{flags:?}");
        }
    }

    #[test]
    fn while_break_targets_loop_end() {
        let units = compile_ok(
            "
            script Main {
                while (var(V) == 1) {
                    if (flag(F) == TRUE) { break }
                    step
                }
            }
            ",
        );
        assert_eq!(
            &units[1..],
            [
                label("Main_1"),
                var_branch("V", Comparator::Ne, "1", "Main_2"),
                flag_branch("F", "FALSE", "Main_3"),
                goto("Main_2"),
                label("Main_3"),
                command("step"),
                goto("Main_1"),
                label("Main_2"),
                command("end"),
            ]
        );
    }

    #[test]
    fn do_while_tests_condition_after_body() {
        let units = compile_ok("script Main { do { first } while (flag(X) == TRUE); }");
        let mut m = Machine::default();
        m.run(&units, "Main");
        assert_eq!(m.trace, ["first"]);
        assert_eq!(m.tests, ["X"]);

        assert_eq!(
            &units[1..],
            [
                label("Main_1"),
                command("first"),
                label("Main_2"),
                flag_branch("X", "TRUE", "Main_1"),
                label("Main_3"),
                command("end"),
            ]
        );
    }

    #[test]
    fn do_while_continue_retests_condition() {
        let units = compile_ok(
            "
            script Main {
                do {
                    addvar(V, 1)
                    if (var(V) < 3) { continue }
                    ran
                } while (var(V) < 5)
            }
            ",
        );
        let mut m = Machine::default();
        m.run(&units, "Main");
        assert_eq!(m.trace, ["ran", "ran", "ran"]);
        assert_eq!(m.vars["V"], 5);
    }

    #[test]
    fn switch_with_default() {
        let units = compile_ok(
            "
            script Main {
                switch (var(V)) {
                    case 1: a
                    case 2: b
                    default: c
                }
            }
            ",
        );
        assert_eq!(
            &units[1..],
            [
                var_branch("V", Comparator::Eq, "1", "Main_1"),
                var_branch("V", Comparator::Eq, "2", "Main_2"),
                goto("Main_3"),
                label("Main_1"),
                command("a"),
                goto("Main_4"),
                label("Main_2"),
                command("b"),
                goto("Main_4"),
                label("Main_3"),
                command("c"),
                goto("Main_4"),
                label("Main_4"),
                command("end"),
            ]
        );

        for (value, expected) in [(1, "a"), (2, "b"), (7, "c")] {
            let mut m = Machine::default();
            m.vars.insert("V".into(), value);
            m.run(&units, "Main");
            assert_eq!(m.trace, [expected]);
        }
    }

    #[test]
    fn switch_without_default_falls_to_end_and_passes_continue_through() {
        let units = compile_ok(
            "
            script Main {
                while (var(N) < 3) {
                    addvar(N, 1)
                    switch (var(N)) {
                        case 2: continue
                        case 3: break
                    }
                    seen
                }
                done
            }
            ",
        );
        let mut m = Machine::default();
        m.run(&units, "Main");
        // N = 1 falls out of the switch, 2 continues the loop, 3 only
        // leaves the switch.
        assert_eq!(m.trace, ["seen", "seen", "done"]);
    }

    #[test]
    fn elif_chain_is_first_match_wins() {
        let units = compile_ok(
            "
            script Main {
                if (var(V) > 5) { big }
                elif (var(V) > 2) { medium }
                elif (var(V) > 0) { small }
                else { zero }
            }
            ",
        );
        for (value, expected) in [(9, "big"), (3, "medium"), (1, "small"), (0, "zero")] {
            let mut m = Machine::default();
            m.vars.insert("V".into(), value);
            m.run(&units, "Main");
            assert_eq!(m.trace, [expected]);
        }
    }

    #[test]
    fn implicit_texts_replace_literals() {
        let units = compile_ok(r#"script Main { msgbox("Hi", "There") }"#);
        assert_eq!(
            units,
            [
                Unit::Label {
                    name: "Main".into(),
                    scope: Scope::Global,
                },
                Unit::Command {
                    name: "msgbox".into(),
                    args: vec!["Text_0".into(), "Text_1".into()],
                },
                command("end"),
                text_block("Text_0", "Hi"),
                text_block("Text_1", "There"),
            ]
        );
    }

    fn text_block(name: &str, value: &str) -> Unit {
        Unit::Data(DataBlock {
            name: name.into(),
            scope: Scope::Local,
            payload: Payload::Text {
                value: value.into(),
                kind: None,
            },
        })
    }

    #[test]
    fn explicit_texts_come_before_implicit_ones() {
        let units = compile_ok(
            r#"
            script Main { msgbox("inline") }
            text Named { "named" }
            "#,
        );
        assert_eq!(
            &units[3..],
            [text_block("Named", "named"), text_block("Text_0", "inline")]
        );
    }

    #[test]
    fn labels_are_unique() {
        let body = "
            if (flag(A) == TRUE && flag(B) == TRUE) { a } elif (var(V) == 1 || var(W) == 2) { b }
            while (var(V) < 3) { do { c } while (flag(C) == TRUE) }
            switch (var(V)) { case 1: d default: e }
        ";
        let src = format!("script One {{ {body} {body} }} script Two {{ {body} }}");
        let mut session = Session::new();
        let mut units = compile(&src, &mut session).unwrap();
        units.extend(compile(&src.replace("One", "Three").replace("Two", "Four"), &mut session).unwrap());

        let mut seen = HashSet::new();
        for unit in &units {
            if let Unit::Label { name, .. } = unit {
                assert!(seen.insert(name.clone()), "duplicate label {name}");
            }
        }
        assert!(seen.len() > 40);
    }

    #[test]
    fn script_end_is_not_duplicated() {
        let units = compile_ok("script A { lock end } script B { goto(A) } script C {}");
        assert_eq!(
            units.iter().filter(|u| **u == command("end")).count(),
            2,
            "{units:#?}"
        );
    }

    #[test]
    fn mapscripts_promote_inline_scripts() {
        let units = compile_ok(
            "
            mapscripts Town {
                ON_FRAME [
                    VAR_A, 1 { setflag(F) }
                    VAR_A, 2: Other
                ]
                ON_LOAD: OnLoad
                ON_RESUME { lock }
            }
            ",
        );
        let row = |trigger: &str, target: &str| MapScriptRow {
            trigger: trigger.into(),
            target: target.into(),
        };
        assert_eq!(
            &units[..3],
            [
                Unit::Data(DataBlock {
                    name: "Town".into(),
                    scope: Scope::Global,
                    payload: Payload::MapScripts(vec![
                        row("ON_LOAD", "OnLoad"),
                        row("ON_RESUME", "Town_ON_RESUME"),
                        row("ON_FRAME", "Town_ON_FRAME"),
                    ]),
                }),
                Unit::Data(DataBlock {
                    name: "Town_ON_FRAME".into(),
                    scope: Scope::Local,
                    payload: Payload::MapScriptTable(vec![
                        TableRow {
                            condition: "VAR_A".into(),
                            value: "1".into(),
                            target: "Town_ON_FRAME_0".into(),
                        },
                        TableRow {
                            condition: "VAR_A".into(),
                            value: "2".into(),
                            target: "Other".into(),
                        },
                    ]),
                }),
                label("Town_ON_RESUME"),
            ]
        );
        assert!(units.contains(&label("Town_ON_FRAME_0")));
    }

    #[test]
    fn unresolved_jump_is_fatal() {
        let program = parse_program("script Main { while (var(V) == 1) { break } }");
        let error = emit(&program, &mut Session::new()).unwrap_err();
        assert_eq!(error.inner, Error::UnresolvedTarget("break"));
        assert_eq!(error.span.line, 1);
    }

    #[test]
    fn duplicate_text_is_fatal() {
        let src = "
            text Text_0 { \"explicit\" }
            script Main { msgbox(\"implicit\") }
        ";
        let errors = compile(src, &mut Session::new()).unwrap_err();
        assert_eq!(
            errors,
            [Diagnostic::Emitter(
                Span::new_of_length(18, 6, 2).wrap(Error::DuplicateText("Text_0".into()))
            )]
        );
    }

    fn duplicate_label(src: &str) -> Spanned<Error> {
        match &compile(src, &mut Session::new()).unwrap_err()[..] {
            [Diagnostic::Emitter(error)] => error.clone(),
            errors => panic!("expected one emitter error, got {errors:?}"),
        }
    }

    #[test]
    fn repeated_inline_trigger_is_fatal() {
        let error = duplicate_label(
            "
            mapscripts M {
                ON_LOAD { a }
                ON_LOAD { b }
            }
            ",
        );
        assert_eq!(error.inner, Error::DuplicateLabel("M_ON_LOAD".into()));
        assert_eq!(error.span.line, 4);
    }

    #[test]
    fn repeated_table_trigger_is_fatal() {
        let error = duplicate_label("mapscripts M { ON_FRAME [ A, 1: X ] ON_FRAME [ B, 2: Y ] }");
        assert_eq!(error.inner, Error::DuplicateLabel("M_ON_FRAME".into()));
    }

    #[test]
    fn script_named_like_generated_label_is_fatal() {
        let error = duplicate_label(
            "
            script A { if (flag(F) == TRUE) { x } }
            script A_1 { y }
            ",
        );
        assert_eq!(error.inner, Error::DuplicateLabel("A_1".into()));
        assert_eq!(error.span.line, 3);

        let error = duplicate_label(
            "
            script A_1 { y }
            script A { if (flag(F) == TRUE) { x } }
            ",
        );
        assert_eq!(error.inner, Error::DuplicateLabel("A_1".into()));
        assert_eq!(error.span.line, 3);
    }

    #[test]
    fn declarations_share_one_namespace() {
        let error = duplicate_label("script Walk { lock }\nmovement Walk { walk_up }");
        assert_eq!(error.inner, Error::DuplicateLabel("Walk".into()));
        assert_eq!(error.span.line, 2);

        let error = duplicate_label("script Text_0 { msgbox(\"hi\") }");
        assert_eq!(error.inner, Error::DuplicateLabel("Text_0".into()));
        assert_eq!(error.span, Span::new_of_length(23, 4, 1));
    }

    #[test]
    fn duplicate_default_produces_no_output() {
        let src = "script Main { switch (var(V)) { default: a default: b } }";
        let errors = compile(src, &mut Session::new()).unwrap_err();
        assert!(matches!(
            &errors[..],
            [Diagnostic::Parser(e)] if e.inner == crate::parser::Error::DuplicateDefaultCase
        ));
    }
}
