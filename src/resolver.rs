use log::debug;

use crate::{
    ast::{Block, ConstructId, Jump, MapScriptTarget, Program, Statement},
    token::Spanned,
};

/// Binds every `break` to its innermost enclosing loop or switch, and every
/// `continue` to its innermost enclosing loop.
///
/// The tree is only annotated; no node is added, removed or reordered.
pub fn resolve(program: &mut Program) -> Result<(), Vec<Spanned<Error>>> {
    let mut resolver = Resolver::default();
    for statement in &mut program.statements {
        resolver.statement(statement);
    }
    debug!("resolved {} jumps", resolver.bound);

    if resolver.errors.is_empty() {
        Ok(())
    } else {
        Err(resolver.errors)
    }
}

#[derive(Default)]
struct Resolver {
    breakable: Vec<ConstructId>,
    continuable: Vec<ConstructId>,
    errors: Vec<Spanned<Error>>,
    bound: usize,
}

impl Resolver {
    fn block(&mut self, block: &mut Block) {
        for statement in &mut block.statements {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &mut Statement) {
        match statement {
            Statement::Script(script) => self.block(&mut script.body),
            Statement::Block(block) => self.block(block),
            Statement::If(stmt) => {
                self.block(&mut stmt.consequence.body);
                for elif in &mut stmt.elifs {
                    self.block(&mut elif.body);
                }
                if let Some(alternative) = &mut stmt.alternative {
                    self.block(alternative);
                }
            }
            Statement::While(stmt) | Statement::DoWhile(stmt) => {
                self.breakable.push(stmt.id);
                self.continuable.push(stmt.id);
                self.block(&mut stmt.condition.body);
                self.continuable.pop();
                self.breakable.pop();
            }
            Statement::Switch(stmt) => {
                self.breakable.push(stmt.id);
                for case in &mut stmt.cases {
                    self.block(&mut case.body);
                }
                self.breakable.pop();
            }
            Statement::Break(jump) => {
                let target = self.breakable.last().copied();
                self.bind(jump, target, Error::UnboundBreak);
            }
            Statement::Continue(jump) => {
                let target = self.continuable.last().copied();
                self.bind(jump, target, Error::UnboundContinue);
            }
            Statement::MapScripts(mapscripts) => {
                let entries = mapscripts.entries.iter_mut().map(|e| &mut e.target);
                let rows = mapscripts.tables.iter_mut().flat_map(|t| &mut t.entries);
                for target in entries.chain(rows.map(|e| &mut e.target)) {
                    if let MapScriptTarget::Inline(body) = target {
                        self.block(body);
                    }
                }
            }
            Statement::Command(_)
            | Statement::Raw(_)
            | Statement::Text(_)
            | Statement::Movement(_)
            | Statement::Mart(_) => (),
        }
    }

    fn bind(&mut self, jump: &mut Jump, target: Option<ConstructId>, error: Error) {
        match target {
            Some(id) => {
                jump.target = Some(id);
                self.bound += 1;
            }
            None => self.errors.push(jump.span.wrap(error)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("`break` must be used inside a loop or switch")]
    UnboundBreak,
    #[error("`continue` must be used inside a loop")]
    UnboundContinue,
}
