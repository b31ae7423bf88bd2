//! A compiler for a small structured scripting language. Scripts with `if`,
//! `while`, `switch` and friends are lowered into flat, label-and-jump
//! command sequences for an interpreter that has no structured control flow.
//!
//! The pipeline is [`lexer`] → [`parser`] → [`resolver`] → [`emitter`], and
//! [`writer`] renders the emitted units as assembly source.

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The resolver binds each `break` and `continue` to its target construct.
pub mod resolver;

/// The emitter lowers a resolved AST into a flat sequence of output units.
pub mod emitter;

/// The writer renders output units as assembly text.
pub mod writer;

pub mod ast;
pub mod session;
pub mod token;

pub mod util {
    pub mod fmt;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

pub use session::Session;

use crate::{ast::Program, emitter::Unit, token::Spanned};

/// Any error found while compiling, tagged with its source position.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error(transparent)]
    Parser(#[from] Spanned<parser::Error>),
    #[error(transparent)]
    Resolver(#[from] Spanned<resolver::Error>),
    #[error(transparent)]
    Emitter(#[from] Spanned<emitter::Error>),
}

/// Parses and resolves the provided source.
pub fn parse(src: &str, session: &mut Session) -> Result<Program, Vec<Diagnostic>> {
    let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
    let mut program = parser::parse_program(src, &mut tokens, session).map_err(diagnostics)?;
    resolver::resolve(&mut program).map_err(diagnostics)?;
    Ok(program)
}

/// Compiles the provided source into output units.
///
/// Either every unit is returned, or none is and the diagnostics explain
/// why.
pub fn compile(src: &str, session: &mut Session) -> Result<Vec<Unit>, Vec<Diagnostic>> {
    let program = parse(src, session)?;
    emitter::emit(&program, session).map_err(|error| vec![error.into()])
}

/// Renders each diagnostic as a `line N: message` string.
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(ToString::to_string).collect()
}

fn diagnostics<E: Into<Diagnostic>>(errors: Vec<E>) -> Vec<Diagnostic> {
    errors.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::{DataBlock, Unit};

    #[test]
    fn demo_compiles() {
        let units = compile(include_str!("../demos/town.flow"), &mut Session::new()).unwrap();
        let names: Vec<_> = (units.iter())
            .filter_map(|unit| match unit {
                Unit::Data(DataBlock { name, .. }) => Some(&**name),
                _ => None,
            })
            .collect();
        assert_eq!(
            names,
            [
                "Town_MapScripts",
                "Town_MapScripts_MAP_SCRIPT_ON_FRAME_TABLE",
                "Town_Movement_StepBack",
                "Town_Mart",
                "Town_Text_WouldYouLikeToRest",
                "Town_Text_Welcome",
                "Text_0",
                "Text_1",
                "Text_2",
                "Text_3",
                "Text_4",
            ]
        );
    }

    #[test]
    fn diagnostics_are_line_numbered() {
        let src = "script A {\n  break\n}\nscript B {\n  continue\n}\n";
        let errors = compile(src, &mut Session::new()).unwrap_err();
        assert_eq!(
            format_diagnostics(&errors),
            [
                "line 2: `break` must be used inside a loop or switch",
                "line 5: `continue` must be used inside a loop",
            ]
        );
    }

    #[test]
    fn shared_session_keeps_names_unique() {
        let src = r#"script S { msgbox("x") if (flag(F) == TRUE) { a } }"#;
        let mut session = Session::new();
        let first = compile(src, &mut session).unwrap();
        let second = compile(&src.replace('S', "T"), &mut session).unwrap();
        let branches_to = |units: &[Unit], label: &str| {
            (units.iter()).any(|u| matches!(u, Unit::Branch { target, .. } if &**target == label))
        };
        assert!(branches_to(&first, "S_1"));
        assert!(branches_to(&second, "T_2"));
        assert!(second.iter().any(
            |u| matches!(u, Unit::Data(DataBlock { name, .. }) if &**name == "Text_1")
        ));
    }
}
