// program    ::= top*
// top        ::= script | raw | text | movement | mart | mapscripts
// scope      ::= '(' ('global' | 'local') ')'
// script     ::= 'script' scope? ID block
// raw        ::= ('raw' | 'rawglobal') RAWSTRING
// text       ::= 'text' scope? ID '{' ID? STRING+ '}'
// movement   ::= 'movement' scope? ID '{' (ID ['*' NUMBER] [','])* '}'
// mart       ::= 'mart' scope? ID '{' (ID [','])* '}'
// mapscripts ::= 'mapscripts' scope? ID '{' (entry | table)* '}'
// entry      ::= ID (':' ID | block)
// table      ::= ID '[' (tokens ',' tokens (':' ID | block))* ']'
// block      ::= '{' stmt* '}'
// stmt       ::= ID ['(' args ')'] [';']
//              | if '(' bool ')' block (elif '(' bool ')' block)* [else block]
//              | while '(' bool ')' block
//              | do block while '(' bool ')' [';']
//              | switch '(' var '(' tokens ')' ')' '{' (case tokens ':' stmt* | default ':' stmt*)* '}'
//              | break [';']
//              | continue [';']
//              | block
// bool       ::= term (('&&' | '||') term)*
// term       ::= '(' bool ')'
//              | flag '(' tokens ')' '==' (TRUE | FALSE)
//              | var '(' tokens ')' ('==' | '!=' | '<' | '<=' | '>' | '>=') tokens

use std::fmt;

use crate::token::Span;

#[derive(Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
    /// Implicit texts, in discovery order.
    pub texts: Vec<Text>,
}

/// An entry of the text pool.
#[derive(Debug, PartialEq)]
pub struct Text {
    pub name: Box<str>,
    pub value: Box<str>,
    pub kind: Option<Box<str>>,
    pub scope: Scope,
    /// The string literal the text was extracted from.
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Global,
    Local,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Local => f.write_str("local"),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Statement {
    Script(Script),
    Block(Block),
    Command(Command),
    Raw(Raw),
    Text(TextDecl),
    Movement(Movement),
    Mart(Mart),
    If(If),
    While(Loop),
    DoWhile(Loop),
    Break(Jump),
    Continue(Jump),
    Switch(Switch),
    MapScripts(MapScripts),
}

#[derive(Debug, PartialEq)]
pub struct Script {
    pub name: Ident,
    pub body: Block,
    pub scope: Scope,
}

#[derive(Debug, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    /// Span of the opening brace.
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct Command {
    pub name: Ident,
    /// Each argument is the flattened token sequence between two top-level
    /// commas, with inline strings already replaced by their text label.
    pub args: Vec<Box<str>>,
}

#[derive(Debug, PartialEq)]
pub struct Raw {
    pub value: Box<str>,
    pub scope: Scope,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct TextDecl {
    pub name: Ident,
    pub value: Box<str>,
    pub kind: Option<Box<str>>,
    pub scope: Scope,
}

#[derive(Debug, PartialEq)]
pub struct Movement {
    pub name: Ident,
    /// Steps with any `* N` repetition already expanded.
    pub steps: Vec<Box<str>>,
    pub scope: Scope,
}

#[derive(Debug, PartialEq)]
pub struct Mart {
    pub name: Ident,
    pub items: Vec<Box<str>>,
    pub scope: Scope,
}

#[derive(Debug, PartialEq)]
pub struct If {
    pub consequence: Condition,
    /// Evaluated in order after `consequence`; the first match wins.
    pub elifs: Vec<Condition>,
    pub alternative: Option<Block>,
    pub span: Span,
}

/// A boolean expression along with the block to run when it holds.
#[derive(Debug, PartialEq)]
pub struct Condition {
    pub expr: BoolExpr,
    pub body: Block,
}

#[derive(Debug, PartialEq)]
pub enum BoolExpr {
    Binary {
        lhs: Box<BoolExpr>,
        op: LogicalOperator,
        rhs: Box<BoolExpr>,
    },
    Operator(Operator),
}

impl fmt::Display for BoolExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolExpr::Binary { lhs, op, rhs } => write!(f, "({lhs}) {op} ({rhs})"),
            BoolExpr::Operator(operator) => operator.fmt(f),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("&&"),
            LogicalOperator::Or => f.write_str("||"),
        }
    }
}

/// A leaf test, such as `flag(FLAG_X) == TRUE` or `var(VAR_Y) >= 3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operator {
    pub kind: OperatorKind,
    pub operand: Box<str>,
    pub comparator: Comparator,
    pub value: Box<str>,
}

impl Operator {
    /// The operator which holds exactly when `self` doesn't.
    pub fn negated(&self) -> Operator {
        let (comparator, value) = match self.kind {
            OperatorKind::Flag => {
                let value = if &*self.value == FLAG_TRUE {
                    FLAG_FALSE
                } else {
                    FLAG_TRUE
                };
                (self.comparator, value.into())
            }
            OperatorKind::Var => (self.comparator.negated(), self.value.clone()),
        };
        Operator {
            kind: self.kind,
            operand: self.operand.clone(),
            comparator,
            value,
        }
    }
}

pub const FLAG_TRUE: &str = "TRUE";
pub const FLAG_FALSE: &str = "FALSE";

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Operator {
            kind,
            operand,
            comparator,
            value,
        } = self;
        write!(f, "{kind}({operand}) {comparator} {value}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperatorKind {
    Flag,
    Var,
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorKind::Flag => f.write_str("flag"),
            OperatorKind::Var => f.write_str("var"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    pub fn negated(self) -> Comparator {
        match self {
            Comparator::Eq => Comparator::Ne,
            Comparator::Ne => Comparator::Eq,
            Comparator::Lt => Comparator::Ge,
            Comparator::Le => Comparator::Gt,
            Comparator::Gt => Comparator::Le,
            Comparator::Ge => Comparator::Lt,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        };
        f.write_str(s)
    }
}

/// Identifies a loop or switch, so that `break` and `continue` can refer to
/// their target without holding a reference into the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstructId(pub u32);

impl fmt::Display for ConstructId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Either a `while` or a `do ... while`.
#[derive(Debug, PartialEq)]
pub struct Loop {
    pub id: ConstructId,
    pub condition: Condition,
    pub span: Span,
}

/// A `break` or `continue`. The target is filled in by the resolver.
#[derive(Debug, PartialEq)]
pub struct Jump {
    pub target: Option<ConstructId>,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct Switch {
    pub id: ConstructId,
    pub operand: Box<str>,
    /// Cases in declaration order; at most one of them is the default.
    pub cases: Vec<Case>,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct Case {
    pub label: CaseLabel,
    pub body: Block,
}

impl Case {
    pub fn is_default(&self) -> bool {
        self.label == CaseLabel::Default
    }
}

#[derive(Debug, PartialEq)]
pub enum CaseLabel {
    Value(Box<str>),
    Default,
}

#[derive(Debug, PartialEq)]
pub struct MapScripts {
    pub name: Ident,
    pub entries: Vec<MapScriptEntry>,
    pub tables: Vec<MapScriptTable>,
    pub scope: Scope,
}

#[derive(Debug, PartialEq)]
pub struct MapScriptEntry {
    pub trigger: Ident,
    pub target: MapScriptTarget,
}

#[derive(Debug, PartialEq)]
pub struct MapScriptTable {
    pub trigger: Ident,
    pub entries: Vec<TableEntry>,
}

/// One row of a map script table. The row matches when `condition` equals
/// `value`.
#[derive(Debug, PartialEq)]
pub struct TableEntry {
    pub condition: Box<str>,
    pub value: Box<str>,
    pub target: MapScriptTarget,
}

#[derive(Debug, PartialEq)]
pub enum MapScriptTarget {
    Symbol(Ident),
    /// An inline script body, promoted to a generated script on emission.
    Inline(Block),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: Box<str>,
    pub span: Span,
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
