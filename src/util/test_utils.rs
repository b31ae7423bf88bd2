use crate::{
    compile, diagnostics, format_diagnostics, lexer, parser, resolver,
    session::Session,
    util::fmt::tree,
    writer, Diagnostic,
};

/// Each variant contains the input.
pub enum Test {
    Parser(&'static str),
    Resolver(&'static str),
    Compiler(&'static str),
}

pub enum Assertion {
    TreeOk(&'static str),
    OutputOk(&'static str),
    ExpectedErrors(&'static [&'static str]),
}

#[track_caller]
pub fn run_pipeline(test: Test) -> (String, Vec<String>) {
    let tokens_buf = &mut Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);
    let session = &mut Session::new();

    let result: Result<String, Vec<Diagnostic>> = match test {
        Test::Parser(input) => parser::parse_program(input, tokens_buf, session)
            .map(|prog| tree::print_program_string(&prog))
            .map_err(diagnostics),
        Test::Resolver(input) => parser::parse_program(input, tokens_buf, session)
            .map_err(diagnostics)
            .and_then(|mut prog| {
                resolver::resolve(&mut prog).map_err(diagnostics)?;
                Ok(tree::print_program_string(&prog))
            }),
        Test::Compiler(input) => compile(input, session).map(|units| {
            let mut buf = Vec::with_capacity(1024);
            writer::write_units(&mut buf, &units).unwrap();
            String::from_utf8(buf).unwrap()
        }),
    };

    match result {
        Ok(output) => (output, vec![]),
        Err(diagnostics) => (String::new(), format_diagnostics(&diagnostics)),
    }
}

#[track_caller]
pub fn run_assertion(
    assertion: Assertion,
    formatted_actual_output: &str,
    formatted_actual_errors: &[String],
) {
    match assertion {
        Assertion::TreeOk(expected) | Assertion::OutputOk(expected) => {
            let expected_errors: &[&str] = &[];
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors);
            ::pretty_assertions::assert_eq!(formatted_actual_output.trim(), expected.trim());
        }
        Assertion::ExpectedErrors(expected_errors) => {
            ::pretty_assertions::assert_eq!(formatted_actual_errors, expected_errors)
        }
    }
}

macro_rules! tree_tests {
    (
        use $test_kind:ident;

        $(
            fn $test_name:ident() {
                let program = $source:expr;
                $($assertions_tt:tt)*
            }
        )*
    ) => {
        $(
            #[test]
            fn $test_name() {
                let test: crate::util::test_utils::Test =
                    tree_tests!(@@get_test($test_kind), $source);
                let (formatted_actual_output, formatted_actual_errors) =
                    crate::util::test_utils::run_pipeline(test);
                let ctx = (&formatted_actual_output, &formatted_actual_errors);
                tree_tests!(@@expand_assertions, ctx, [$($assertions_tt)*]);
            }
        )*
    };

    (@@expand_assertions, $ctx:expr, []) => {};
    (@@expand_assertions, $ctx:expr, [
        let $assertion:ident = $assertion_expected:expr;
        $($rest_assertions_tt:tt)*
    ]) => {
        crate::util::test_utils::run_assertion(
            tree_tests!(@@assertion, $assertion, $assertion_expected),
            $ctx.0,
            $ctx.1,
        );
        tree_tests!(@@expand_assertions, $ctx, [$($rest_assertions_tt)*]);
    };

    (@@assertion, tree_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::TreeOk(::indoc::indoc! { $expected })
    };
    (@@assertion, output_ok, $expected:expr) => {
        crate::util::test_utils::Assertion::OutputOk(::indoc::indoc! { $expected })
    };
    (@@assertion, expected_errors, $expected:expr) => {
        crate::util::test_utils::Assertion::ExpectedErrors($expected)
    };

    (@@get_test(parser), $source:expr) => {
        crate::util::test_utils::Test::Parser($source)
    };
    (@@get_test(resolver), $source:expr) => {
        crate::util::test_utils::Test::Resolver($source)
    };
    (@@get_test(compiler), $source:expr) => {
        crate::util::test_utils::Test::Compiler($source)
    };
}
pub(crate) use tree_tests;
