//! Target-language grammars used to check generated code.

use rustpython_parser::{ast, lexer, Mode, Parse, Tok};

use super::Diagnostic;

/// A language whose full grammar generated code must parse against.
pub trait Grammar: Send + Sync {
    fn name(&self) -> &str;

    /// Parse the whole document; report the first error location on failure.
    fn check(&self, source: &str) -> Result<(), Diagnostic>;
}

/// Python 3 module grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonGrammar;

impl Grammar for PythonGrammar {
    fn name(&self) -> &str {
        "python"
    }

    fn check(&self, source: &str) -> Result<(), Diagnostic> {
        ast::Suite::parse(source, "<generated>")
            .map(|_| ())
            .map_err(|err| {
                let offset = u32::from(err.offset) as usize;
                match unclosed_bracket(source, offset) {
                    Some((bracket, at)) => {
                        Diagnostic::at_offset(source, at, format!("'{bracket}' was never closed"))
                    }
                    None => Diagnostic::at_offset(source, offset, err.error.to_string()),
                }
            })
    }
}

/// Innermost bracket opened before `error_offset` that is never closed.
///
/// The parser gives up on the statement after such a bracket, so its own
/// error location is a line or more past the real mistake.
fn unclosed_bracket(source: &str, error_offset: usize) -> Option<(char, usize)> {
    let mut open: Vec<(char, usize)> = Vec::new();

    for result in lexer::lex(source, Mode::Module) {
        let Ok((tok, range)) = result else { break };
        let start = u32::from(range.start()) as usize;

        let closes = match tok {
            Tok::Lpar => {
                open.push(('(', start));
                continue;
            }
            Tok::Lsqb => {
                open.push(('[', start));
                continue;
            }
            Tok::Lbrace => {
                open.push(('{', start));
                continue;
            }
            Tok::Rpar => '(',
            Tok::Rsqb => '[',
            Tok::Rbrace => '{',
            _ => continue,
        };

        if open.last().is_some_and(|(bracket, _)| *bracket == closes) {
            open.pop();
        }
    }

    open.into_iter().rev().find(|(_, at)| *at < error_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_accepts_pytest_module() {
        let source = "import pytest\n\n\n@pytest.mark.parametrize(\"a,b\", [(1, 2)])\ndef test_add(a, b):\n    assert a + b == 3\n";
        assert!(PythonGrammar.check(source).is_ok());
    }

    #[test]
    fn test_python_reports_offending_line() {
        let source = "import pytest\n\n\ndef test_ok():\n    assert True\n\n\ndef test_broken(:\n    pass\n";
        let diagnostic = PythonGrammar.check(source).unwrap_err();
        assert_eq!(diagnostic.line, 8);
        assert!(diagnostic.column > 1);
    }

    #[test]
    fn test_python_rejects_unclosed_call() {
        let source = "def test_sum():\n    assert sum([1, 2] == 3\n";
        let diagnostic = PythonGrammar.check(source).unwrap_err();
        assert_eq!(diagnostic.line, 2);
    }

    #[test]
    fn test_python_unclosed_bracket_before_next_statement() {
        let source = "def test_sum():\n    assert sum([1, 2] == 3\n\ndef test_b():\n    pass\n";
        let diagnostic = PythonGrammar.check(source).unwrap_err();
        assert_eq!(diagnostic.line, 2);
        assert_eq!(diagnostic.column, 15);
        assert_eq!(diagnostic.message, "'(' was never closed");
    }

    #[test]
    fn test_python_closed_brackets_keep_parser_location() {
        let source = "x = [1, 2]\ny = (3,\n     4)\nz = = 5\n";
        let diagnostic = PythonGrammar.check(source).unwrap_err();
        assert_eq!(diagnostic.line, 4);
    }
}
