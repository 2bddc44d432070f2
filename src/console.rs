// 🖥️ Console Resolver - Ask a human about ambiguous pairs
//
// Generic over the reader/writer so the prompt can be driven from tests.

use crate::account::Account;
use crate::policy::{MergeResolver, Verdict};
use std::io::{self, BufRead, Write};
use tracing::warn;

pub const PROMPT: &str =
    "Press y to merge, p1 if account 1 is parent and p2 if account 2 is parent or any other key to keep accounts separate.";

pub struct ConsoleResolver<R, W> {
    input: R,
    output: W,
}

impl ConsoleResolver<io::StdinLock<'static>, io::Stdout> {
    /// Resolver bound to the process stdin/stdout
    pub fn stdio() -> Self {
        ConsoleResolver::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsoleResolver { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn prompt(&mut self, left: &Account, right: &Account) -> io::Result<String> {
        writeln!(self.output, "{}", PROMPT)?;
        writeln!(self.output, "Account 1:")?;
        writeln!(self.output, "{}", left.describe())?;
        writeln!(self.output, "Account 2:")?;
        writeln!(self.output, "{}", right.describe())?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line)
    }
}

impl<R: BufRead, W: Write> MergeResolver for ConsoleResolver<R, W> {
    fn resolve(&mut self, left: &Account, right: &Account) -> Verdict {
        match self.prompt(left, right) {
            Ok(line) => Verdict::from_input(&line),
            Err(e) => {
                warn!(error = %e, "console prompt failed, keeping accounts separate");
                Verdict::NoMatch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn resolve_with(input: &str) -> (Verdict, String) {
        let left = Account::new().with_name("Blue River Media");
        let right = Account::new().with_name("Blue River Digital Group");

        let mut resolver = ConsoleResolver::new(Cursor::new(input.to_string()), Vec::new());
        let verdict = resolver.resolve(&left, &right);
        let shown = String::from_utf8(resolver.into_output()).unwrap();
        (verdict, shown)
    }

    #[test]
    fn test_inputs_map_to_verdicts() {
        assert_eq!(resolve_with("y\n").0, Verdict::Merge);
        assert_eq!(resolve_with("p1\n").0, Verdict::LeftIsParentOfRight);
        assert_eq!(resolve_with("p2\r\n").0, Verdict::RightIsParentOfLeft);
        assert_eq!(resolve_with("no\n").0, Verdict::NoMatch);
    }

    #[test]
    fn test_eof_is_no_match() {
        assert_eq!(resolve_with("").0, Verdict::NoMatch);
    }

    #[test]
    fn test_prompt_shows_both_accounts() {
        let (_, shown) = resolve_with("y\n");

        assert!(shown.starts_with(PROMPT));
        assert!(shown.contains("Account 1:\nId "));
        assert!(shown.contains("Name Blue River Media\n"));
        assert!(shown.contains("Name Blue River Digital Group\n"));
    }

    #[test]
    fn test_answers_consumed_in_order() {
        let a = Account::new().with_name("A");
        let b = Account::new().with_name("B");
        let mut resolver = ConsoleResolver::new(Cursor::new("p1\ny\n".to_string()), io::sink());

        assert_eq!(resolver.resolve(&a, &b), Verdict::LeftIsParentOfRight);
        assert_eq!(resolver.resolve(&a, &b), Verdict::Merge);
        assert_eq!(resolver.resolve(&a, &b), Verdict::NoMatch);
    }
}
