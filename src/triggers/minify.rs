//! Comment and whitespace stripping for JavaScript, following Crockford's
//! JSMin. String, template and regular expression literals pass through
//! untouched; a line break survives only where dropping it could change
//! how the script parses.

use std::str::Chars;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinifyError {
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated set in regular expression literal")]
    UnterminatedRegexSet,
    #[error("unterminated regular expression literal")]
    UnterminatedRegex,
}

pub fn minify(source: &str) -> Result<String, MinifyError> {
    let mut min = JsMin {
        chars: source.chars(),
        lookahead: None,
        out: String::with_capacity(source.len()),
        a: None,
        b: None,
        x: None,
        y: None,
    };
    min.run()?;
    Ok(min.out.trim_matches('\n').to_string())
}

fn is_alphanum(c: Option<char>) -> bool {
    match c {
        Some(c) => c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '\\') || c as u32 > 126,
        None => false,
    }
}

/// Characters after which a `/` starts a regular expression, not a division.
fn precedes_regex(c: Option<char>) -> bool {
    matches!(
        c,
        Some('(' | ',' | '=' | ':' | '[' | '!' | '&' | '|' | '?' | '+' | '-' | '~' | '*' | '/' | '{' | '}' | ';' | '\n')
    )
}

/// Keywords after which a `/` starts a regular expression.
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "instanceof", "new", "delete", "void", "throw",
];

fn normalize(c: char) -> char {
    match c {
        '\r' => '\n',
        c if c >= ' ' || c == '\n' => c,
        _ => ' ',
    }
}

enum Step {
    /// Emit `a`, then shift `b` into `a`.
    Output,
    /// Drop `a`, shift `b` into `a`.
    Shift,
    /// Drop `b`.
    Advance,
}

struct JsMin<'a> {
    chars: Chars<'a>,
    lookahead: Option<char>,
    out: String,
    a: Option<char>,
    b: Option<char>,
    // Last two characters handed out by `next`, used to keep `a + +b` apart.
    x: Option<char>,
    y: Option<char>,
}

impl JsMin<'_> {
    /// Next character exactly as written, for literal contents.
    fn get_raw(&mut self) -> Option<char> {
        self.lookahead.take().or_else(|| self.chars.next())
    }

    /// Next character with carriage returns turned into newlines and other
    /// control characters into spaces.
    fn get(&mut self) -> Option<char> {
        self.get_raw().map(normalize)
    }

    fn peek(&mut self) -> Option<char> {
        if self.lookahead.is_none() {
            self.lookahead = self.chars.next();
        }
        self.lookahead.map(normalize)
    }

    fn put(&mut self, c: Option<char>) {
        if let Some(c) = c {
            self.out.push(c);
        }
    }

    /// Next meaningful character, with comments collapsed.
    fn next(&mut self) -> Result<Option<char>, MinifyError> {
        let mut c = self.get();
        if c == Some('/') {
            match self.peek() {
                Some('/') => loop {
                    c = self.get();
                    if matches!(c, None | Some('\n')) {
                        break;
                    }
                },
                Some('*') => {
                    self.get();
                    while c != Some(' ') {
                        match self.get() {
                            Some('*') => {
                                if self.peek() == Some('/') {
                                    self.get();
                                    c = Some(' ');
                                }
                            }
                            None => return Err(MinifyError::UnterminatedComment),
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        self.y = self.x;
        self.x = c;
        Ok(c)
    }

    fn action(&mut self, step: Step) -> Result<(), MinifyError> {
        if let Step::Output = step {
            self.put(self.a);
            if matches!(self.y, Some('\n' | ' '))
                && matches!(self.a, Some('+' | '-' | '*' | '/'))
                && self.b == self.a
            {
                self.put(self.y);
            }
        }

        if let Step::Output | Step::Shift = step {
            self.a = self.b;
            match self.a {
                Some('`') => {
                    self.put(self.a);
                    self.copy_template_body()?;
                }
                Some(quote @ ('\'' | '"')) => {
                    self.put(self.a);
                    loop {
                        let c = self.get_raw().ok_or(MinifyError::UnterminatedString)?;
                        if c == quote {
                            break;
                        }
                        self.out.push(c);
                        if c == '\\' {
                            let escaped = self.get_raw().ok_or(MinifyError::UnterminatedString)?;
                            self.out.push(escaped);
                        }
                    }
                }
                _ => {}
            }
        }

        self.b = self.next()?;
        if self.b == Some('/') && (precedes_regex(self.a) || self.follows_regex_keyword()) {
            self.put(self.a);
            if matches!(self.a, Some('/' | '*')) {
                self.put(Some(' '));
            }
            self.put(self.b);
            loop {
                self.a = self.get();
                match self.a {
                    Some('[') => loop {
                        self.put(self.a);
                        self.a = self.get();
                        if self.a == Some(']') {
                            break;
                        }
                        if self.a == Some('\\') {
                            self.put(self.a);
                            self.a = self.get();
                        }
                        if self.a.is_none() {
                            return Err(MinifyError::UnterminatedRegexSet);
                        }
                    },
                    Some('/') => {
                        if matches!(self.peek(), Some('/' | '*')) {
                            return Err(MinifyError::UnterminatedRegexSet);
                        }
                        break;
                    }
                    Some('\\') => {
                        self.put(self.a);
                        self.a = self.get();
                    }
                    _ => {}
                }
                if self.a.is_none() {
                    return Err(MinifyError::UnterminatedRegex);
                }
                self.put(self.a);
            }
            self.b = self.next()?;
        }
        Ok(())
    }

    /// True when `a` ends (or directly follows) a keyword that can be
    /// followed by a regular expression, as in `return /x/`.
    fn follows_regex_keyword(&self) -> bool {
        let mut word: Vec<char> = match self.a {
            Some(c) if is_alphanum(Some(c)) => vec![c],
            Some(' ' | '\n') => Vec::new(),
            _ => return false,
        };
        word.extend(self.out.chars().rev().take_while(|c| is_alphanum(Some(*c))));
        let word: String = word.into_iter().rev().collect();
        REGEX_KEYWORDS.contains(&word.as_str())
    }

    /// Copies a template literal up to, not including, its closing backtick.
    /// Substitutions are copied as written, nested templates included.
    fn copy_template_body(&mut self) -> Result<(), MinifyError> {
        loop {
            match self.get_raw() {
                None => return Err(MinifyError::UnterminatedString),
                Some('`') => return Ok(()),
                Some('\\') => {
                    self.out.push('\\');
                    let escaped = self.get_raw().ok_or(MinifyError::UnterminatedString)?;
                    self.out.push(escaped);
                }
                Some('$') if self.peek() == Some('{') => {
                    self.get_raw();
                    self.out.push_str("${");
                    self.copy_substitution()?;
                }
                Some(c) => self.out.push(c),
            }
        }
    }

    /// Copies the inside of `${...}` through its matching `}`.
    fn copy_substitution(&mut self) -> Result<(), MinifyError> {
        let mut depth = 0usize;
        loop {
            let c = self.get_raw().ok_or(MinifyError::UnterminatedString)?;
            self.out.push(c);
            match c {
                '{' => depth += 1,
                '}' if depth == 0 => return Ok(()),
                '}' => depth -= 1,
                '`' => {
                    self.copy_template_body()?;
                    self.out.push('`');
                }
                '\'' | '"' => loop {
                    let inner = self.get_raw().ok_or(MinifyError::UnterminatedString)?;
                    self.out.push(inner);
                    if inner == c {
                        break;
                    }
                    if inner == '\\' {
                        let escaped = self.get_raw().ok_or(MinifyError::UnterminatedString)?;
                        self.out.push(escaped);
                    }
                },
                _ => {}
            }
        }
    }

    fn run(&mut self) -> Result<(), MinifyError> {
        if self.peek() == Some('\u{feff}') {
            self.get();
        }
        self.a = Some('\n');
        self.action(Step::Advance)?;

        while self.a.is_some() {
            let step = match (self.a, self.b) {
                (Some(' '), b) => {
                    if is_alphanum(b) {
                        Step::Output
                    } else {
                        Step::Shift
                    }
                }
                (Some('\n'), Some('{' | '[' | '(' | '+' | '-' | '!' | '~')) => Step::Output,
                (Some('\n'), Some(' ')) => Step::Advance,
                (Some('\n'), b) => {
                    if is_alphanum(b) {
                        Step::Output
                    } else {
                        Step::Shift
                    }
                }
                (a, Some(' ')) => {
                    if is_alphanum(a) {
                        Step::Output
                    } else {
                        Step::Advance
                    }
                }
                (Some('}' | ']' | ')' | '+' | '-' | '"' | '\'' | '`'), Some('\n')) => Step::Output,
                (a, Some('\n')) => {
                    if is_alphanum(a) {
                        Step::Output
                    } else {
                        Step::Advance
                    }
                }
                _ => Step::Output,
            };
            self.action(step)?;
        }
        Ok(())
    }
}
