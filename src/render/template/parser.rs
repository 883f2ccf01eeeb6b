//! Template parsing.
//!
//! Syntax:
//! - `$name$`, `$item.source.title$`: interpolation
//! - `$if(x)$ ... $elseif(y)$ ... $else$ ... $endif$`
//! - `$for(items)$ ... $sep$ ... $endfor$`
//! - `$-- comment` up to and including the end of the line
//! - `$$`: a literal dollar sign
//!
//! A control directive that is alone on its line removes the whole line,
//! including the line break, from the output.

use super::{TemplateError, TemplateResult};

/// Reference to a (possibly nested) variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    pub path: Vec<String>,
    pub line: usize,
}

impl VariableRef {
    /// Name bound inside `$for$` bodies
    pub fn binding(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn root(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or_default()
    }

    pub fn rest(&self) -> Vec<&str> {
        self.path.iter().skip(1).map(String::as_str).collect()
    }
}

/// Parsed template tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Literal(String),
    Variable(VariableRef),
    Conditional {
        branches: Vec<(VariableRef, Vec<Node>)>,
        else_branch: Option<Vec<Node>>,
    },
    ForLoop {
        var: VariableRef,
        body: Vec<Node>,
        separator: Option<Vec<Node>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Control {
    If(VariableRef),
    ElseIf(VariableRef),
    Else,
    EndIf,
    For(VariableRef),
    Sep,
    EndFor,
}

impl Control {
    fn directive(&self) -> &'static str {
        match self {
            Control::If(_) => "$if()$",
            Control::ElseIf(_) => "$elseif()$",
            Control::Else => "$else$",
            Control::EndIf => "$endif$",
            Control::For(_) => "$for()$",
            Control::Sep => "$sep$",
            Control::EndFor => "$endfor$",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Var(VariableRef),
    Control(Control, usize),
}

/// Parse template source into nodes
pub fn parse(source: &str) -> TemplateResult<Vec<Node>> {
    let mut tokens = tokenize(source)?;
    strip_standalone_lines(&mut tokens);

    let mut parser = Parser {
        tokens: tokens.into_iter(),
    };
    let (nodes, end) = parser.block()?;
    match end {
        None => Ok(nodes),
        Some((control, line)) => Err(parse_error(
            line,
            format!("unexpected {}", control.directive()),
        )),
    }
}

fn tokenize(source: &str) -> TemplateResult<Vec<Token>> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    while let Some(offset) = source[pos..].find('$') {
        let start = pos + offset;
        text.push_str(&source[pos..start]);
        let rest = &source[start + 1..];

        if rest.starts_with('$') {
            text.push('$');
            pos = start + 2;
            continue;
        }

        if rest.starts_with("--") {
            pos = match rest.find('\n') {
                Some(nl) => start + 1 + nl + 1,
                None => source.len(),
            };
            continue;
        }

        let line = line_at(source, start);
        let end = rest
            .find(|c: char| c == '$' || c == '\n')
            .filter(|&i| rest[i..].starts_with('$'))
            .ok_or_else(|| parse_error(line, "unclosed '$'".to_string()))?;

        if !text.is_empty() {
            tokens.push(Token::Text(std::mem::take(&mut text)));
        }
        tokens.push(directive(&rest[..end], line)?);
        pos = start + 1 + end + 1;
    }

    text.push_str(&source[pos..]);
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    Ok(tokens)
}

fn directive(content: &str, line: usize) -> TemplateResult<Token> {
    let control = match content {
        "else" => Control::Else,
        "endif" => Control::EndIf,
        "sep" => Control::Sep,
        "endfor" => Control::EndFor,
        _ => {
            if let Some(arg) = call_argument(content, "if") {
                Control::If(variable(arg, line)?)
            } else if let Some(arg) = call_argument(content, "elseif") {
                Control::ElseIf(variable(arg, line)?)
            } else if let Some(arg) = call_argument(content, "for") {
                Control::For(variable(arg, line)?)
            } else {
                return Ok(Token::Var(variable(content, line)?));
            }
        }
    };
    Ok(Token::Control(control, line))
}

fn call_argument<'a>(content: &'a str, name: &str) -> Option<&'a str> {
    content
        .strip_prefix(name)?
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn variable(name: &str, line: usize) -> TemplateResult<VariableRef> {
    let valid_segment = |s: &str| {
        !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    };
    if !name.split('.').all(valid_segment) {
        return Err(parse_error(line, format!("invalid variable name '{}'", name)));
    }
    Ok(VariableRef {
        path: name.split('.').map(str::to_string).collect(),
        line,
    })
}

/// Remove lines that only hold a control directive
fn strip_standalone_lines(tokens: &mut [Token]) {
    let last = tokens.len().saturating_sub(1);
    let mut cuts: Vec<(usize, Cut)> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if !matches!(token, Token::Control(..)) {
            continue;
        }

        let starts_line = match i.checked_sub(1).map(|p| &tokens[p]) {
            None => true,
            Some(Token::Text(before)) => {
                let tail = before.rsplit('\n').next().unwrap_or_default();
                is_blank(tail) && (before.contains('\n') || i == 1)
            }
            Some(_) => false,
        };
        let ends_line = match tokens.get(i + 1) {
            None => true,
            Some(Token::Text(after)) => {
                let head = after.split('\n').next().unwrap_or_default();
                is_blank(head) && (after.contains('\n') || i + 1 == last)
            }
            Some(_) => false,
        };

        if starts_line && ends_line {
            if i > 0 {
                cuts.push((i - 1, Cut::Tail));
            }
            if i < last {
                cuts.push((i + 1, Cut::Head));
            }
        }
    }

    // Cut positions refer to the original text, so compute them all first
    let mut ranges: Vec<Option<(usize, usize)>> = vec![None; tokens.len()];
    for (index, cut) in cuts {
        if let Token::Text(text) = &tokens[index] {
            let (head, tail) = ranges[index].unwrap_or((0, text.len()));
            ranges[index] = Some(match cut {
                Cut::Head => (text.find('\n').map_or(text.len(), |nl| nl + 1), tail),
                Cut::Tail => (head, text.rfind('\n').map_or(0, |nl| nl + 1)),
            });
        }
    }

    for (token, range) in tokens.iter_mut().zip(ranges) {
        if let (Token::Text(text), Some((head, tail))) = (token, range) {
            *text = if head < tail {
                text[head..tail].to_string()
            } else {
                String::new()
            };
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Cut {
    Head,
    Tail,
}

fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c == ' ' || c == '\t' || c == '\r')
}

fn line_at(source: &str, pos: usize) -> usize {
    source[..pos].matches('\n').count() + 1
}

fn parse_error(line: usize, message: String) -> TemplateError {
    TemplateError::Parse { line, message }
}

struct Parser {
    tokens: std::vec::IntoIter<Token>,
}

type Block = (Vec<Node>, Option<(Control, usize)>);

impl Parser {
    /// Parse until a directive that closes or splits the enclosing block
    fn block(&mut self) -> TemplateResult<Block> {
        let mut nodes = Vec::new();
        while let Some(token) = self.tokens.next() {
            match token {
                Token::Text(text) if text.is_empty() => {}
                Token::Text(text) => nodes.push(Node::Literal(text)),
                Token::Var(var) => nodes.push(Node::Variable(var)),
                Token::Control(Control::If(cond), line) => nodes.push(self.conditional(cond, line)?),
                Token::Control(Control::For(var), line) => nodes.push(self.for_loop(var, line)?),
                Token::Control(control, line) => return Ok((nodes, Some((control, line)))),
            }
        }
        Ok((nodes, None))
    }

    fn conditional(&mut self, cond: VariableRef, opened: usize) -> TemplateResult<Node> {
        let mut branches = Vec::new();
        let mut current = cond;
        loop {
            let (body, end) = self.block()?;
            branches.push((current, body));
            match end {
                Some((Control::ElseIf(next), _)) => current = next,
                Some((Control::EndIf, _)) => {
                    return Ok(Node::Conditional {
                        branches,
                        else_branch: None,
                    })
                }
                Some((Control::Else, _)) => {
                    let (body, end) = self.block()?;
                    return match end {
                        Some((Control::EndIf, _)) => Ok(Node::Conditional {
                            branches,
                            else_branch: Some(body),
                        }),
                        other => Err(unterminated("$if()$", "$endif$", opened, other)),
                    };
                }
                other => return Err(unterminated("$if()$", "$endif$", opened, other)),
            }
        }
    }

    fn for_loop(&mut self, var: VariableRef, opened: usize) -> TemplateResult<Node> {
        let (body, end) = self.block()?;
        match end {
            Some((Control::EndFor, _)) => Ok(Node::ForLoop {
                var,
                body,
                separator: None,
            }),
            Some((Control::Sep, _)) => {
                let (separator, end) = self.block()?;
                match end {
                    Some((Control::EndFor, _)) => Ok(Node::ForLoop {
                        var,
                        body,
                        separator: Some(separator),
                    }),
                    other => Err(unterminated("$for()$", "$endfor$", opened, other)),
                }
            }
            other => Err(unterminated("$for()$", "$endfor$", opened, other)),
        }
    }
}

fn unterminated(
    open: &str,
    close: &str,
    opened: usize,
    found: Option<(Control, usize)>,
) -> TemplateError {
    match found {
        Some((control, line)) => parse_error(
            line,
            format!(
                "unexpected {} inside {} opened on line {}",
                control.directive(),
                open,
                opened
            ),
        ),
        None => parse_error(opened, format!("{} is never closed by {}", open, close)),
    }
}
