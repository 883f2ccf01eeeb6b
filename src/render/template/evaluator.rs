//! Template evaluation.

use super::context::{TemplateContext, TemplateValue};
use super::parser::{Node, VariableRef};
use super::{TemplateError, TemplateResult};

static NULL: TemplateValue = TemplateValue::Null;

/// Evaluate nodes into `out`
pub fn evaluate(
    nodes: &[Node],
    context: &TemplateContext<'_>,
    escape: fn(&str) -> String,
    out: &mut String,
) -> TemplateResult<()> {
    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Variable(var) => out.push_str(&resolve(var, context)?.render(escape)),
            Node::Conditional {
                branches,
                else_branch,
            } => {
                let taken = branches
                    .iter()
                    .find(|(cond, _)| lookup(cond, context).is_some_and(TemplateValue::is_truthy))
                    .map(|(_, body)| body)
                    .or(else_branch.as_ref());
                if let Some(body) = taken {
                    evaluate(body, context, escape, out)?;
                }
            }
            Node::ForLoop {
                var,
                body,
                separator,
            } => {
                let items: Vec<&TemplateValue> = match resolve(var, context)? {
                    TemplateValue::List(items) => items.iter().collect(),
                    value if value.is_truthy() => vec![value],
                    _ => Vec::new(),
                };

                for (i, item) in items.into_iter().enumerate() {
                    if i > 0 {
                        if let Some(separator) = separator {
                            evaluate(separator, context, escape, out)?;
                        }
                    }
                    let mut scope = context.child();
                    scope.insert(var.binding(), item.clone());
                    scope.insert("it", item.clone());
                    evaluate(body, &scope, escape, out)?;
                }
            }
        }
    }
    Ok(())
}

/// Look up a variable; `None` if its first path segment is not bound
fn lookup<'c>(var: &VariableRef, context: &'c TemplateContext<'_>) -> Option<&'c TemplateValue> {
    let root = context.get(var.root())?;
    Some(root.get_path(&var.rest()).unwrap_or(&NULL))
}

/// Like [`lookup`], but an unbound variable is an error
fn resolve<'c>(var: &VariableRef, context: &'c TemplateContext<'_>) -> TemplateResult<&'c TemplateValue> {
    lookup(var, context).ok_or_else(|| TemplateError::UndefinedVariable {
        name: var.path.join("."),
        line: var.line,
    })
}
