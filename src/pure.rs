//! Pure text helpers shared by expression and frame lowering.

/// Whether `expr` is wrapped in one pair of parentheses that match each
/// other, e.g. `(a + b)` but not `(a) + (b)`.
pub fn has_matching_outer_parens(expr: &str) -> bool {
    if !(expr.starts_with('(') && expr.ends_with(')')) || expr.len() < 2 {
        return false;
    }
    let inner = &expr[1..expr.len() - 1];
    let mut open = vec![0usize];
    for (i, c) in inner.char_indices() {
        match c {
            '(' => open.push(i + 1),
            ')' => {
                open.pop();
            }
            _ => {}
        }
    }
    open.len() == 1 && open[0] == 0
}

/// Strip one level of matching outer parentheses.
pub fn strip_outer_parens(expr: &str) -> &str {
    if has_matching_outer_parens(expr) {
        &expr[1..expr.len() - 1]
    } else {
        expr
    }
}

/// Render a function call in arrow form: `p0->func(p1, p2)`.
///
/// With no parameters, or when `force_prefix` is set, the call is written
/// in prefix form `func(p0, p1)`. Trailing parameters lose one level of
/// matching outer parentheses; the receiver keeps them.
pub fn functional_call(func: &str, params: &[String], force_prefix: bool) -> String {
    let stripped: Vec<&str> = params.iter().map(|p| strip_outer_parens(p)).collect();
    if force_prefix || params.is_empty() {
        format!("{}({})", func, stripped.join(", "))
    } else {
        format!("{}->{}({})", params[0], func, stripped[1..].join(", "))
    }
}

/// Render a lambda: `{param | body}`.
pub fn lambda(param: &str, body: &str) -> String {
    format!("{{{} | {}}}", param, strip_outer_parens(body))
}

/// Column names that are valid identifiers are written bare; anything else
/// is single-quoted with `'` escaped as `\'`.
pub fn escape_column_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "\\'"))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// Pure string literal with `'` escaped.
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "\\'"))
}

/// Wrap a nullable operand for a function that requires exactly one value.
pub fn to_one(expr: &str) -> String {
    format!("toOne({})", strip_outer_parens(expr))
}
