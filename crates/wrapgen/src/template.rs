//! Text templates for the generated wrappers.
//!
//! Placeholders are written `{key}` and filled by [`render`]. Braces that do
//! not enclose a known key (Go blocks, composite literals) are kept verbatim.

pub(crate) const POSITIONAL_HEADER: &str = "\
// {name} is a generated function to make {rt}CallableFunc.
// Source: {source}
func {name}({callee} {func_type}) {rt}CallableFunc {
\treturn func({args} ...{rt}Object) ({result} {rt}Object, {error} error) {
";

pub(crate) const CURSOR_HEADER: &str = "\
// {name} is a generated function to make {rt}CallableExFunc.
// Source: {source}
func {name}({callee} {func_type}) {rt}CallableExFunc {
\treturn func({args} {rt}Call) ({result} {rt}Object, {error} error) {
";

pub(crate) const POSITIONAL_GUARD: &str = "\
\t\tif len({args}) != {count} {
\t\t\treturn {rt}Undefined, {rt}ErrWrongNumArguments.NewError(
\t\t\t\t\"want={count} got=\" + strconv.Itoa(len({args})),
\t\t\t)
\t\t}
";

pub(crate) const CURSOR_GUARD: &str = "\
\t\tif {error} = {args}.CheckLen({count}); {error} != nil {
\t\t\treturn {rt}Undefined, {error}
\t\t}
";

pub(crate) const NAMED_EXTRACTION: &str = "\
\t\t{param}, {ok} := {convert}({arg})
\t\tif !{ok} {
\t\t\treturn {rt}Undefined, {rt}NewArgumentTypeError(\"{ordinal}\", \"{type}\", {arg}.TypeName())
\t\t}
";

pub(crate) const FOOTER: &str = "\
\t\treturn
\t}
}
";

/// Substitute `{key}` placeholders in a single pass.
pub(crate) fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((value, close)) => {
                output.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                output.push('{');
                rest = after;
            }
        }
    }
    output.push_str(rest);
    output
}

/// English ordinal for a 1-based position: `1st`, `2nd`, `11th`, `23rd`.
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
