use std::collections::HashSet;
use regex::{NoExpand, Regex};
use crate::config::Verbosity;
use crate::diagnostic::Diagnostics;
use crate::json::ModelValue;
use crate::model::Model;


/// Replace every `{name}` of `text` resolving in `model`. Placeholders that
/// do not resolve are kept verbatim and reported once each.
pub(crate) fn substitute(text: &str, model: &Model, diagnostics: &mut Diagnostics) -> String {
    let mut reported = HashSet::new();
    substitute_with(text, model, |placeholder| {
        if reported.insert(placeholder.to_owned()) {
            diagnostics.report(
                Verbosity::Verbose,
                format_args!("unresolved variable {}", placeholder)
            );
        }
    })
}

/// Like [substitute] without reporting; what stays unresolved is reported
/// by the final pass over the whole document.
pub(crate) fn substitute_silently(text: &str, model: &Model) -> String {
    substitute_with(text, model, |_| ())
}

fn substitute_with(text: &str, model: &Model, mut unresolved: impl FnMut(&str)) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let tail = &rest[open..];
        match tail[1..].find(|c: char| c == '{' || c == '}') {
            Some(len) if len > 0 && tail[1 + len..].starts_with('}') => {
                let placeholder = &tail[..len + 2];
                match model.get(&tail[1..1 + len]) {
                    Some(value) => result.push_str(&value.to_text()),
                    None => {
                        unresolved(placeholder);
                        result.push_str(placeholder);
                    }
                }
                rest = &tail[len + 2..];
            },
            _ => {
                result.push('{');
                rest = &tail[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Case-insensitive literal replacement of `{name}` by `value`.
pub(crate) fn replace_placeholder(text: &str, name: &str, value: &str) -> String {
    match Regex::new(&format!("(?i)\\{{{}\\}}", regex::escape(name))) {
        Ok(pattern) => pattern.replace_all(text, NoExpand(value)).into_owned(),
        Err(_) => text.to_owned()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::diagnostic::Diagnostic;

    fn render(text: &str, data: serde_json::Value) -> (String, Vec<Diagnostic>) {
        let mut diagnostics = Diagnostics::new(Verbosity::Debug);
        let result = substitute(text, &Model::from_value(&data), &mut diagnostics);
        (result, diagnostics.into_entries())
    }

    #[test]
    fn plain_text_is_untouched() {
        let (text, diagnostics) = render("<p>no vars</p>", json!({}));
        assert_eq!(text, "<p>no vars</p>");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn case_insensitive_and_dotted() {
        let (text, _) = render(
            "{Title}: {user.NAME} is {user.age}, {title}",
            json!({ "title": "T", "User": { "Name": "Ann", "Age": 30 } })
        );
        assert_eq!(text, "T: Ann is 30, T");
    }

    #[test]
    fn null_is_empty() {
        let (text, _) = render("[{x}]", json!({ "x": null }));
        assert_eq!(text, "[]");
    }

    #[test]
    fn unresolved_is_kept_with_diagnostic() {
        let (text, diagnostics) = render("a {unknown.path} b", json!({}));
        assert_eq!(text, "a {unknown.path} b");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].verbosity, Verbosity::Verbose);
        assert!(diagnostics[0].message.contains("{unknown.path}"));
    }

    #[test]
    fn repeated_placeholder_is_reported_once() {
        let (text, diagnostics) = render("{a}{b}{a}", json!({}));
        assert_eq!(text, "{a}{b}{a}");
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn silent_substitution() {
        let model = Model::from_value(&json!({ "a": 1 }));
        assert_eq!(substitute_silently("{a}{b}", &model), "1{b}");
    }

    #[test]
    fn unbalanced_braces() {
        let (text, _) = render("{} {a{b} {c", json!({ "b": 1 }));
        assert_eq!(text, "{} {a1 {c");
    }

    #[test]
    fn values_are_not_substituted_again() {
        let (text, _) = render("{a}", json!({ "a": "{b}", "b": "no" }));
        assert_eq!(text, "{b}");
    }

    #[test]
    fn placeholder_replacement() {
        assert_eq!(
            replace_placeholder("<h1>{Name}</h1>{name}{names}", "name", "$1 Hi"),
            "<h1>$1 Hi</h1>$1 Hi{names}"
        );
        assert_eq!(replace_placeholder("{a.b}", "a.b", "x"), "x");
        assert_eq!(replace_placeholder("{axb}", "a.b", "x"), "{axb}");
    }
}
