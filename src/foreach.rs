use crate::config::Verbosity;
use crate::json::{JsonValue, ModelValue};
use crate::render::Renderer;
use crate::tree::{NodeId, Piece, Tree};
use crate::vars;


struct Loop {
    val: String,
    key: Option<String>,
    entries: Vec<(JsonValue, JsonValue)>
}


impl<'e> Renderer<'e> {
    /// Render the body of a `<foreach>` once per entry of its collection.
    ///
    /// Every iteration binds `val` (and `key`) in the model, substitutes the
    /// body text, then resolves the includes, conditionals and loops it
    /// contains before moving on.
    pub(crate) fn resolve_foreach(&mut self, tree: &mut Tree, id: NodeId) {
        let each = match self.read_loop(tree, id) {
            Some(each) => each,
            None => {
                tree.detach(id);
                return;
            }
        };
        tree.mark_looped(id);
        // nested loops bind their own variables, their bodies wait for them
        let body = tree.split_children(id, |t, child| t.is_tag(child, "foreach"));
        let mut output = Tree::new();
        for (key, item) in each.entries {
            self.model.set(&each.val, item);
            if let Some(name) = &each.key {
                self.model.set(name, key);
            }
            let text = body.iter()
                .map(|piece| match piece {
                    Piece::Markup(markup) => vars::substitute_silently(markup, &self.model),
                    Piece::Kept(markup) => markup.clone()
                })
                .collect::<String>();
            let mut iteration = self.parse(&text);
            self.resolve_tags(&mut iteration);
            self.resolve_loops(&mut iteration);
            output.append_fragment(&iteration);
        }
        tree.replace(id, &output);
    }

    fn read_loop(&mut self, tree: &Tree, id: NodeId) -> Option<Loop> {
        let element = tree.element(id)?;
        let val = match element.attr("val").filter(|it| !it.is_empty()) {
            Some(val) => val.to_lowercase(),
            None => {
                self.diagnostics.report(
                    Verbosity::Concise,
                    format_args!("<foreach> element found with no \"val\" attribute, ignoring element")
                );
                return None;
            }
        };
        let name = match element.attr("in").filter(|it| !it.is_empty()) {
            Some(name) => name.to_lowercase(),
            None => {
                self.diagnostics.report(
                    Verbosity::Concise,
                    format_args!("<foreach> element found with no \"in\" attribute, ignoring element")
                );
                return None;
            }
        };
        let key = element.attr("key")
            .filter(|it| !it.is_empty())
            .map(str::to_lowercase);
        let entries: Vec<(JsonValue, JsonValue)> = match self.model.get(&name) {
            Some(JsonValue::Array(seq)) => seq.iter()
                .enumerate()
                .map(|(index, item)| (JsonValue::from(index), item.clone()))
                .collect(),
            Some(JsonValue::Object(map)) => map.iter()
                .map(|(field, item)| (JsonValue::String(field.clone()), item.clone()))
                .collect(),
            Some(value) if !value.is_falsy() => {
                self.diagnostics.report(
                    Verbosity::Concise,
                    format_args!("<foreach in=\"{}\"> is not a collection, ignoring element", name)
                );
                return None;
            },
            _ => {
                self.diagnostics.report(
                    Verbosity::Concise,
                    format_args!("<foreach in=\"{}\"> refers to an undefined value, ignoring element", name)
                );
                return None;
            }
        };
        Some(Loop { val, key, entries })
    }
}
