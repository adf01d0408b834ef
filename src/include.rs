use crate::config::Verbosity;
use crate::render::Renderer;
use crate::tree::{NodeId, Tree};
use crate::vars;


impl<'e> Renderer<'e> {
    /// Splice the template named by `src` in place of the `<include>`, after
    /// binding each `<arg>` child into it. A template carrying a doctype
    /// replaces the whole document.
    pub(crate) fn resolve_include(&mut self, tree: &mut Tree, id: NodeId) {
        let src = match tree.element(id).and_then(|it| it.attr("src")) {
            Some(src) if !src.is_empty() => src.to_owned(),
            _ => {
                self.diagnostics.report(
                    Verbosity::Concise,
                    format_args!("<include> element found with no src attribute, ignoring element")
                );
                tree.detach(id);
                return;
            }
        };
        let mut text = match self.engine.compile(&src) {
            Ok(compiled) => compiled.to_string(),
            Err(err) => {
                self.diagnostics.report(
                    Verbosity::Concise,
                    format_args!("<include src=\"{}\"> cannot be loaded, ignoring element: {}", src, err)
                );
                tree.detach(id);
                return;
            }
        };
        let is_document = text.to_lowercase().contains("<!doctype");
        for child in tree.children(id).to_vec() {
            match tree.element(child) {
                Some(arg) if arg.is("arg") => match arg.first_attr() {
                    Some(attr) => {
                        let name = attr.name().to_lowercase();
                        text = vars::replace_placeholder(&text, &name, &tree.serialize_children(child));
                    },
                    None => {
                        self.diagnostics.report(
                            Verbosity::Concise,
                            format_args!("<arg> element found with no attribute, ignoring <include src=\"{}\">", src)
                        );
                        tree.detach(id);
                        return;
                    }
                },
                Some(_) => {
                    self.diagnostics.report(
                        Verbosity::Concise,
                        format_args!("{} inside <include src=\"{}\"> is not an <arg> element", tree.serialize(child), src)
                    );
                },
                None if tree.text(child).map_or(false, |it| !it.trim().is_empty()) => {
                    self.diagnostics.report(
                        Verbosity::Concise,
                        format_args!("text inside <include src=\"{}\"> is ignored", src)
                    );
                },
                None => {}
            }
        }
        let fragment = self.parse(&text);
        if is_document {
            tree.replace_document(&fragment);
        } else {
            tree.replace(id, &fragment);
        }
    }
}
