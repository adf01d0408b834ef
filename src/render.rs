use crate::condition;
use crate::config::Verbosity;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::model::Model;
use crate::template::Engine;
use crate::tree::Tree;
use crate::vars;


/// Output of a render along with the diagnostics it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub diagnostics: Vec<Diagnostic>
}


/// State of one render call. The tree passes mutate `model` through loop
/// bindings, which stay visible after their loop. `steps_left` bounds the
/// include expansions of the render.
pub(crate) struct Renderer<'e> {
    pub(crate) engine: &'e Engine,
    pub(crate) model: Model,
    pub(crate) diagnostics: Diagnostics,
    steps_left: usize,
    exhausted: bool
}

impl<'e> Renderer<'e> {
    pub(crate) fn new(engine: &'e Engine, model: Model) -> Self {
        Renderer {
            engine,
            model,
            diagnostics: Diagnostics::new(engine.config().verbosity),
            steps_left: engine.config().max_steps,
            exhausted: false
        }
    }

    pub(crate) fn run(mut self, compiled: &str) -> Rendered {
        let mut tree = self.parse(compiled);
        self.resolve_tags(&mut tree);
        self.resolve_loops(&mut tree);
        condition::remove_dangling(&mut tree);
        let text = vars::substitute(&tree.to_markup(), &self.model, &mut self.diagnostics);
        Rendered {
            text,
            diagnostics: self.diagnostics.into_entries()
        }
    }

    pub(crate) fn parse(&mut self, text: &str) -> Tree {
        let mut tree = Tree::parse(text);
        for warning in tree.take_warnings() {
            self.diagnostics.report(Verbosity::Debug, format_args!("markup: {}", warning));
        }
        tree
    }

    // only include expansions can grow without bound, chains and loop
    // iterations are limited by the input
    fn take_include_step(&mut self) -> bool {
        if self.steps_left > 0 {
            self.steps_left -= 1;
            return true;
        }
        if !self.exhausted {
            self.exhausted = true;
            self.diagnostics.report(
                Verbosity::Concise,
                format_args!(
                    "gave up after {} include expansions, remaining includes are left as they are",
                    self.engine.config().max_steps
                )
            );
        }
        false
    }

    /// Resolve includes and conditional chains outside of loops until
    /// neither is left; includes may bring in new conditionals.
    pub(crate) fn resolve_tags(&mut self, tree: &mut Tree) {
        loop {
            let mut progressed = false;
            while !self.exhausted {
                let id = match tree.find(
                    |t, id| t.is_tag(id, "include") && !t.in_unmarked_loop(id)
                ) {
                    Some(id) => id,
                    None => break
                };
                if !self.take_include_step() {
                    break;
                }
                self.resolve_include(tree, id);
                progressed = true;
            }
            while let Some(head) = tree.find(
                |t, id| condition::is_head(t, id) && !t.in_unmarked_loop(id)
            ) {
                condition::resolve_chain(tree, head, &self.model, &mut self.diagnostics);
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
    }

    pub(crate) fn resolve_loops(&mut self, tree: &mut Tree) {
        while let Some(id) = tree.find(
            |t, id| t.is_tag(id, "foreach") && !t.in_unmarked_loop(id)
        ) {
            self.resolve_foreach(tree, id);
        }
    }
}
