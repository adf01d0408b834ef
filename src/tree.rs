use crate::reader::{Attribute, Reader, Token};


pub(crate) type NodeId = usize;

const ROOT: NodeId = 0;

static VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img",
    "input", "link", "meta", "param", "source", "track", "wbr"
];


#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Form {
    Normal,
    Void,
    SelfClosed
}


#[derive(Debug, Clone)]
pub(crate) struct Attr {
    name: String,
    value: Option<String>,
    quote: Option<char>
}

impl Attr {
    fn from(attribute: &Attribute) -> Self {
        Attr {
            name: attribute.name.to_owned(),
            value: attribute.value.map(str::to_owned),
            quote: attribute.quote
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    // a bare attribute reads as the empty string
    pub(crate) fn value(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    fn write(&self, out: &mut String) {
        out.push(' ');
        out.push_str(&self.name);
        if let Some(value) = &self.value {
            out.push('=');
            match self.quote {
                Some(quote) => {
                    out.push(quote);
                    out.push_str(value);
                    out.push(quote);
                },
                None => out.push_str(value)
            }
        }
    }
}


#[derive(Debug, Clone)]
pub(crate) struct Element {
    name: String,
    attrs: Vec<Attr>,
    form: Form,
    looped: bool
}

impl Element {
    fn new(name: &str, attributes: &[Attribute], form: Form) -> Self {
        Element {
            name: name.to_owned(),
            attrs: attributes.iter().map(Attr::from).collect(),
            form,
            looped: false
        }
    }

    pub(crate) fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter()
            .find(|it| it.name.eq_ignore_ascii_case(name))
            .map(Attr::value)
    }

    pub(crate) fn first_attr(&self) -> Option<&Attr> {
        self.attrs.first()
    }

    pub(crate) fn is_looped(&self) -> bool {
        self.looped
    }

    fn write_start(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            attr.write(out);
        }
        match self.form {
            Form::SelfClosed => out.push_str("/>"),
            _ => out.push('>')
        }
    }

    fn write_end(&self, out: &mut String) {
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}


#[derive(Debug, Clone)]
enum Content {
    Document,
    Element(Element),
    Text(String),
    Verbatim(String)
}

#[derive(Debug, Clone)]
struct Node {
    content: Content,
    parent: Option<NodeId>,
    children: Vec<NodeId>
}


/// An arena of markup nodes. Node 0 is the document; nodes replaced during
/// rendering stay in the arena detached from the document.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    warnings: Vec<String>
}

impl Tree {
    pub(crate) fn new() -> Self {
        Tree {
            nodes: vec![
                Node { content: Content::Document, parent: None, children: Vec::new() }
            ],
            warnings: Vec::new()
        }
    }

    /// Best-effort parse, recovery steps are recorded as warnings.
    pub(crate) fn parse(input: &str) -> Self {
        let mut tree = Tree::new();
        let mut reader = Reader::new(input);
        let mut open = vec![ROOT];
        while let Some(token) = reader.pop_front() {
            let current = open.last().copied().unwrap_or(ROOT);
            match token {
                Token::Text(text) => {
                    tree.append(current, Content::Text(text.to_owned()));
                },
                Token::Comment(text) | Token::Declaration(text) => {
                    tree.append(current, Content::Verbatim(text.to_owned()));
                },
                Token::Open(name, attributes, self_closing) => {
                    let form = if self_closing {
                        Form::SelfClosed
                    } else if VOID_ELEMENTS.iter().any(|it| it.eq_ignore_ascii_case(name)) {
                        Form::Void
                    } else {
                        Form::Normal
                    };
                    let element = Element::new(name, &attributes, form);
                    let id = tree.append(current, Content::Element(element));
                    if form == Form::Normal {
                        open.push(id);
                    }
                },
                Token::Close(name) => {
                    let matching = open.iter().rposition(
                        |&id| id != ROOT && tree.is_tag(id, name)
                    );
                    match matching {
                        Some(depth) => {
                            if depth + 1 < open.len() {
                                tree.warnings.push(format!(
                                    "</{}> closes {} unclosed element(s)", name, open.len() - depth - 1
                                ));
                            }
                            open.truncate(depth);
                        },
                        None => tree.warnings.push(
                            format!("stray end tag </{}> ignored", name)
                        )
                    }
                }
            }
        }
        if open.len() > 1 {
            tree.warnings.push(
                format!("{} element(s) left open at end of input", open.len() - 1)
            );
        }
        tree
    }

    fn append(&mut self, parent: NodeId, content: Content) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node { content, parent: Some(parent), children: Vec::new() });
        self.nodes[parent].children.push(id);
        id
    }

    pub(crate) fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> NodeId {
        ROOT
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub(crate) fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id].content {
            Content::Element(element) => Some(element),
            _ => None
        }
    }

    pub(crate) fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].content {
            Content::Text(text) => Some(text),
            _ => None
        }
    }

    pub(crate) fn is_tag(&self, id: NodeId, name: &str) -> bool {
        self.element(id).map_or(false, |it| it.is(name))
    }

    pub(crate) fn is_blank_text(&self, id: NodeId) -> bool {
        self.text(id).map_or(false, |it| it.trim().is_empty())
    }

    fn index_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.nodes[id].parent?;
        self.nodes[parent].children.iter()
            .position(|&it| it == id)
            .map(|index| (parent, index))
    }

    pub(crate) fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(id)?;
        self.nodes[parent].children.get(index + 1).copied()
    }

    /// First attached node in document order matching `predicate`.
    pub(crate) fn find(&self, predicate: impl Fn(&Tree, NodeId) -> bool) -> Option<NodeId> {
        let mut pending = vec![ROOT];
        while let Some(id) = pending.pop() {
            if predicate(self, id) {
                return Some(id);
            }
            pending.extend(self.nodes[id].children.iter().rev());
        }
        None
    }

    /// True when some ancestor is a `foreach` that has not started iterating.
    pub(crate) fn in_unmarked_loop(&self, id: NodeId) -> bool {
        let mut parent = self.nodes[id].parent;
        while let Some(ancestor) = parent {
            if let Some(element) = self.element(ancestor) {
                if element.is("foreach") && !element.is_looped() {
                    return true;
                }
            }
            parent = self.nodes[ancestor].parent;
        }
        false
    }

    pub(crate) fn mark_looped(&mut self, id: NodeId) {
        if let Content::Element(element) = &mut self.nodes[id].content {
            element.looped = true;
        }
    }

    pub(crate) fn detach(&mut self, id: NodeId) {
        if let Some((parent, index)) = self.index_in_parent(id) {
            self.nodes[parent].children.remove(index);
        }
        self.nodes[id].parent = None;
    }

    pub(crate) fn replace(&mut self, id: NodeId, fragment: &Tree) {
        self.replace_run(&[id], fragment);
    }

    /// Detach every node of `run` (siblings, in order) and splice the
    /// fragment's top-level nodes where the first one was.
    pub(crate) fn replace_run(&mut self, run: &[NodeId], fragment: &Tree) {
        let (parent, index) = match run.first().and_then(|&it| self.index_in_parent(it)) {
            Some(position) => position,
            None => return
        };
        for &id in run {
            self.detach(id);
        }
        let grafted = fragment.nodes[ROOT].children.iter()
            .map(|&child| self.graft(fragment, child, parent))
            .collect::<Vec<_>>();
        self.nodes[parent].children.splice(index..index, grafted);
    }

    pub(crate) fn replace_document(&mut self, fragment: &Tree) {
        for id in std::mem::take(&mut self.nodes[ROOT].children) {
            self.nodes[id].parent = None;
        }
        let grafted = fragment.nodes[ROOT].children.iter()
            .map(|&child| self.graft(fragment, child, ROOT))
            .collect::<Vec<_>>();
        self.nodes[ROOT].children = grafted;
    }

    fn graft(&mut self, fragment: &Tree, from: NodeId, parent: NodeId) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            content: fragment.nodes[from].content.clone(),
            parent: Some(parent),
            children: Vec::new()
        });
        for &child in &fragment.nodes[from].children {
            let grafted = self.graft(fragment, child, id);
            self.nodes[id].children.push(grafted);
        }
        id
    }

    /// Copy of the children of `id` as a standalone fragment.
    pub(crate) fn children_fragment(&self, id: NodeId) -> Tree {
        let mut fragment = Tree::new();
        for &child in &self.nodes[id].children {
            let grafted = fragment.graft(self, child, ROOT);
            fragment.nodes[ROOT].children.push(grafted);
        }
        fragment
    }

    pub(crate) fn append_fragment(&mut self, fragment: &Tree) {
        for &child in &fragment.nodes[ROOT].children {
            let grafted = self.graft(fragment, child, ROOT);
            self.nodes[ROOT].children.push(grafted);
        }
    }

    pub(crate) fn serialize(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    pub(crate) fn serialize_children(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_children(id, &mut out);
        out
    }

    pub(crate) fn to_markup(&self) -> String {
        self.serialize(ROOT)
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        for &child in &self.nodes[id].children {
            self.write_node(child, out);
        }
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].content {
            Content::Document => self.write_children(id, out),
            Content::Text(text) | Content::Verbatim(text) => out.push_str(text),
            Content::Element(element) => {
                element.write_start(out);
                if element.form == Form::Normal {
                    self.write_children(id, out);
                    element.write_end(out);
                }
            }
        }
    }

    /// Serialize the children of `id` as markup pieces, the subtrees
    /// selected by `keep` each becoming a [Piece::Kept] of their own.
    pub(crate) fn split_children(&self, id: NodeId, keep: impl Fn(&Tree, NodeId) -> bool) -> Vec<Piece> {
        let mut pieces = Vec::new();
        for &child in &self.nodes[id].children {
            self.split_node(child, &keep, &mut pieces);
        }
        pieces
    }

    fn split_node(&self, id: NodeId, keep: &impl Fn(&Tree, NodeId) -> bool, pieces: &mut Vec<Piece>) {
        if keep(self, id) {
            pieces.push(Piece::Kept(self.serialize(id)));
            return;
        }
        match &self.nodes[id].content {
            Content::Element(element) if element.form == Form::Normal => {
                let mut start = String::new();
                element.write_start(&mut start);
                push_markup(pieces, &start);
                for &child in &self.nodes[id].children {
                    self.split_node(child, keep, pieces);
                }
                let mut end = String::new();
                element.write_end(&mut end);
                push_markup(pieces, &end);
            },
            _ => push_markup(pieces, &self.serialize(id))
        }
    }
}


#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Piece {
    Markup(String),
    Kept(String)
}

fn push_markup(pieces: &mut Vec<Piece>, markup: &str) {
    match pieces.last_mut() {
        Some(Piece::Markup(last)) => last.push_str(markup),
        _ => pieces.push(Piece::Markup(markup.to_owned()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_source_form() {
        let text = "<!DOCTYPE html><p class='a' hidden>x<br>y<img src=z/></p><!-- c -->";
        let tree = Tree::parse(text);
        assert_eq!(tree.to_markup(), text);
    }

    #[test]
    fn stray_end_tag_is_dropped_with_warning() {
        let mut tree = Tree::parse("<p>a</b></p>");
        assert_eq!(tree.to_markup(), "<p>a</p>");
        assert_eq!(tree.take_warnings(), vec!["stray end tag </b> ignored".to_owned()]);
    }

    #[test]
    fn unclosed_elements_close_at_end() {
        let mut tree = Tree::parse("<div><span>a");
        assert_eq!(tree.to_markup(), "<div><span>a</span></div>");
        assert_eq!(tree.take_warnings().len(), 1);
    }

    #[test]
    fn end_tag_matches_case_insensitively() {
        let tree = Tree::parse("<IF x>a</if>b");
        assert_eq!(tree.to_markup(), "<IF x>a</IF>b");
    }

    #[test]
    fn replace_splices_fragment() {
        let mut tree = Tree::parse("<p>a<if x>b</if>c</p>");
        let target = tree.find(|t, id| t.is_tag(id, "if")).unwrap();
        let fragment = tree.children_fragment(target);
        tree.replace(target, &fragment);
        assert_eq!(tree.to_markup(), "<p>abc</p>");
        assert!(tree.find(|t, id| t.is_tag(id, "if")).is_none());
    }

    #[test]
    fn replace_run_removes_all_siblings() {
        let mut tree = Tree::parse("<if a>1</if> <else>2</else>!");
        let head = tree.find(|t, id| t.is_tag(id, "if")).unwrap();
        let blank = tree.next_sibling(head).unwrap();
        let tail = tree.next_sibling(blank).unwrap();
        assert!(tree.is_blank_text(blank));
        tree.replace_run(&[head, blank, tail], &Tree::parse("<b>2</b>"));
        assert_eq!(tree.to_markup(), "<b>2</b>!");
    }

    #[test]
    fn replace_document_swaps_everything() {
        let mut tree = Tree::parse("<p>a</p><include src=x></include>");
        tree.replace_document(&Tree::parse("<!doctype html><html></html>"));
        assert_eq!(tree.to_markup(), "<!doctype html><html></html>");
    }

    #[test]
    fn loop_marking() {
        let mut tree = Tree::parse("<foreach val=a in=b><if c>x</if></foreach><if d>y</if>");
        let nested = tree.find(|t, id| t.is_tag(id, "if")).unwrap();
        assert!(tree.in_unmarked_loop(nested));
        let outer = tree.find(|t, id| t.is_tag(id, "if") && !t.in_unmarked_loop(id)).unwrap();
        assert_eq!(tree.serialize(outer), "<if d>y</if>");
        let foreach = tree.find(|t, id| t.is_tag(id, "foreach")).unwrap();
        tree.mark_looped(foreach);
        assert!(!tree.in_unmarked_loop(nested));
    }

    #[test]
    fn split_keeps_selected_subtrees() {
        let tree = Tree::parse("<foreach in=a><p>{x}</p><foreach in=b>{y}</foreach>!</foreach>");
        let outer = tree.find(|t, id| t.is_tag(id, "foreach")).unwrap();
        let pieces = tree.split_children(outer, |t, id| t.is_tag(id, "foreach"));
        assert_eq!(pieces, vec![
            Piece::Markup("<p>{x}</p>".to_owned()),
            Piece::Kept("<foreach in=b>{y}</foreach>".to_owned()),
            Piece::Markup("!".to_owned())
        ]);
    }

    #[test]
    fn attribute_access() {
        let tree = Tree::parse("<foreach VAL=\"item\" in=list key></foreach>");
        let id = tree.find(|t, id| t.is_tag(id, "foreach")).unwrap();
        let element = tree.element(id).unwrap();
        assert_eq!(element.attr("val"), Some("item"));
        assert_eq!(element.attr("in"), Some("list"));
        assert_eq!(element.attr("key"), Some(""));
        assert_eq!(element.attr("missing"), None);
        assert_eq!(element.first_attr().map(Attr::name), Some("VAL"));
    }
}
